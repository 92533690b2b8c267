use std::{fmt, str::FromStr};

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Named block tags, including the rollup-specific `committed` and
/// `finalized` tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    /// The genesis block
    Earliest,
    /// The most recent block
    Latest,
    /// The pending block
    Pending,
    /// The most recent block that is committed to L1
    Committed,
    /// The most recent block whose batch is executed on L1
    Finalized,
}

impl BlockTag {
    /// Returns the tag as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::Earliest => "earliest",
            BlockTag::Latest => "latest",
            BlockTag::Pending => "pending",
            BlockTag::Committed => "committed",
            BlockTag::Finalized => "finalized",
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block number or tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BlockSpec {
    /// Block number, serialized as a hex quantity
    Number(#[serde(with = "alloy_serde::quantity")] u64),
    /// Block tag
    Tag(BlockTag),
}

impl BlockSpec {
    /// Constructs a `BlockSpec` for the latest block.
    pub const fn latest() -> Self {
        Self::Tag(BlockTag::Latest)
    }

    /// Constructs a `BlockSpec` for the finalized block.
    pub const fn finalized() -> Self {
        Self::Tag(BlockTag::Finalized)
    }
}

impl From<u64> for BlockSpec {
    fn from(block_number: u64) -> Self {
        Self::Number(block_number)
    }
}

impl From<BlockTag> for BlockSpec {
    fn from(tag: BlockTag) -> Self {
        Self::Tag(tag)
    }
}

impl fmt::Display for BlockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockSpec::Number(block_number) => write!(f, "{block_number:#x}"),
            BlockSpec::Tag(tag) => tag.fmt(f),
        }
    }
}

/// An error that occurs when parsing a [`BlockSpec`].
#[derive(Debug, thiserror::Error)]
#[error("Invalid block tag or number: '{0}'")]
pub struct InvalidBlockSpec(String);

impl FromStr for BlockSpec {
    type Err = InvalidBlockSpec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = match s {
            "earliest" => BlockSpec::Tag(BlockTag::Earliest),
            "latest" => BlockSpec::Tag(BlockTag::Latest),
            "pending" => BlockSpec::Tag(BlockTag::Pending),
            "committed" => BlockSpec::Tag(BlockTag::Committed),
            "finalized" => BlockSpec::Tag(BlockTag::Finalized),
            _ => {
                let block_number = if let Some(hex) = s.strip_prefix("0x") {
                    u64::from_str_radix(hex, 16)
                } else {
                    s.parse()
                };

                BlockSpec::Number(block_number.map_err(|_err| InvalidBlockSpec(s.to_string()))?)
            }
        };

        Ok(spec)
    }
}

/// Identifies a block by hash, number or tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockId {
    /// Block hash
    Hash(B256),
    /// Block number or tag
    Spec(BlockSpec),
}

impl From<B256> for BlockId {
    fn from(hash: B256) -> Self {
        Self::Hash(hash)
    }
}

impl From<BlockSpec> for BlockId {
    fn from(spec: BlockSpec) -> Self {
        Self::Spec(spec)
    }
}

impl From<BlockTag> for BlockId {
    fn from(tag: BlockTag) -> Self {
        Self::Spec(BlockSpec::Tag(tag))
    }
}

impl From<u64> for BlockId {
    fn from(block_number: u64) -> Self {
        Self::Spec(BlockSpec::Number(block_number))
    }
}
