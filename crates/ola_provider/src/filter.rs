use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::block_spec::BlockSpec;

/// A single value or a list of alternatives.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMore<T> {
    /// A single value
    One(T),
    /// A list of alternatives
    Many(Vec<T>),
}

impl<T> OneOrMore<T> {
    fn to_sorted_strings(&self, to_string: impl Fn(&T) -> String) -> Vec<String> {
        let mut values: Vec<String> = match self {
            OneOrMore::One(value) => vec![to_string(value)],
            OneOrMore::Many(values) => values.iter().map(to_string).collect(),
        };
        values.sort();
        values.dedup();
        values
    }
}

impl<T> From<T> for OneOrMore<T> {
    fn from(value: T) -> Self {
        Self::One(value)
    }
}

/// A log filter, as accepted by `eth_getLogs`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// Start block (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockSpec>,
    /// End block (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockSpec>,
    /// Block hash, mutually exclusive with the block range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    /// Contract address(es)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<OneOrMore<Address>>,
    /// Topic filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Option<OneOrMore<B256>>>>,
}

impl LogFilter {
    /// Returns the key under which deliveries for this filter are tracked.
    ///
    /// The key only depends on the address and topics: `filter:<address>:<topics>`,
    /// where alternatives are sorted and joined by `|`, topic positions are
    /// joined by `/` and a wildcard position is written as `null`.
    pub fn event_key(&self) -> String {
        let address = self.address.as_ref().map_or_else(
            || "*".to_string(),
            |address| {
                address
                    .to_sorted_strings(|address| address.to_string().to_lowercase())
                    .join("|")
            },
        );

        let mut topics: Vec<&Option<OneOrMore<B256>>> =
            self.topics.iter().flatten().collect();
        while topics.last().is_some_and(|topic| topic.is_none()) {
            topics.pop();
        }

        let topics = topics
            .into_iter()
            .map(|topic| {
                topic.as_ref().map_or_else(
                    || "null".to_string(),
                    |topic| topic.to_sorted_strings(ToString::to_string).join("|"),
                )
            })
            .collect::<Vec<_>>()
            .join("/");

        format!("filter:{address}:{topics}")
    }

    /// Returns a copy of the filter restricted to the provided block range.
    pub fn with_range(&self, from_block: u64, to_block: u64) -> Self {
        Self {
            from_block: Some(BlockSpec::Number(from_block)),
            to_block: Some(BlockSpec::Number(to_block)),
            block_hash: None,
            ..self.clone()
        }
    }

    /// Returns the filter as it is sent to the node: the end of the range is
    /// only sent together with its start.
    pub fn prepared(&self) -> Self {
        Self {
            to_block: self.from_block.and(self.to_block),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256};

    use super::*;
    use crate::block_spec::BlockTag;

    const TRANSFER: B256 =
        b256!("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");
    const APPROVAL: B256 =
        b256!("0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925");

    #[test]
    fn event_key_depends_on_address_and_topics() {
        let filter = LogFilter {
            address: Some(OneOrMore::One(address!(
                "0x000000000000000000000000000000000000800A"
            ))),
            topics: Some(vec![
                Some(OneOrMore::Many(vec![TRANSFER, APPROVAL, TRANSFER])),
                None,
                Some(OneOrMore::One(B256::ZERO)),
                None,
            ]),
            ..LogFilter::default()
        };

        assert_eq!(
            filter.event_key(),
            format!(
                "filter:0x000000000000000000000000000000000000800a:{APPROVAL}|{TRANSFER}/null/{}",
                B256::ZERO
            )
        );

        let ranged = filter.with_range(1, 2);
        assert_eq!(ranged.event_key(), filter.event_key());
    }

    #[test]
    fn event_key_without_address() {
        assert_eq!(LogFilter::default().event_key(), "filter:*:");
    }

    #[test]
    fn to_block_requires_from_block() -> anyhow::Result<()> {
        let filter = LogFilter {
            to_block: Some(BlockSpec::Tag(BlockTag::Committed)),
            ..LogFilter::default()
        };
        assert_eq!(serde_json::to_value(filter.prepared())?, serde_json::json!({}));

        let filter = LogFilter {
            from_block: Some(BlockSpec::Number(16)),
            to_block: Some(BlockSpec::Tag(BlockTag::Finalized)),
            ..LogFilter::default()
        };
        assert_eq!(
            serde_json::to_value(filter.prepared())?,
            serde_json::json!({ "fromBlock": "0x10", "toBlock": "finalized" })
        );

        Ok(())
    }
}
