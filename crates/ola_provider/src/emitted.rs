use std::collections::HashMap;

use alloy_primitives::B256;

/// Number of blocks after which a delivery record is forgotten.
pub const EMITTED_HORIZON: u64 = 12;

/// Key under which a delivery is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EmittedKey {
    /// Receipt of a transaction
    Transaction(B256),
    /// Block that contained a delivered log
    BlockHash(B256),
    /// Delivery key of a log filter
    Filter(String),
}

impl std::fmt::Display for EmittedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmittedKey::Transaction(hash) => write!(f, "t:{hash}"),
            EmittedKey::BlockHash(hash) => write!(f, "b:{hash}"),
            EmittedKey::Filter(key) => f.write_str(key),
        }
    }
}

/// Value of a delivery record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emitted {
    /// Delivered at the given block
    Block(u64),
    /// Delivery is pending; never garbage collected
    Pending,
}

/// Records which keys were delivered and at which block.
///
/// A marked key turns a missing receipt into "not indexed yet" instead of
/// "will never exist".
#[derive(Debug, Default)]
pub struct EmittedIndex {
    entries: HashMap<EmittedKey, Emitted>,
}

impl EmittedIndex {
    pub fn mark(&mut self, key: EmittedKey, emitted: Emitted) {
        self.entries.insert(key, emitted);
    }

    pub fn get(&self, key: &EmittedKey) -> Option<Emitted> {
        self.entries.get(key).copied()
    }

    pub fn is_marked(&self, key: &EmittedKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts entries that were delivered more than [`EMITTED_HORIZON`]
    /// blocks before `current_block`.
    pub fn gc(&mut self, current_block: u64) {
        let before = self.entries.len();
        self.entries.retain(|_key, emitted| match emitted {
            Emitted::Pending => true,
            Emitted::Block(block_number) => {
                current_block.saturating_sub(*block_number) <= EMITTED_HORIZON
            }
        });

        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::trace!("evicted {evicted} delivery records at block {current_block}");
        }
    }
}
