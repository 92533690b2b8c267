use std::collections::HashMap;

use alloy_primitives::B256;
use indexmap::IndexMap;

use crate::{
    emitted::{EmittedIndex, EmittedKey},
    filter::LogFilter,
};

/// Identifier of a registered watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A registered interest that is evaluated on every poll cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Watch {
    /// Waits for the receipt of a transaction.
    Transaction {
        /// Hash of the transaction
        hash: B256,
    },
    /// Delivers logs matching a filter.
    Filter(FilterWatch),
}

impl Watch {
    /// Creates a watch for the receipt of a transaction.
    pub fn transaction(hash: B256) -> Self {
        Self::Transaction { hash }
    }

    /// Creates a watch for logs matching `filter`.
    pub fn filter(filter: LogFilter) -> Self {
        Self::Filter(FilterWatch::new(filter))
    }

    fn key(&self) -> EmittedKey {
        match self {
            Watch::Transaction { hash } => EmittedKey::Transaction(*hash),
            Watch::Filter(filter) => EmittedKey::Filter(filter.key.clone()),
        }
    }
}

/// Bookmark and in-flight state of a log filter watch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterWatch {
    pub filter: LogFilter,
    pub key: String,
    /// Last block whose logs were delivered. `None` until the first cycle.
    pub last_block_number: Option<u64>,
    /// Whether a log query is outstanding.
    pub in_flight: bool,
}

impl FilterWatch {
    pub fn new(filter: LogFilter) -> Self {
        let key = filter.event_key();
        Self {
            filter,
            key,
            last_block_number: None,
            in_flight: false,
        }
    }

    /// Computes the block range of the next log query, marking the watch
    /// in flight. Returns `None` if a query is already outstanding.
    ///
    /// The range starts after the bookmark, ends at `head` and spans at most
    /// `max_range + 1` blocks.
    pub fn begin_query(&mut self, head: u64, max_range: u64) -> Option<(u64, u64)> {
        if self.in_flight {
            return None;
        }

        let last_block_number = *self
            .last_block_number
            .get_or_insert_with(|| head.saturating_sub(1));

        let from_block = (last_block_number + 1).max(head.saturating_sub(max_range));

        self.in_flight = true;
        Some((from_block, head))
    }
}

#[derive(Debug)]
struct Entry {
    watch: Watch,
    listeners: usize,
}

/// The set of active watches, iterated in registration order.
///
/// Registering an identical watch twice shares the entry; it is removed once
/// every registration has been released.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    next_id: u64,
    entries: IndexMap<WatchId, Entry>,
    ids: HashMap<EmittedKey, WatchId>,
    emitted: EmittedIndex,
}

impl WatchRegistry {
    /// Registers a watch, returning the identifier of the shared entry.
    pub fn add(&mut self, watch: Watch) -> WatchId {
        let key = watch.key();
        if let Some(id) = self.ids.get(&key) {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.listeners += 1;
                return *id;
            }
        }

        self.next_id += 1;
        let id = WatchId(self.next_id);

        self.entries.insert(
            id,
            Entry {
                watch,
                listeners: 1,
            },
        );
        self.ids.insert(key, id);

        id
    }

    /// Releases one registration. Returns whether the watch was removed.
    pub fn remove(&mut self, id: WatchId) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };

        entry.listeners -= 1;
        if entry.listeners > 0 {
            return false;
        }

        if let Some(entry) = self.entries.shift_remove(&id) {
            self.ids.remove(&entry.watch.key());
        }
        true
    }

    pub fn contains(&self, id: WatchId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: WatchId) -> Option<&Watch> {
        self.entries.get(&id).map(|entry| &entry.watch)
    }

    pub fn get_mut(&mut self, id: WatchId) -> Option<&mut Watch> {
        self.entries.get_mut(&id).map(|entry| &mut entry.watch)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the watches in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (WatchId, &mut Watch)> {
        self.entries
            .iter_mut()
            .map(|(id, entry)| (*id, &mut entry.watch))
    }

    /// Delivery records shared by all watches.
    pub fn emitted(&self) -> &EmittedIndex {
        &self.emitted
    }

    pub fn emitted_mut(&mut self) -> &mut EmittedIndex {
        &mut self.emitted
    }

    /// Forgets delivery records that are too old relative to `current_block`.
    pub fn gc(&mut self, current_block: u64) {
        self.emitted.gc(current_block);
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;
    use crate::{emitted::Emitted, filter::OneOrMore};

    fn token_filter(last_byte: u8) -> LogFilter {
        LogFilter {
            address: Some(OneOrMore::One(Address::with_last_byte(last_byte))),
            ..LogFilter::default()
        }
    }

    #[test]
    fn identical_watches_share_an_entry() {
        let mut registry = WatchRegistry::default();

        let first = registry.add(Watch::transaction(B256::repeat_byte(1)));
        let second = registry.add(Watch::transaction(B256::repeat_byte(1)));
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);

        assert!(!registry.remove(first));
        assert!(registry.contains(first));
        assert!(registry.remove(first));
        assert!(!registry.contains(first));
        assert!(!registry.remove(first));
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut registry = WatchRegistry::default();

        let a = registry.add(Watch::filter(token_filter(1)));
        let b = registry.add(Watch::transaction(B256::repeat_byte(2)));
        let c = registry.add(Watch::filter(token_filter(3)));
        registry.remove(b);
        let d = registry.add(Watch::transaction(B256::repeat_byte(4)));

        let order: Vec<WatchId> = registry.iter_mut().map(|(id, _watch)| id).collect();
        assert_eq!(order, vec![a, c, d]);
    }

    #[test]
    fn filter_range_is_bounded() {
        let mut watch = FilterWatch::new(token_filter(1));

        assert_eq!(watch.begin_query(100, 10), Some((100, 100)));
        assert_eq!(watch.last_block_number, Some(99));
        assert_eq!(watch.begin_query(101, 10), None);

        watch.in_flight = false;
        watch.last_block_number = Some(50);
        assert_eq!(watch.begin_query(100, 10), Some((90, 100)));

        watch.in_flight = false;
        watch.last_block_number = Some(0);
        assert_eq!(watch.begin_query(5, 10), Some((1, 5)));
    }

    #[test]
    fn gc_forwards_to_emitted_index() {
        let mut registry = WatchRegistry::default();
        registry
            .emitted_mut()
            .mark(EmittedKey::Transaction(B256::ZERO), Emitted::Block(10));

        registry.gc(23);
        assert!(registry.emitted().is_empty());
    }
}
