use crate::site::Site;

/// The null handle. Never stored in a slot.
pub const EMPTY_ADDRESS: usize = 0;

/// One live, tracked allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationRecord {
    pub address: usize,
    pub size: usize,
    pub site: Site,
}

/// Fixed-capacity, linearly scanned table of allocation records.
///
/// Lookups are O(N). Slot reuse is first-fit: a freed slot is handed out again
/// before any slot after it. Empty slots are `None`, which keeps a fresh table
/// all-zero.
pub struct SlotTable<const N: usize> {
    slots: [Option<AllocationRecord>; N],
    len: usize,
}

impl<const N: usize> Default for SlotTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SlotTable<N> {
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            len: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Index of the occupied slot holding `address`. The null handle never matches.
    pub fn find_by_address(&self, address: usize) -> Option<usize> {
        if address == EMPTY_ADDRESS || self.len == 0 {
            return None;
        }
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(record) if record.address == address))
    }

    /// Index of the first empty slot, `None` when the table is full.
    pub fn find_free_slot(&self) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        self.slots.iter().position(Option::is_none)
    }

    pub fn get(&self, index: usize) -> Option<&AllocationRecord> {
        self.slots.get(index)?.as_ref()
    }

    /// Populate an empty slot.
    ///
    /// # Panics
    ///
    /// If `index` is out of range or the slot is occupied.
    pub(crate) fn fill(&mut self, index: usize, record: AllocationRecord) {
        debug_assert_ne!(record.address, EMPTY_ADDRESS);
        let slot = &mut self.slots[index];
        assert!(slot.is_none(), "slot {index} is already occupied");
        *slot = Some(record);
        self.len += 1;
    }

    /// Reset a slot to empty and return what it held.
    pub(crate) fn clear(&mut self, index: usize) -> Option<AllocationRecord> {
        let record = self.slots[index].take();
        if record.is_some() {
            self.len -= 1;
        }
        record
    }

    /// Occupied records in slot order.
    pub fn occupied(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.slots.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: usize, size: usize) -> AllocationRecord {
        AllocationRecord {
            address,
            size,
            site: Site::new("slots.rs", 1),
        }
    }

    #[test]
    fn test_new_table_is_empty() {
        let table = SlotTable::<4>::new();
        assert_eq!(table.capacity(), 4);
        assert_eq!(table.len(), 0);
        assert_eq!(table.find_free_slot(), Some(0));
        assert_eq!(table.occupied().count(), 0);
    }

    #[test]
    fn test_empty_sentinel_is_never_found() {
        let mut table = SlotTable::<4>::new();
        table.fill(0, record(0x10, 8));
        assert_eq!(table.find_by_address(EMPTY_ADDRESS), None);
        assert_eq!(table.find_by_address(0x10), Some(0));
        assert_eq!(table.find_by_address(0x20), None);
    }

    #[test]
    fn test_free_slot_is_first_fit() {
        let mut table = SlotTable::<4>::new();
        for (i, address) in [0x10, 0x20, 0x30].into_iter().enumerate() {
            table.fill(i, record(address, 1));
        }
        let cleared = table.clear(1).map(|r| r.address);
        assert_eq!(cleared, Some(0x20));
        assert_eq!(table.clear(1), None);
        assert_eq!(table.len(), 2);

        // slot 1 is reused ahead of the never-used slot 3
        assert_eq!(table.find_free_slot(), Some(1));
    }

    #[test]
    fn test_full_table_has_no_free_slot() {
        let mut table = SlotTable::<2>::new();
        table.fill(0, record(0x10, 1));
        table.fill(1, record(0x20, 1));
        assert!(table.is_full());
        assert_eq!(table.find_free_slot(), None);
    }

    #[test]
    fn test_occupied_follows_slot_order() {
        let mut table = SlotTable::<4>::new();
        table.fill(2, record(0x30, 3));
        table.fill(0, record(0x10, 1));
        let addresses: Vec<usize> = table.occupied().map(|r| r.address).collect();
        assert_eq!(addresses, vec![0x10, 0x30]);
        assert!(table.get(1).is_none());
        assert_eq!(table.get(2).map(|r| r.size), Some(3));
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn test_fill_occupied_slot_panics() {
        let mut table = SlotTable::<2>::new();
        table.fill(0, record(0x10, 1));
        table.fill(0, record(0x20, 1));
    }
}
