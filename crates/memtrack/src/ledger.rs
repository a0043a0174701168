use serde::{Deserialize, Serialize};

use crate::anomaly::Anomaly;
use crate::report::Report;
use crate::site::Site;
use crate::slots::{AllocationRecord, SlotTable, EMPTY_ADDRESS};

/// Capacity of the process-wide ledger.
pub const DEFAULT_CAPACITY: usize = 1_000_000;

/// Aggregate counters kept alongside the slot table.
///
/// All fields only ever grow except `current_allocated_size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_allocated_size: u64,
    pub total_free_size: u64,
    pub current_allocated_size: u64,
    pub max_allocated_size: u64,
    pub allocation_count: u64,
    pub free_count: u64,
    pub failed_allocations: u64,
    pub double_frees: u64,
    pub invalid_frees: u64,
}

impl Stats {
    pub const ZERO: Stats = Stats {
        total_allocated_size: 0,
        total_free_size: 0,
        current_allocated_size: 0,
        max_allocated_size: 0,
        allocation_count: 0,
        free_count: 0,
        failed_allocations: 0,
        double_frees: 0,
        invalid_frees: 0,
    };

    /// Bytes allocated and never released.
    pub fn leaked(&self) -> u64 {
        self.total_allocated_size - self.total_free_size
    }

    /// Double frees and null frees combined.
    pub fn invalid_releases(&self) -> u64 {
        self.double_frees + self.invalid_frees
    }

    /// Records that should still be occupying a slot.
    pub fn live_count(&self) -> u64 {
        self.allocation_count - self.free_count
    }
}

/// Record/release bookkeeping over a fixed-size [`SlotTable`].
///
/// The ledger is not synchronized. The process-wide instance lives behind a
/// single mutex; standalone instances can be owned and driven directly.
pub struct Ledger<const N: usize> {
    table: SlotTable<N>,
    stats: Stats,
}

impl<const N: usize> Default for Ledger<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Ledger<N> {
    pub const fn new() -> Self {
        Self {
            table: SlotTable::new(),
            stats: Stats::ZERO,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn table(&self) -> &SlotTable<N> {
        &self.table
    }

    /// Live records in slot order.
    pub fn live(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.table.occupied()
    }

    pub fn contains(&self, address: usize) -> bool {
        self.table.find_by_address(address).is_some()
    }

    /// Track a block handed out by the underlying allocator.
    ///
    /// `address` equal to the null sentinel means the allocator failed. When
    /// the table is full the block stays allocated but untracked.
    pub fn record(&mut self, address: usize, size: usize, site: Site) -> Result<(), Anomaly> {
        if address == EMPTY_ADDRESS {
            self.stats.failed_allocations += 1;
            return Err(Anomaly::AllocationFailed { site });
        }

        let Some(index) = self.table.find_free_slot() else {
            self.stats.failed_allocations += 1;
            return Err(Anomaly::CapacityExceeded { site });
        };

        self.table.fill(
            index,
            AllocationRecord {
                address,
                size,
                site,
            },
        );

        let size = size as u64;
        self.stats.total_allocated_size += size;
        self.stats.current_allocated_size += size;
        if self.stats.current_allocated_size > self.stats.max_allocated_size {
            self.stats.max_allocated_size = self.stats.current_allocated_size;
        }
        self.stats.allocation_count += 1;
        Ok(())
    }

    /// Stop tracking `address`, returning the size it was recorded with.
    ///
    /// Callers must only hand the block back to the underlying allocator on
    /// `Ok`.
    pub fn release(&mut self, address: usize, site: Site) -> Result<usize, Anomaly> {
        if address == EMPTY_ADDRESS {
            self.stats.invalid_frees += 1;
            return Err(Anomaly::NullRelease { site });
        }

        let Some(index) = self.table.find_by_address(address) else {
            self.stats.double_frees += 1;
            return Err(Anomaly::UnknownRelease { site });
        };

        let Some(record) = self.table.clear(index) else {
            self.stats.double_frees += 1;
            return Err(Anomaly::UnknownRelease { site });
        };
        let size = record.size as u64;
        self.stats.total_free_size += size;
        self.stats.current_allocated_size -= size;
        self.stats.free_count += 1;
        Ok(record.size)
    }

    /// Snapshot of the counters and every live record.
    pub fn report(&self, label: &str) -> Report {
        Report::new(label, self.stats, self.live())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn site(line: u32) -> Site {
        Site::new("a.c", line)
    }

    fn assert_consistent<const N: usize>(ledger: &Ledger<N>) {
        let stats = ledger.stats();
        assert_eq!(
            stats.current_allocated_size,
            stats.total_allocated_size - stats.total_free_size
        );
        assert!(stats.max_allocated_size >= stats.current_allocated_size);
        assert_eq!(ledger.table().len() as u64, stats.live_count());
        let live_bytes: u64 = ledger.live().map(|r| r.size as u64).sum();
        assert_eq!(live_bytes, stats.leaked());
    }

    #[test]
    fn test_scenario_partial_release_leaves_leaks() {
        let mut ledger = Ledger::<16>::new();
        ledger.record(0x1, 10, site(1)).unwrap();
        ledger.record(0x2, 20, site(2)).unwrap();
        ledger.record(0x3, 30, site(3)).unwrap();
        assert_eq!(ledger.release(0x2, site(4)), Ok(20));

        let stats = ledger.stats();
        assert_eq!(stats.allocation_count, 3);
        assert_eq!(stats.free_count, 1);
        assert_eq!(stats.current_allocated_size, 40);
        assert_eq!(stats.leaked(), 40);

        let leaks: Vec<(usize, usize)> = ledger.live().map(|r| (r.address, r.size)).collect();
        assert_eq!(leaks, vec![(0x1, 10), (0x3, 30)]);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_scenario_null_release() {
        let mut ledger = Ledger::<4>::new();
        let result = ledger.release(EMPTY_ADDRESS, Site::new("b.c", 1));
        assert_eq!(
            result,
            Err(Anomaly::NullRelease {
                site: Site::new("b.c", 1)
            })
        );

        let stats = ledger.stats();
        assert_eq!(stats.invalid_frees, 1);
        assert_eq!(stats.allocation_count, 0);
        assert_eq!(stats.current_allocated_size, 0);
    }

    #[test]
    fn test_scenario_double_free() {
        let mut ledger = Ledger::<4>::new();
        ledger.record(0x5, 100, Site::new("c.c", 1)).unwrap();
        assert_eq!(ledger.release(0x5, Site::new("c.c", 2)), Ok(100));
        assert_eq!(
            ledger.release(0x5, Site::new("c.c", 3)),
            Err(Anomaly::UnknownRelease {
                site: Site::new("c.c", 3)
            })
        );

        let stats = ledger.stats();
        assert_eq!(stats.free_count, 1);
        assert_eq!(stats.double_frees, 1);
        assert_eq!(stats.invalid_releases(), 1);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_null_release_does_not_touch_sizes() {
        let mut ledger = Ledger::<4>::new();
        ledger.record(0x10, 64, site(1)).unwrap();
        let _ = ledger.release(EMPTY_ADDRESS, site(2));
        assert_eq!(ledger.stats().current_allocated_size, 64);
        assert_eq!(ledger.stats().free_count, 0);
    }

    #[test]
    fn test_failed_allocation_consumes_no_slot() {
        let mut ledger = Ledger::<4>::new();
        assert_eq!(
            ledger.record(EMPTY_ADDRESS, 128, site(9)),
            Err(Anomaly::AllocationFailed { site: site(9) })
        );
        let stats = ledger.stats();
        assert_eq!(stats.failed_allocations, 1);
        assert_eq!(stats.allocation_count, 0);
        assert_eq!(stats.total_allocated_size, 0);
        assert!(ledger.table().is_empty());
    }

    #[test]
    fn test_balanced_lifecycle() {
        let mut ledger = Ledger::<64>::new();
        for i in 1..=50usize {
            ledger.record(i * 16, i, site(i as u32)).unwrap();
        }
        for i in (1..=50usize).rev() {
            assert_eq!(ledger.release(i * 16, site(100)), Ok(i));
        }

        let stats = ledger.stats();
        assert_eq!(stats.current_allocated_size, 0);
        assert_eq!(stats.max_allocated_size, (1..=50).sum::<u64>());
        assert_eq!(ledger.live().count(), 0);
        assert!(ledger.report("balanced").leaks.is_empty());
    }

    #[test]
    fn test_capacity_exhaustion() {
        let mut ledger = Ledger::<4>::new();
        for i in 1..=4usize {
            ledger.record(i, 8, site(1)).unwrap();
        }
        for i in 5..=7usize {
            assert_eq!(
                ledger.record(i, 8, site(2)),
                Err(Anomaly::CapacityExceeded { site: site(2) })
            );
        }

        let stats = ledger.stats();
        assert_eq!(stats.failed_allocations, 3);
        assert_eq!(stats.allocation_count, 4);
        assert_eq!(ledger.table().len(), ledger.capacity());
        assert_eq!(stats.current_allocated_size, 32);

        // untracked block is indistinguishable from a double free
        assert_eq!(
            ledger.release(6, site(3)),
            Err(Anomaly::UnknownRelease { site: site(3) })
        );
        assert_consistent(&ledger);
    }

    #[test]
    fn test_freed_slot_is_reused() {
        let mut ledger = Ledger::<2>::new();
        ledger.record(0x1, 1, site(1)).unwrap();
        ledger.record(0x2, 2, site(2)).unwrap();
        ledger.release(0x1, site(3)).unwrap();
        ledger.record(0x3, 3, site(4)).unwrap();

        let live: Vec<usize> = ledger.live().map(|r| r.address).collect();
        assert_eq!(live, vec![0x3, 0x2]);
    }

    #[test]
    fn test_peak_tracks_historical_maximum() {
        let mut ledger = Ledger::<8>::new();
        ledger.record(0x1, 100, site(1)).unwrap();
        ledger.record(0x2, 50, site(2)).unwrap();
        ledger.release(0x1, site(3)).unwrap();
        ledger.record(0x3, 20, site(4)).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.current_allocated_size, 70);
        assert_eq!(stats.max_allocated_size, 150);
    }

    #[test]
    fn test_zero_sized_allocation_is_tracked() {
        let mut ledger = Ledger::<2>::new();
        ledger.record(0x40, 0, site(1)).unwrap();
        assert!(ledger.contains(0x40));
        assert_eq!(ledger.release(0x40, site(2)), Ok(0));
        assert_eq!(ledger.stats().free_count, 1);
    }

    #[test]
    fn test_random_interleaving_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(0x6d656d74);
        let mut ledger = Ledger::<32>::new();
        let mut live: Vec<usize> = Vec::new();
        let mut peak = 0u64;
        let mut next_address = 0x1000usize;

        for step in 0..5_000u32 {
            match rng.gen_range(0..10) {
                0..=4 => {
                    next_address += 16;
                    let size = rng.gen_range(0..512);
                    if ledger.record(next_address, size, site(step)).is_ok() {
                        live.push(next_address);
                    }
                }
                5..=7 if !live.is_empty() => {
                    let address = live.swap_remove(rng.gen_range(0..live.len()));
                    assert!(ledger.release(address, site(step)).is_ok());
                }
                8 => {
                    let unknown = rng.gen_range(1..0x1000);
                    assert!(ledger.release(unknown, site(step)).is_err());
                }
                _ => {
                    assert!(ledger.release(EMPTY_ADDRESS, site(step)).is_err());
                }
            }

            let stats = ledger.stats();
            assert!(stats.max_allocated_size >= peak);
            peak = stats.max_allocated_size;
            assert_consistent(&ledger);
        }

        assert_eq!(ledger.table().len(), live.len());
    }
}
