use std::cell::Cell;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::anomaly::Anomaly;
use crate::ledger::{Ledger, Stats, DEFAULT_CAPACITY};
use crate::report::Report;
use crate::site::Site;
use crate::slots::AllocationRecord;

/// The process-wide ledger. Const-initialized, so it is usable from the very
/// first allocation and needs no heap of its own.
static LEDGER: Mutex<Ledger<DEFAULT_CAPACITY>> = Mutex::new(Ledger::new());

thread_local! {
    // Depth of nested suspensions on this thread
    static SUSPENDED: Cell<u32> = const { Cell::new(0) };
}

/// While alive, interception points on this thread bypass the ledger.
///
/// Report rendering and warning output allocate; without this they would
/// re-enter the ledger lock from inside the global allocator.
pub(crate) struct Suspend {
    active: bool,
}

impl Suspend {
    pub(crate) fn new() -> Self {
        let active = SUSPENDED
            .try_with(|depth| depth.set(depth.get() + 1))
            .is_ok();
        Self { active }
    }
}

impl Drop for Suspend {
    fn drop(&mut self) {
        if self.active {
            let _ = SUSPENDED.try_with(|depth| depth.set(depth.get() - 1));
        }
    }
}

/// Whether tracking is suspended on the current thread. Threads whose locals
/// are already torn down are never suspended.
#[inline]
pub(crate) fn is_suspended() -> bool {
    SUSPENDED.try_with(|depth| depth.get() > 0).unwrap_or(false)
}

fn lock() -> MutexGuard<'static, Ledger<DEFAULT_CAPACITY>> {
    // Ledger updates never panic midway, a poisoned lock still holds consistent state
    LEDGER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `f` with exclusive access to the process-wide ledger.
pub(crate) fn with_ledger<R>(f: impl FnOnce(&mut Ledger<DEFAULT_CAPACITY>) -> R) -> R {
    f(&mut lock())
}

pub(crate) fn record(address: usize, size: usize, site: Site) -> Result<(), Anomaly> {
    with_ledger(|ledger| ledger.record(address, size, site))
}

pub(crate) fn release(address: usize, site: Site) -> Result<usize, Anomaly> {
    with_ledger(|ledger| ledger.release(address, site))
}

/// Counters of the process-wide ledger.
pub fn stats() -> Stats {
    with_ledger(|ledger| ledger.stats())
}

/// Counters and a copy of every live record, taken under one lock.
///
/// Nothing may allocate while the lock is held, so the buffer is sized
/// beforehand. Reserving it is itself a tracked allocation and can grow the
/// table, hence the headroom and the retry.
fn snapshot() -> (Stats, Vec<AllocationRecord>) {
    let mut records: Vec<AllocationRecord> = Vec::new();
    loop {
        let live = with_ledger(|ledger| ledger.table().len());
        records.reserve(live + SNAPSHOT_HEADROOM);

        let stats = with_ledger(|ledger| {
            if ledger.table().len() > records.capacity() {
                return None;
            }
            records.clear();
            records.extend(ledger.live().copied());
            Some(ledger.stats())
        });
        if let Some(stats) = stats {
            return (stats, records);
        }
    }
}

const SNAPSHOT_HEADROOM: usize = 64;

/// Snapshot of the process-wide ledger, available at any time.
///
/// The report is built outside the lock, so with the tracking allocator its
/// own memory is recorded and released like any other block.
pub fn report(label: &str) -> Report {
    let (stats, records) = snapshot();
    Report::new(label, stats, &records)
}

/// Render the process-wide ledger in the plain-text report layout.
pub fn generate_report() -> String {
    report(crate::DEFAULT_LABEL).to_string()
}
