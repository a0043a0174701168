use crate::site::Site;
use thiserror::Error;

/// Non-fatal irregularity observed by the ledger.
///
/// Every anomaly bumps a dedicated counter before it is returned, so the ledger
/// stays consistent whether or not the caller looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Anomaly {
    /// The underlying allocator returned no memory.
    #[error("memory allocation failed")]
    AllocationFailed { site: Site },
    /// The slot table is full. The allocation itself went through but is untracked.
    #[error("max allocations reached")]
    CapacityExceeded { site: Site },
    /// Release of the null handle.
    #[error("tried to free a null pointer")]
    NullRelease { site: Site },
    /// Release of an address with no live record: a double free, or memory
    /// that was never tracked.
    #[error("double free or invalid free")]
    UnknownRelease { site: Site },
}

impl Anomaly {
    pub fn site(&self) -> Site {
        match *self {
            Anomaly::AllocationFailed { site }
            | Anomaly::CapacityExceeded { site }
            | Anomaly::NullRelease { site }
            | Anomaly::UnknownRelease { site } => site,
        }
    }
}
