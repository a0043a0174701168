use serde::Serialize;
use std::fmt;
use std::panic::Location;

/// Source location of an allocating or releasing call.
///
/// Sites are opaque to the ledger beyond display: they are stored next to each
/// live allocation and attached to every warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Site {
    pub file: &'static str,
    pub line: u32,
}

impl Site {
    /// Used when the interception point cannot observe its caller, e.g. the
    /// global allocator.
    pub const UNKNOWN: Site = Site {
        file: "<unknown>",
        line: 0,
    };

    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Site of the caller of the enclosing `#[track_caller]` function.
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&'static Location<'static>> for Site {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
