// src/mapreduce/window.rs

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Maximum number of transforms a [`Scheduler`](super::Scheduler) keeps in
/// flight at once.
///
/// The default is the platform's available parallelism; a window of one makes
/// a scheduling operation fully sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Window(NonZeroUsize);

impl Window {
    /// One transform at a time: transform, combine, transform, combine, ...
    pub const SEQUENTIAL: Window = Window(NonZeroUsize::MIN);

    /// Returns `None` for a zero-width window.
    pub fn new(width: usize) -> Option<Self> {
        NonZeroUsize::new(width).map(Window)
    }

    /// Window sized to `std::thread::available_parallelism`, or one if the
    /// platform cannot report it.
    pub fn available_parallelism() -> Self {
        std::thread::available_parallelism()
            .map(Window)
            .unwrap_or(Self::SEQUENTIAL)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::available_parallelism()
    }
}

impl From<NonZeroUsize> for Window {
    fn from(width: NonZeroUsize) -> Self {
        Window(width)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let width: usize = s
            .trim()
            .parse()
            .map_err(|e| format!("invalid window '{s}': {e}"))?;
        Window::new(width).ok_or_else(|| "window must be >= 1 (got 0)".to_string())
    }
}
