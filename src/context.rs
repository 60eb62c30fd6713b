//! Service context bundling all port trait objects.

use chrono::{DateTime, Utc};

use crate::adapters::live::{LiveClock, LiveFileSystem};
use crate::adapters::memory::{FixedClock, MemoryFileSystem};
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;

/// Bundles all port trait objects into a single context.
///
/// Every stage of the audit reaches the outside world only through these
/// fields, so the same pipeline runs against disk or an in-memory tree.
pub struct ServiceContext {
    /// Clock for stamping generated artifacts.
    pub clock: Box<dyn Clock>,
    /// Filesystem for reading inputs and writing artifacts.
    pub fs: Box<dyn FileSystem>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(clock: Box<dyn Clock>, fs: Box<dyn FileSystem>) -> Self {
        Self { clock, fs }
    }

    /// Creates a live context backed by the real disk and system clock.
    #[must_use]
    pub fn live() -> Self {
        Self::new(Box::new(LiveClock), Box::new(LiveFileSystem))
    }

    /// Creates a context over an in-memory tree with the clock pinned to the
    /// Unix epoch.
    #[must_use]
    pub fn in_memory(fs: MemoryFileSystem) -> Self {
        Self::new(Box::new(FixedClock(DateTime::<Utc>::UNIX_EPOCH)), Box::new(fs))
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext").finish_non_exhaustive()
    }
}
