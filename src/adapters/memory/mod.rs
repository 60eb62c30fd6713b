//! In-memory adapters for tests and dry runs.

mod clock;
mod filesystem;

pub use clock::FixedClock;
pub use filesystem::MemoryFileSystem;
