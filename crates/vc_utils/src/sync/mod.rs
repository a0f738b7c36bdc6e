//! Synchronization helpers shared by the workspace.

// -----------------------------------------------------------------------------
// Modules

mod cache;

// -----------------------------------------------------------------------------
// Exports

pub use cache::ConcurrentCache;
