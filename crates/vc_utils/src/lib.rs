//! Shared utilities for the `vc_props` workspace.
//!
//! - [`hash`]: hash containers with a fixed, process-independent seed.
//! - [`sync`]: a read-mostly concurrent cache of immutable values.
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod hash;
pub mod sync;
