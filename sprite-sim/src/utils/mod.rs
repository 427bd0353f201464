//! Shared utilities for the sprite-sim CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
