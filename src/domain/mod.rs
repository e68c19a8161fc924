//! Domain layer - pure types and logic with no I/O.

pub mod document;
pub mod foundation;
