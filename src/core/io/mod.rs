//! Input records exchanged between the windowing layer, the host and tools.

pub mod input;
