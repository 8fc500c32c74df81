//! Core building blocks shared by tools and their host: configuration nodes,
//! the property tree, the display context contract and input records.

pub mod config;
pub mod context;
pub mod errors;
pub mod io;
pub mod properties;
pub mod settings;
