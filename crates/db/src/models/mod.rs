//! Row structs for the store tables.

pub mod document;
