//! utils.rs
//!
//! Helpers shared by the consensus value types.

pub mod time;
