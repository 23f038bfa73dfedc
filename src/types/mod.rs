//! Type definitions

pub mod contact;

pub use contact::*;
