//! Business logic services

pub mod contacts_api;
pub mod wizard;
