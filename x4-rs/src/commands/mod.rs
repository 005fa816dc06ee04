//! Command implementations

pub mod cat;
pub mod catalog;
pub mod info;
