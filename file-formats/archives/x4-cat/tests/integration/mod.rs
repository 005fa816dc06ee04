//! Feature integration tests

mod catalog;
mod extraction;
