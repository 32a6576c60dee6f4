//! # graphql-connection-lib
//!
//! `graphql-connection-lib` is a collection of utilities used by the `graphql-connection-*` crates.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod defaults;
pub mod utils;
