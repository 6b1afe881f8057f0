//! Subcommand implementations.

pub mod compare;
pub mod corpus;
pub mod decode;
pub mod run;
