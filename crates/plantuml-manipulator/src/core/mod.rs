//! Core building blocks shared by the parser, mutator and validator
//!
//! Types, errors, line I/O and logging setup live here; everything else in
//! the crate is built on top of them.

mod error;
pub mod lines;
pub mod logging;
mod types;

pub use error::*;
pub use lines::{join_lines, read_lines, split_lines, write_lines};
pub use logging::*;
pub use types::*;
