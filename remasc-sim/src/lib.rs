//! REMASC chain simulator library.
//!
//! Builds a seeded chain with random fees and uncles, runs the fee contract
//! as the last transaction of every block, and reports what it paid. Used by
//! the `remasc-sim` binary and by tests.

pub mod cli;
pub mod sim;
