//! Operations merging several tensors into one.

pub mod concat;
pub mod stack;

pub use concat::{concat_op, Concatenate};
pub use stack::{stack_op, Stack};

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
