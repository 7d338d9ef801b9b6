//! Reverse-mode automatic differentiation over define-by-run graphs.
//!
//! Operations record themselves as the creator of the tensor they produce;
//! [`graph::backward`] walks those links in reverse topological order.

pub mod grad_check;
pub mod graph;

pub use graph::{backward, topological_sort, NodeId};
