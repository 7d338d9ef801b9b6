pub mod dot;

pub use dot::{dot_op, Dot};
