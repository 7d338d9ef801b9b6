pub mod exp;
pub mod ln;
pub mod sqrt;

pub use exp::{exp_op, Exp};
pub use ln::{ln_op, Ln};
pub use sqrt::{sqrt_op, Sqrt};

#[cfg(test)]
#[path = "math_elem_test.rs"]
mod tests;
