pub mod operation;

pub use operation::{apply_op, Operation, OperationClone};
