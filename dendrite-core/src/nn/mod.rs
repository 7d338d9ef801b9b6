//! Layers, losses and the parameter model.

pub mod config;
pub mod init;
pub mod layers;
pub mod losses;
pub mod parameter;
pub mod regularizers;

pub use config::LayerConfig;
pub use init::Initializer;
pub use layers::{Dense, Dropout, Flatten, Gru, Lstm, SimpleRnn};
pub use parameter::{ParamId, Parameter};
pub use regularizers::{Regularizer, RegularizerKind};
