//! Parameterised and stochastic layers.

pub mod dense;
pub mod dropout;
pub mod flatten;
pub mod recurrent;

pub use dense::Dense;
pub use dropout::Dropout;
pub use flatten::Flatten;
pub use recurrent::{Gru, Lstm, Recurrent, RecurrentConfig, SimpleRnn};
