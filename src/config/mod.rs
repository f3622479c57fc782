//! Configuration for the server-side admission gate.

mod settings;

pub use settings::*;
