//! Domain layer: pure models and port traits.

pub mod models;
pub mod ports;
