// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod csv_input;
pub mod http;
