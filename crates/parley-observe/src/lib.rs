//! Observability for Parley: subscriber setup and the spans handed to services.

pub mod spans;
pub mod tracing_setup;
