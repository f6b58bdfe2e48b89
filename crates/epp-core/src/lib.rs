//! Core types: result codes, transaction IDs, tracing

pub mod code;
pub mod tracing;
pub mod trid;

pub use code::{
    Class, Disposition, ObjectMissingPolicy, ResultCode, UnhandledCode, classify, interpret,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
