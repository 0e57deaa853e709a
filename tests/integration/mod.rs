//! Integration test modules for ripieno
//!
//! - engine: Engine construction, plugin slots and load failures
//! - rack: Signal flow through the continuous rack
//! - remote: Remote-control requests and host notifications

pub mod engine;
pub mod rack;
pub mod remote;
