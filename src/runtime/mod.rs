//! # Runtime Module
//!
//! Runtime components for the unsealer, including initialization, the watch
//! loop, shutdown signal handling and the metrics/probe server.

pub mod initialization;
pub mod server;
pub mod shutdown;
pub mod watch_loop;

pub use initialization::*;
pub use server::*;
pub use shutdown::*;
pub use watch_loop::*;
