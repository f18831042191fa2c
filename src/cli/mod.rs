//! # CLI Module
//!
//! Command-line entry point for the bundled demo server.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve `GET /health` and the echo endpoints:
//!
//! ```bash
//! consume serve --addr 127.0.0.1:3000 --secure-headers --log-requests
//! ```
//!
//! Options fall back to the `CONSUME_*` environment variables described in
//! [`crate::runtime_config`].
//!
//! ### `routes`
//!
//! Print the endpoints in the order the router consults them:
//!
//! ```bash
//! consume routes
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{resolve_options, run_cli, Cli, Commands};
