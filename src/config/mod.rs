//! # Unsealer Configuration
//!
//! Settings that are not exposed as command-line flags are loaded from
//! environment variables with sensible defaults (see [`crate::constants`]).
//! Unseal key shares are loaded from the environment by [`load_keys_from_env`]
//! when none are passed on the command line.

mod keys;
mod unsealer;

pub use keys::{load_keys_from_env, load_keys_with, UnsealKey};
pub use unsealer::UnsealerConfig;
