//! Environment-driven configuration for a forked EVM development network,
//! plus a JSON-RPC controller for the node running that fork.
//!
//! The configuration is resolved from `CHAIN_ID` and a fork source URL
//! variable by [`ConfigVariant::resolve`], rendered to JSON for the
//! consuming framework, and optionally served over HTTP.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

/// Environment inputs and variant resolution.
pub mod config;
pub use config::{ConfigVariant, ControllerConfig, ForkEnv};

/// Fork node controller.
pub mod fork;
pub use fork::{ForkController, ForkError};

/// Resolved configuration and checks.
pub mod profile;
pub use profile::{ChainId, ConfigIssue, HardhatConfig};

/// Configuration and healthcheck HTTP service.
pub mod service;

/// Test utilities.
pub mod test_utils;

// Anchor for the eyre dependency, used by the binaries.
use eyre as _;
