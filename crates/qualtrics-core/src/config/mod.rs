//! Configuration and profile management for Qualtrics tools
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! # Features
//!
//! - Multiple named profiles, one per datacenter/credential pair
//! - Secure credential storage using OS keyring (optional)
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

pub mod config;
pub mod credential;
pub mod error;

pub use config::{
    Config, DEFAULT_SCOPE, ENV_API_TOKEN, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_DATACENTER_ID,
    OAuthClient, Profile,
};
pub use credential::{CredentialSource, CredentialStore};
pub use error::{ConfigError, Result};
