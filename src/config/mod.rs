//! Configuration module for jboss-runner.
//!
//! This module handles parsing, validation, and access to configuration
//! settings for application servers. It supports loading configurations from
//! files or strings in JSON format.
//!
//! # Examples
//!
//! Loading a configuration from a file:
//!
//! ```no_run
//! use jboss_runner::config::Config;
//!
//! let config = Config::from_file("config.json").unwrap();
//! println!("Loaded configuration with {} servers", config.servers.len());
//! ```
//!
//! Creating a configuration programmatically:
//! ```
//! use jboss_runner::config::{Config, JBossConfiguration};
//! use std::collections::HashMap;
//!
//! let mut servers = HashMap::new();
//!
//! let server_config = JBossConfiguration {
//!     port: Some(10090),
//!     ..Default::default()
//! };
//!
//! servers.insert("wf8".to_string(), server_config);
//! let config = Config { servers };
//! ```
mod parser;
pub mod validator;

pub use parser::{Config, JBossConfiguration};
pub use validator::validate_config;
