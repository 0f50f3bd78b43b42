// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Errors that can occur while loading a pipeline file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Problems found by pipeline validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two components share a name
    DuplicateComponentName { name: String },
    /// A connection refers to a component that isn't declared
    UnknownComponent { address: String, component: String },
    /// A connection endpoint is not of the form "component.port"
    InvalidAddress { address: String },
    /// The same port appears in more than one connection
    PortConnectedTwice { address: String },
    /// A numeric setting is zero or negative
    NonPositiveValue { field: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateComponentName { name } => {
                write!(f, "Duplicate component name: '{}'", name)
            }
            ValidationError::UnknownComponent { address, component } => {
                write!(
                    f,
                    "Connection '{}' refers to component '{}' which does not exist",
                    address, component
                )
            }
            ValidationError::InvalidAddress { address } => {
                write!(f, "Invalid port address '{}' (expected 'component.port')", address)
            }
            ValidationError::PortConnectedTwice { address } => {
                write!(f, "Port '{}' is connected more than once", address)
            }
            ValidationError::NonPositiveValue { field } => {
                write!(f, "'{}' must be greater than zero", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
