// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline configuration loading and validation.

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Pipeline file loaded and validated.
///
/// # Log Level
/// `info!`
pub struct PipelineLoaded<'a> {
    pub path: &'a str,
    pub component_count: usize,
    pub connection_count: usize,
}

impl Display for PipelineLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded pipeline '{}': {} components, {} connections",
            self.path, self.component_count, self.connection_count
        )
    }
}

impl StructuredLog for PipelineLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            component_count = self.component_count,
            connection_count = self.connection_count,
            "{}", self
        );
    }
}

/// A single validation problem in a pipeline file.
///
/// # Log Level
/// `error!`
///
/// # Example
/// ```
/// use the_harness::errors::ValidationError;
/// use the_harness::observability::messages::config::PipelineValidationFailed;
///
/// let error = ValidationError::DuplicateComponentName { name: "sink".into() };
/// let msg = PipelineValidationFailed { error: &error };
///
/// assert!(msg.to_string().contains("Duplicate component name: 'sink'"));
/// ```
pub struct PipelineValidationFailed<'a> {
    pub error: &'a ValidationError,
}

impl Display for PipelineValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline validation failed: {}", self.error)
    }
}

impl StructuredLog for PipelineValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}
