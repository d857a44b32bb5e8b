//! Report configuration.

use crate::types::DeviceType;
use serde::Serialize;

/// How the inventory is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The human-readable console transcript.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Configuration for an enumeration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Output format.
    pub format: OutputFormat,
    /// Whether to query and print the extended attribute set.
    pub verbose: bool,
    /// Device categories that get detailed output.
    pub device_type: DeviceType,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            verbose: false,
            device_type: DeviceType::ALL,
        }
    }
}

impl ReportConfig {
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::new()
    }
}

/// Builder for creating a custom report configuration.
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ReportConfig::default(),
        }
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Restrict detailed device output to `device_type`.
    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.config.device_type = device_type;
        self
    }

    pub fn build(self) -> ReportConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_plain_invocation() {
        let config = ReportConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert!(!config.verbose);
        assert_eq!(config.device_type, DeviceType::ALL);
    }

    #[test]
    fn test_builder() {
        let config = ReportConfig::builder()
            .format(OutputFormat::Json)
            .verbose(true)
            .device_type(DeviceType::GPU)
            .build();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.verbose);
        assert_eq!(config.device_type, DeviceType::GPU);
    }
}
