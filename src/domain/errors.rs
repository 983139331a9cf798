//! Error taxonomy shared by the HTTP layer, background tasks and the log store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Auth,
    Database,
    S3Storage,
    Api,
    Client,
    Validation,
}

impl ErrorCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "AUTH",
            Self::Database => "DATABASE",
            Self::S3Storage => "S3_STORAGE",
            Self::Api => "API",
            Self::Client => "CLIENT",
            Self::Validation => "VALIDATION",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AUTH" => Ok(Self::Auth),
            "DATABASE" => Ok(Self::Database),
            "S3_STORAGE" => Ok(Self::S3Storage),
            "API" => Ok(Self::Api),
            "CLIENT" => Ok(Self::Client),
            "VALIDATION" => Ok(Self::Validation),
            other => Err(format!("Unknown error category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// High and critical errors are persisted to the log store.
    #[must_use]
    pub const fn is_persisted(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(format!("Unknown severity: {other}")),
        }
    }
}

/// Attached to error responses so the request middleware can hand them to the
/// log service.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub category: ErrorCategory,
    pub severity: Severity,
    pub message: String,
}

#[must_use]
pub fn format_error(category: ErrorCategory, severity: Severity, message: &str) -> String {
    format!("[{category}/{severity}] {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        assert_eq!(
            format_error(ErrorCategory::S3Storage, Severity::High, "upload failed"),
            "[S3_STORAGE/HIGH] upload failed"
        );
        assert_eq!(
            format_error(ErrorCategory::Validation, Severity::Low, "bad caption"),
            "[VALIDATION/LOW] bad caption"
        );
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "s3_storage".parse::<ErrorCategory>(),
            Ok(ErrorCategory::S3Storage)
        );
        assert_eq!("AUTH".parse::<ErrorCategory>(), Ok(ErrorCategory::Auth));
        assert!("network".parse::<ErrorCategory>().is_err());
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&ErrorCategory::S3Storage).unwrap();
        assert_eq!(json, "\"S3_STORAGE\"");
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }

    #[test]
    fn test_persisted_severities() {
        assert!(!Severity::Low.is_persisted());
        assert!(!Severity::Medium.is_persisted());
        assert!(Severity::High.is_persisted());
        assert!(Severity::Critical.is_persisted());
    }
}
