//! Error taxonomy for the review pipeline.
//!
//! Three failure classes reach callers: field-scoped validation problems
//! (pre-network), upload failures (asset store), and gateway failures
//! (record store said no, or could not be reached). A cache miss is not an
//! error anywhere in this crate.

use std::fmt;

use thiserror::Error;

/// Form fields that validation can flag, named with the wire spelling so a
/// UI can map issues straight onto inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    FoodName,
    RestaurantName,
    Location,
    Rating,
    ShortReview,
    DetailedReview,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::FoodName => "foodName",
            DraftField::RestaurantName => "restaurantName",
            DraftField::Location => "location",
            DraftField::Rating => "rating",
            DraftField::ShortReview => "shortReview",
            DraftField::DetailedReview => "detailedReview",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation problem on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: DraftField,
    pub message: String,
}

/// Per-field validation outcome collected before any network step runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<FieldIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: DraftField, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// First message recorded for `field`, if any.
    pub fn message_for(&self, field: DraftField) -> Option<&str> {
        self.issues
            .iter()
            .find(|issue| issue.field == field)
            .map(|issue| issue.message.as_str())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", issue.field, issue.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Record-store failure. `Rejected` carries the body-level message verbatim;
/// `Transport` covers unreachable hosts and undecodable responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Rejected(String),
    #[error("request failed: {0}")]
    Transport(String),
}

impl GatewayError {
    /// The user-facing message, without the transport prefix.
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Rejected(msg) | GatewayError::Transport(msg) => msg,
        }
    }
}

/// Asset store failure. One opaque class: the workflow aborts on any of it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("image upload failed: {0}")]
pub struct UploadError(pub String);

/// Everything a submission can die from, in the order the steps run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitError {
    #[error("review form has invalid fields: {0}")]
    Invalid(ValidationReport),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl SubmitError {
    /// Validation detail when this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationReport> {
        match self {
            SubmitError::Invalid(report) => Some(report),
            _ => None,
        }
    }
}
