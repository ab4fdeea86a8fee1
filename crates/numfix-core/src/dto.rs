use crate::domain::{BatchRef, BatchStats, NumberRecord};
use serde::{Deserialize, Serialize};

/// Outcome of checking a single number without storing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberCheckDto {
    Fixed {
        number_provided: String,
        number_fixed: String,
        valid: bool,
        changes: Vec<String>,
    },
    Valid {
        valid: bool,
    },
}

impl From<&NumberRecord> for NumberCheckDto {
    fn from(record: &NumberRecord) -> Self {
        if record.is_valid() {
            return Self::Valid { valid: true };
        }
        Self::Fixed {
            number_provided: record.raw_input().to_string(),
            number_fixed: record.working_value().to_string(),
            valid: false,
            changes: record.changes().iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummaryDto {
    #[serde(rename = "ref")]
    pub batch_ref: BatchRef,
    pub stats: BatchStats,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub message: String,
}

impl ErrorDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
