use crate::domain::{CountryRegistry, NumberRecord};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("country code {key} not found in lookup")]
    UnknownCountry { key: String },
    #[error("invalid length {actual}, the length must be exactly {required}")]
    InvalidLength { actual: usize, required: usize },
}

/// A number the fix pipeline could not repair. The record is left cleared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct Rejection {
    pub record: NumberRecord,
    #[source]
    pub error: NormalizeError,
}

/// Runs the fix pipeline for one number.
///
/// Steps run in a fixed order: dialing prefix, digit purity, overflow truncation,
/// then the shortfall check. The order matters: a prepended prefix can push a number
/// over the limit, and stripping non-digits can pull it back under.
pub fn normalize(
    registry: &CountryRegistry,
    country_key: &str,
    raw_number: &str,
) -> Result<NumberRecord, Rejection> {
    let mut record = NumberRecord::new(country_key, raw_number);

    let Some(profile) = registry.lookup(country_key) else {
        record.clear();
        return Err(reject(
            record,
            NormalizeError::UnknownCountry {
                key: country_key.to_string(),
            },
        ));
    };

    if !record.working_value().starts_with(&profile.dialing_prefix) {
        record.prepend(&profile.dialing_prefix);
    }

    if !is_digits_only(record.working_value()) {
        record.strip_non_digits();
    }

    if record.working_value().len() > profile.required_length {
        let removed = record.truncate_to(profile.required_length);
        info!(number = raw_number, removed = %removed, "shortened number");
    }

    if record.working_value().len() < profile.required_length {
        record.clear();
        return Err(reject(
            record,
            NormalizeError::InvalidLength {
                actual: raw_number.len(),
                required: profile.required_length,
            },
        ));
    }

    Ok(record)
}

fn is_digits_only(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

fn reject(record: NumberRecord, error: NormalizeError) -> Rejection {
    info!(number = record.raw_input(), error = %error, "number rejected");
    Rejection { record, error }
}
