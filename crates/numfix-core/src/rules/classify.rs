use crate::domain::{
    BatchRef, BatchStats, CountryRegistry, FixedEntry, RejectedEntry, ValidEntry,
};
use crate::rules::normalize::normalize;
use tracing::debug;

/// One submission partitioned into valid, fixed and rejected numbers.
///
/// Every input number lands in exactly one category, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedBatch {
    pub batch_ref: BatchRef,
    pub country_code: String,
    pub valid: Vec<ValidEntry>,
    pub fixed: Vec<FixedEntry>,
    pub rejected: Vec<RejectedEntry>,
}

impl ClassifiedBatch {
    pub fn stats(&self) -> BatchStats {
        BatchStats::new(self.valid.len(), self.fixed.len(), self.rejected.len())
    }
}

pub fn classify<I, S>(registry: &CountryRegistry, country_key: &str, raw_numbers: I) -> ClassifiedBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut batch = ClassifiedBatch {
        batch_ref: BatchRef::new(),
        country_code: country_key.to_string(),
        valid: Vec::new(),
        fixed: Vec::new(),
        rejected: Vec::new(),
    };

    for raw in raw_numbers {
        let raw = raw.as_ref();
        match normalize(registry, country_key, raw) {
            // The rejection reason is logged by the normalizer; only the raw value is kept.
            Err(_) => batch.rejected.push(RejectedEntry {
                number: raw.to_string(),
            }),
            Ok(record) if record.is_valid() => batch.valid.push(ValidEntry {
                number: raw.to_string(),
                country_code: country_key.to_string(),
            }),
            Ok(record) => batch.fixed.push(FixedEntry {
                original_number: raw.to_string(),
                changes: record.change_summary(),
                fixed_number: record.working_value().to_string(),
            }),
        }
    }

    debug!(
        batch_ref = %batch.batch_ref,
        valid = batch.valid.len(),
        fixed = batch.fixed.len(),
        rejected = batch.rejected.len(),
        "batch classified"
    );
    batch
}
