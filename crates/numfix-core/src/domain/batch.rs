use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidEntry {
    pub number: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedEntry {
    pub original_number: String,
    pub changes: String,
    pub fixed_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEntry {
    pub number: String,
}

/// Per-category counts for one batch. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub valid_numbers_count: usize,
    pub fixed_numbers_count: usize,
    pub invalid_numbers_count: usize,
    pub total_numbers_processed: usize,
}

impl BatchStats {
    pub fn new(valid: usize, fixed: usize, rejected: usize) -> Self {
        Self {
            valid_numbers_count: valid,
            fixed_numbers_count: fixed,
            invalid_numbers_count: rejected,
            total_numbers_processed: valid + fixed + rejected,
        }
    }
}

/// Everything stored for one batch, in submission order within each category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResults {
    pub valid_numbers: Vec<String>,
    pub fixed_numbers: Vec<FixedEntry>,
    pub rejected_numbers: Vec<String>,
}

impl BatchResults {
    pub fn stats(&self) -> BatchStats {
        BatchStats::new(
            self.valid_numbers.len(),
            self.fixed_numbers.len(),
            self.rejected_numbers.len(),
        )
    }
}
