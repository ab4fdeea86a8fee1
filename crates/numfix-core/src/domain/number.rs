use serde::{Serialize, Serializer};
use std::fmt;

/// One corrective transform applied by the fix pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    PrependedPrefix(String),
    RemovedNonDigits,
    Shortened { removed: String },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::PrependedPrefix(prefix) => write!(f, "prepended number with {}", prefix),
            Change::RemovedNonDigits => f.write_str("removed non digits from number"),
            Change::Shortened { removed } => {
                write!(f, "shortened number by removing {}", removed)
            }
        }
    }
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Working state of a single number while it moves through the fix pipeline.
///
/// `is_valid` starts out true and flips to false on the first fix; nothing flips it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberRecord {
    raw_input: String,
    working_value: String,
    country_key: String,
    is_valid: bool,
    changes: Vec<Change>,
}

impl NumberRecord {
    pub(crate) fn new(country_key: &str, raw_input: &str) -> Self {
        Self {
            raw_input: raw_input.to_string(),
            working_value: raw_input.to_string(),
            country_key: country_key.to_string(),
            is_valid: true,
            changes: Vec::new(),
        }
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn working_value(&self) -> &str {
        &self.working_value
    }

    pub fn country_key(&self) -> &str {
        &self.country_key
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Change log flattened into the single text column persisted for fixed numbers.
    pub fn change_summary(&self) -> String {
        self.changes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn prepend(&mut self, prefix: &str) {
        self.working_value.insert_str(0, prefix);
        self.record(Change::PrependedPrefix(prefix.to_string()));
    }

    pub(crate) fn strip_non_digits(&mut self) {
        self.working_value.retain(|ch| ch.is_ascii_digit());
        self.record(Change::RemovedNonDigits);
    }

    /// Keeps the first `length` bytes. Callers only truncate digit-only values.
    pub(crate) fn truncate_to(&mut self, length: usize) -> String {
        let removed = self.working_value.split_off(length);
        self.record(Change::Shortened {
            removed: removed.clone(),
        });
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.is_valid = false;
        self.working_value.clear();
        self.changes.clear();
    }

    fn record(&mut self, change: Change) {
        self.is_valid = false;
        self.changes.push(change);
    }
}

#[cfg(test)]
mod tests {
    use super::{Change, NumberRecord};

    #[test]
    fn change_descriptions_match_audit_wording() {
        assert_eq!(
            Change::PrependedPrefix("27".to_string()).to_string(),
            "prepended number with 27"
        );
        assert_eq!(
            Change::RemovedNonDigits.to_string(),
            "removed non digits from number"
        );
        assert_eq!(
            Change::Shortened {
                removed: "45".to_string()
            }
            .to_string(),
            "shortened number by removing 45"
        );
    }

    #[test]
    fn changes_serialize_as_text() {
        let json = serde_json::to_value(vec![Change::RemovedNonDigits]).unwrap();
        assert_eq!(json, serde_json::json!(["removed non digits from number"]));
    }

    #[test]
    fn summary_joins_in_order() {
        let mut record = NumberRecord::new("rsa", "7172-78645");
        record.prepend("27");
        record.strip_non_digits();
        assert_eq!(
            record.change_summary(),
            "prepended number with 27, removed non digits from number"
        );
        assert_eq!(record.working_value(), "27717278645");
        assert!(!record.is_valid());
    }

    #[test]
    fn clear_drops_value_and_log() {
        let mut record = NumberRecord::new("rsa", "12");
        record.prepend("27");
        record.clear();
        assert_eq!(record.working_value(), "");
        assert!(record.changes().is_empty());
        assert_eq!(record.raw_input(), "12");
    }
}
