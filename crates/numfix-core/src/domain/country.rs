use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dialing prefix and total digit length a number must have for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub code: String,
    pub dialing_prefix: String,
    pub required_length: usize,
}

impl CountryProfile {
    pub fn new(code: &str, dialing_prefix: &str, required_length: usize) -> Result<Self, CoreError> {
        let code = normalize_country_key(code)
            .ok_or_else(|| CoreError::InvalidCountryKey(code.to_string()))?;

        let prefix = dialing_prefix.trim();
        if prefix.is_empty() || !prefix.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(CoreError::InvalidDialingPrefix(dialing_prefix.to_string()));
        }

        if required_length <= prefix.len() {
            return Err(CoreError::InvalidRequiredLength {
                prefix: prefix.to_string(),
                length: required_length,
            });
        }

        Ok(Self {
            code,
            dialing_prefix: prefix.to_string(),
            required_length,
        })
    }
}

/// Canonical form of a configured country key, or `None` when it cannot name a country.
fn normalize_country_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

const SEED_PROFILES: [(&str, &str, usize); 4] = [
    ("rsa", "27", 11),
    ("aus", "61", 9),
    ("por", "351", 12),
    ("usa", "1", 11),
];

/// Country profiles keyed by abbreviation. Built once at startup and then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRegistry {
    profiles: BTreeMap<String, CountryProfile>,
}

impl Default for CountryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CountryRegistry {
    pub fn builtin() -> Self {
        let profiles = SEED_PROFILES
            .iter()
            .map(|(code, prefix, length)| {
                let profile = CountryProfile {
                    code: (*code).to_string(),
                    dialing_prefix: (*prefix).to_string(),
                    required_length: *length,
                };
                (profile.code.clone(), profile)
            })
            .collect();
        Self { profiles }
    }

    /// Builtin profiles with `overrides` layered on top, replacing any profile with the same code.
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = CountryProfile>,
    {
        let mut registry = Self::builtin();
        for profile in overrides {
            registry.insert(profile);
        }
        registry
    }

    pub fn insert(&mut self, profile: CountryProfile) -> Option<CountryProfile> {
        self.profiles.insert(profile.code.clone(), profile)
    }

    /// Exact match on the profile code. Keys are not case-folded or trimmed.
    pub fn lookup(&self, key: &str) -> Option<&CountryProfile> {
        self.profiles.get(key)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &CountryProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
