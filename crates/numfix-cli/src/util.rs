use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use numfix_core::BatchRef;
use std::str::FromStr;

use crate::error::invalid_input;

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&Local);
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn parse_batch_ref(raw: &str) -> Result<BatchRef> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("batch reference cannot be empty"));
    }
    BatchRef::from_str(trimmed).map_err(|_| invalid_input(format!("invalid batch reference: {}", raw)))
}
