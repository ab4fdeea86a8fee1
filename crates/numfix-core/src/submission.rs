use std::io::Read;
use thiserror::Error;

/// Zero-based column holding the raw number in each data row.
pub const NUMBER_COLUMN: usize = 1;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("malformed payload: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed payload: row at line {line} has no number column")]
    MissingNumberColumn { line: u64 },
}

/// Reads a tabular submission: a header row followed by rows whose second column is the raw number.
///
/// Any malformed row fails the whole submission.
pub fn parse_submission<R: Read>(reader: R) -> Result<Vec<String>, SubmissionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut numbers = Vec::new();
    for record in reader.records() {
        let record = record?;
        let number = record.get(NUMBER_COLUMN).ok_or_else(|| {
            SubmissionError::MissingNumberColumn {
                line: record.position().map(|pos| pos.line()).unwrap_or_default(),
            }
        })?;
        numbers.push(number.to_string());
    }
    Ok(numbers)
}
