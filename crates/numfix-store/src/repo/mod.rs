pub mod batches;

pub use batches::{Batch, BatchesRepo};
