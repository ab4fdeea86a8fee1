pub mod classify;
pub mod normalize;

pub use classify::{classify, ClassifiedBatch};
pub use normalize::{normalize, NormalizeError, Rejection};
