pub mod batch;
pub mod country;
pub mod ids;
pub mod number;

pub use batch::{BatchResults, BatchStats, FixedEntry, RejectedEntry, ValidEntry};
pub use country::{CountryProfile, CountryRegistry};
pub use ids::BatchRef;
pub use number::{Change, NumberRecord};
