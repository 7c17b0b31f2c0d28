pub mod comparison;
pub mod intersection;
pub mod list_fetcher;
pub mod projection;
pub mod providers;
pub mod rate_governor;

pub use comparison::{ComparisonService, ComparisonState};
pub use list_fetcher::{FetchSettings, ListFetcher};
pub use rate_governor::{BackoffSettings, RateGovernor};
