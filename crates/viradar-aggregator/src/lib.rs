pub mod aggregator;
pub mod mock;
pub mod quota;

pub use aggregator::{Aggregator, AggregationResult, AggregationStatus};
pub use mock::MockClient;
pub use quota::{QuotaState, QuotaTracker};
