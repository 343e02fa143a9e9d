pub mod retry;
pub mod token_bucket;

pub use retry::{RetryError, RetryPolicy, RetryingClient};
pub use token_bucket::TokenBucket;
