pub mod pool;
pub mod tx;

pub use pool::PoolManager;
pub use tx::{with_tx, Isolation};
