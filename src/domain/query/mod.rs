//! Keyed async query cache with de-duplication and generation guards.

pub mod cache;
pub mod key;
pub mod state;

pub use cache::{QueryCache, QueryObserver, QueryOptions};
pub use key::{KeyPart, QueryKey};
pub use state::{QueryState, QueryStatus};
