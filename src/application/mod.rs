pub mod context;
pub mod keys;
pub mod use_cases;

pub use context::AppContext;
pub use use_cases::*;
