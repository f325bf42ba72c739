//! Portfolio aggregate: identities, holdings, stock metadata and price series.

pub mod entities;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use repositories::*;
pub use value_objects::*;
