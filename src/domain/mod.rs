//! Domain layer: stores, query cache and portfolio types.
//!
//! Nothing in here touches the browser; platform services come in through
//! the traits in [`runtime`], [`session::DurableStorage`] and
//! [`portfolio::PortfolioApi`].

pub mod errors;
pub mod logging;
pub mod notifications;
pub mod portfolio;
pub mod query;
pub mod runtime;
pub mod session;
pub mod stats;
