pub mod dto;
pub mod endpoints;

#[cfg(target_arch = "wasm32")]
mod client;

#[cfg(target_arch = "wasm32")]
pub use client::GlooPortfolioApi;
pub use endpoints::Endpoints;
