pub mod auth;
pub mod dashboard;
pub mod error_watch;
pub mod holdings;
pub mod stock_view;

pub use auth::{login, logout, register};
pub use dashboard::DashboardView;
pub use error_watch::ErrorWatch;
pub use holdings::{add_holding, delete_holding, update_holding};
pub use stock_view::StockView;
