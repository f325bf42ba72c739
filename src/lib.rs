#[macro_use]
mod macros;

pub mod app;
pub mod application; // Stores wiring, query keys and use cases
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod time_utils;

pub use application::AppContext;
pub use infrastructure::config::AppConfig;

/// Browser entry point: logging, stores and the root component.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn initialize() {
    use crate::app::App;
    use crate::domain::logging::{LogComponent, get_logger};
    use leptos::*;

    console_error_panic_hook::set_once();

    let config = AppConfig::from_env();
    domain::logging::init_logger(Box::new(infrastructure::services::ConsoleLogger::new(config.log_level)));
    domain::logging::init_time_provider(Box::new(infrastructure::services::BrowserTimeProvider::new()));

    let ctx = match AppContext::browser(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            get_logger().error(LogComponent::Presentation("Initialize"), &format!("❌ Cannot start: {e}"));
            return;
        }
    };
    ctx.init();

    get_logger().info(LogComponent::Presentation("Initialize"), "🚀 Portfolio client mounted");
    mount_to_body(move || view! { <App ctx=ctx/> });
}
