pub mod bindings;

pub use bindings::{change_trigger, notifications_signal, provide_app_context, session_signal, use_app_context};
