pub mod config;
pub mod http;
pub mod runtime;
pub mod services;
pub mod storage;
