pub mod api;
pub mod core;
pub mod proxy;
pub mod services;
pub mod state;
