pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod session;
pub mod state;

pub use config::GatewayConfig;
pub use routes::{app, app_with_ui};
pub use state::AppState;
