// handlers/public/mod.rs - Handlers reachable without a session cookie
//
// Route prefixes: /health, <login-path>, <logout-path>
// Middleware: session gate passes these through unconditionally

pub mod auth;
pub mod health;

pub use auth::*;
pub use health::health;
