// handlers/public/auth/mod.rs - Session issuance and teardown
//
// Neither endpoint is gated: they are how a browser gets into (and out of)
// the protected area.

pub mod login;  // POST <login-path> - verify admin key, issue cookie
pub mod logout; // POST <logout-path> - expire cookie

pub use login::session_login;
pub use logout::session_logout;
