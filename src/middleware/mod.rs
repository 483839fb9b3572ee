pub mod response;
pub mod session_gate;

pub use response::ApiResponse;
pub use session_gate::{evaluate, session_gate, GateDecision, SessionState};
