pub mod session_auth;

pub use session_auth::{RequestAuthState, SessionAuth};
