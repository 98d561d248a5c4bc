// handlers/auth/mod.rs - Authentication proxy handlers
//
// Both endpoints relay to the backend's auth service unchanged. The front-end
// calls these instead of talking to the backend directly.

pub mod login;  // POST /api/auth
pub mod status; // GET /api/auth/status

pub use login::auth_post;
pub use status::status_get;
