// handlers/mod.rs - Proxy surface exposed to the front-end
//
// Every handler here forwards to the backend through `utils::forward`.
// Only `/health` answers locally.

pub mod auth;   // POST /api/auth, GET /api/auth/status
pub mod health; // GET /health
pub mod token;  // POST /api/token
pub mod utils;

pub use auth::{auth_post, status_get};
pub use health::health_get;
pub use token::token_post;
