pub mod auth;
pub mod response;

pub use auth::page_gate_middleware;
pub use response::ApiResponse;
