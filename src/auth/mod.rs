// auth/mod.rs - Client side of the authentication gate
//
// Session token storage, the authenticated fetch wrapper and the two route
// guards. The server's page gate and the `gate` CLI both drive these.

pub mod client;
pub mod guard;
pub mod session;

pub use client::{ApiClient, AuthStatus, FetchError, FetchOptions};
pub use guard::{check_local, verify_status, Navigation, PublicRoutes};
pub use session::Session;
