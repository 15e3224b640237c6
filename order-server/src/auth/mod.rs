//! Bearer token authentication for the HTTP API

pub mod jwt;
pub mod middleware;

pub use jwt::JwtService;
pub use middleware::CurrentUser;
