//! HTTP middleware.
//!
//! Cross-cutting request handling layered onto the router: client
//! identification, per-IP rate limiting and security headers.

pub mod ip;
pub mod rate_limit;
pub mod security_headers;

pub use rate_limit::RateLimiter;
