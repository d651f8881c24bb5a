//! # parley-auth
//!
//! Access token handling and the JWT-backed [`IdentityResolver`] used by
//! every real-time connection.
//!
//! [`IdentityResolver`]: parley_core::traits::IdentityResolver

pub mod jwt;
pub mod resolver;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use resolver::JwtIdentityResolver;
