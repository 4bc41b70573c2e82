//! authcore
//!
//! Local credential authentication:
//! - User registration and login
//! - Argon2id password hashing with enumeration-resistant login errors
//! - HS256 access and refresh token pairs
//! - Token verification against a caller-supplied clock
//! - Refresh token rotation and logout revocation
//! - Axum routes over a mockable service boundary
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `JWT_ACCESS_EXPIRATION` - Access token expiration in seconds (default: 900)
//! - `JWT_REFRESH_EXPIRATION` - Refresh token expiration in seconds (default: 604800)
//! - `JWT_ISSUER` - JWT issuer claim (default: "authcore")
//! - `JWT_AUDIENCE` - JWT audience claim (default: "authcore-api")
//! - `STORE_TIMEOUT_MS` - Upper bound on one store call (default: 5000)
//!
//! # Usage
//!
//! ```rust,ignore
//! use authcore::{create_routes, AuthConfig, AuthService};
//! use authcore::store::{MemoryRevocationStore, MemoryUserStore};
//!
//! let config = AuthConfig::from_env()?;
//! let auth = AuthService::new(
//!     &config,
//!     Arc::new(MemoryUserStore::new()),
//!     Arc::new(MemoryRevocationStore::new()),
//! )?;
//! let app = create_routes(Arc::new(auth));
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod issuer;
pub mod keys;
pub mod models;
pub mod password;
pub mod service;
pub mod store;
pub mod verifier;

// Re-export commonly used types
pub use config::AuthConfig;
pub use error::AuthError;
pub use handlers::{create_routes, AuthState};
pub use models::*;
pub use service::{AuthApi, AuthService};
