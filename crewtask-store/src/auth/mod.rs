//! Authentication: password hashing and session management
//!
//! The auth collaborator mirrors what the original deployment delegated to
//! its hosted auth provider: email/password sign-up and sign-in, sign-out,
//! self-service password update, administrative out-of-band reset, and a
//! live "current session changed" subscription.

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password, PasswordError, MIN_PASSWORD_LEN};
pub use session::{AuthError, AuthService, Session};
