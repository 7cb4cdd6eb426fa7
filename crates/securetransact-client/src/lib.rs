//! Typed client for the SecureTransact API, plus the validation the
//! registration and login forms run before anything hits the network.

pub mod client;
pub mod error;
pub mod form;

pub use client::{ApiClient, ServerStatus};
pub use error::ClientError;
pub use form::{Field, FormErrors, LoginForm, RegistrationForm};
