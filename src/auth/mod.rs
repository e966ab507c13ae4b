//! Authentication: password hashing, JWT sessions, and the request extractor.
//!
//! Browser clients log in via `/authentication/login` with email/password;
//! the session is a stateless JWT stored in a secure, HTTP-only cookie.
//! Handlers get the authenticated user through the
//! [`CurrentUser`](crate::api::models::users::CurrentUser) extractor.

pub mod current_user;
pub mod password;
pub mod session;
