//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod auth;
pub mod folder_service;
pub mod bookmark_service;
pub mod public_service;
pub mod apikey_service;
pub mod bridge;
#[cfg(test)]
pub mod test_support;
