//! Business logic between handlers and the repositories.

pub mod account_service;
pub mod catalog_service;
pub mod profile_service;
pub mod registration_service;
pub mod token_service;

pub use registration_service::RegistrationWorkflow;
pub use token_service::TokenService;
