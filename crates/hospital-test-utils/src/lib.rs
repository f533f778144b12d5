//! # Hospital Test Utilities
//!
//! Shared test utilities for the hospital registration service.
//!
//! This crate provides:
//! - Server test harness (`TestHospitalServer` for E2E tests)
//! - Deterministic request payloads and credentials (`fixtures`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hospital_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestHospitalServer::spawn().await?;
//!     let token = server.admin_token().await?;
//!
//!     let response = server
//!         .client()
//!         .get(server.api("/api/index"))
//!         .bearer_auth(&token)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use fixtures::*;
pub use server_harness::*;
