//! Messenger core library: Facebook webhook driver, Graph API client and the
//! gateway that hosts them. Shared by the `fbgate` CLI and integration tests.

pub mod config;
pub mod facebook;
pub mod gateway;
