//! examdesk-client — access to the remote unit service.
//!
//! Provides the HTTP implementation of [`UnitService`], an in-memory mock for
//! offline use and tests, abort signals for cancelling requests, and the
//! configuration loader.
//!
//! [`UnitService`]: examdesk_core::UnitService

pub mod abort;
pub mod config;
pub mod http;
pub mod mock;

pub use abort::{AbortController, AbortSignal};
pub use config::{create_client, load_config, ExamdeskConfig};
pub use examdesk_core::ApiError;
pub use http::UnitApiClient;
pub use mock::MockUnitService;
