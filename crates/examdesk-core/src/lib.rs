//! examdesk-core — Unit tree model, traversal utilities, and service contract.
//!
//! This crate defines the curriculum unit tree that the exam platform is built
//! around, the pure functions that search and slice it, and the trait that
//! remote unit services implement.

pub mod error;
pub mod labels;
pub mod model;
pub mod preview;
pub mod service;
pub mod session;
pub mod tree;

pub use error::ApiError;
pub use model::{UnitTreeNode, UnitType};
pub use service::UnitService;
