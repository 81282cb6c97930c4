//! Core types for azure-deploy.

pub mod message;
pub mod response;
pub mod usage;

pub use message::*;
pub use response::*;
pub use usage::*;
