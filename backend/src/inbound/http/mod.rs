//! HTTP inbound adapter exposing the REST endpoints.

pub mod accounts;
pub mod admin;
pub(crate) mod deadline;
pub mod error;
pub mod health;
pub mod misc;
pub mod schemas;
pub mod state;
pub mod users;
pub(crate) mod validation;

pub use error::ApiResult;
