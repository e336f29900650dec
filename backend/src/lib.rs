//! Backend library modules.
//!
//! Hexagonal layout: `domain` owns the types, services and ports; `inbound`
//! adapts HTTP requests onto driving ports; `outbound` implements the driven
//! ports against PostgreSQL, the ledger engine gateway, or process memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
