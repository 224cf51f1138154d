//! Volunteer service-hours ledger.
//!
//! Students submit hours, staff approve or reject them, and approvals credit
//! totals and award milestone accolades in one atomic unit. The crate follows
//! a hexagonal layout: [`domain`] holds the rules and ports, [`inbound`] the
//! HTTP adapter and [`outbound`] the PostgreSQL and in-memory stores.

pub mod demo_data;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
