//! Budget planning for personalized offer campaigns.
//!
//! A request flows through [`request::normalize`], [`validation::validate`],
//! [`allocation::allocate`], [`metrics::summarize`] and finally
//! [`response::format_plan`]. Nothing is retained between requests. When an
//! external optimizer is configured the whole pipeline is skipped and the
//! request is forwarded by [`upstream::UpstreamOptimizer`].

pub mod allocation;
pub(crate) mod coercion;
pub mod domain;
pub mod metrics;
pub mod request;
pub mod response;
pub mod router;
pub mod service;
pub mod upstream;
pub mod validation;

#[cfg(test)]
mod tests;

pub use allocation::{allocate, Allocation};
pub use domain::{
    AllocationResult, Channel, PlanConfig, PlanOutcome, PortfolioSummary, Product,
    ProductDistribution, ResponseModel, ResponseShape,
};
pub use metrics::{summarize, ComputationError};
pub use request::{normalize, NormalizedRequest, RequestDialect};
pub use response::{format_plan, FormattedPlan};
pub use router::optimize_router;
pub use service::{
    parse_body, plan_locally, LocalPlan, OptimizeError, OptimizeOptions, OptimizeReply,
    OptimizeService,
};
pub use upstream::{UpstreamOptimizer, UpstreamReply, UpstreamUnavailable};
pub use validation::{validate, ValidationReport};
