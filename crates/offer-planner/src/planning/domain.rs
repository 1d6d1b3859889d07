use serde::{Deserialize, Serialize};

/// Response-rate model selected by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseModel {
    #[default]
    Model1,
    Model2,
    /// Extended model, only selectable in advanced mode.
    Model3,
}

impl ResponseModel {
    /// Expected response rate used when no manual rate applies.
    pub const fn base_rate(self) -> f64 {
        match self {
            Self::Model1 => 0.02,
            Self::Model2 => 0.018,
            Self::Model3 => 0.022,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Model1 => "model1",
            Self::Model2 => "model2",
            Self::Model3 => "model3",
        }
    }
}

/// Largest contact count planned on a single channel. Beyond 2^53 whole
/// contacts no longer map exactly onto `f64` spend.
pub const MAX_PLANNED_CONTACTS: u64 = 1 << 53;

/// Scalar settings that accompany a planning request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanConfig {
    pub budget: f64,
    pub model: ResponseModel,
    pub manual_response_rate: bool,
    pub advanced_mode: bool,
}

/// Outreach medium with a contact cap and a per-contact cost.
///
/// Numbers are kept as coerced so that negative input reaches the validator
/// instead of being clamped away.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub channel_id: String,
    /// Maximum contacts; 0 means bounded only by budget.
    pub capacity: f64,
    pub unit_cost: f64,
    pub response_rate: Option<f64>,
}

impl Channel {
    /// Whole-contact cap, or `None` when the channel is unbounded.
    pub fn contact_cap(&self) -> Option<u64> {
        let cap = self.capacity.floor();
        if cap >= 1.0 {
            Some(cap as u64)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub product_id: String,
    pub ltv: f64,
}

/// Wire encoding requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// Named-field records in lists.
    #[default]
    Verbose,
    /// Id-keyed maps of positional tuples.
    Compact,
}

impl ResponseShape {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "verbose" | "records" => Some(Self::Verbose),
            "compact" | "tuples" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Economics of one channel after allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationResult {
    pub channel_id: String,
    pub planned: u64,
    pub spend: f64,
    pub response_rate: f64,
    pub conversions: f64,
    pub revenue: f64,
    pub profit: f64,
    pub cost_per_conversion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub budget_available: f64,
    pub actual_spend: f64,
    pub actual_spend_percent: f64,
    pub expected_revenue: f64,
    pub expected_roi_percent: f64,
    pub reach_clients: u64,
}

/// Even split of expected reach across the requested products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDistribution {
    pub product_id: String,
    pub offers_count: u64,
    pub avg_affinity_revenue: f64,
}

/// Everything the formatter needs to answer a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub summary: PortfolioSummary,
    pub channels: Vec<AllocationResult>,
    pub products: Vec<ProductDistribution>,
    pub expected_conversions: f64,
    pub remaining_budget: f64,
}
