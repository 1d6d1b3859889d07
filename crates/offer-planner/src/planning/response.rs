use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::domain::{PlanOutcome, PortfolioSummary, ProductDistribution, ResponseShape};

/// A plan serialized into one of the historical wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormattedPlan {
    Verbose(VerbosePlan),
    Compact(CompactPlan),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerbosePlan {
    pub summary: PortfolioSummary,
    pub channels_usage: Vec<ChannelUsage>,
    pub products_distribution: Vec<ProductDistribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelUsage {
    pub channel_id: String,
    pub offers_count: u64,
    pub total_cost: f64,
    pub total_revenue: f64,
}

/// `[budget_available, actual_spend, actual_spend_percent, expected_revenue,
/// expected_roi_percent, reach_clients]`
pub type CompactSummary = (f64, f64, f64, f64, f64, u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactPlan {
    pub summary: CompactSummary,
    /// `id -> [offers_count, total_cost, total_revenue]`
    pub channels_usage: KeyedTuples<(u64, f64, f64)>,
    /// `id -> [offers_count, avg_affinity_revenue]`
    pub products_distribution: KeyedTuples<(u64, f64)>,
}

/// Id-keyed entries serialized as a JSON object in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedTuples<T>(pub Vec<(String, T)>);

impl<T: Serialize> Serialize for KeyedTuples<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

pub fn format_plan(outcome: &PlanOutcome, shape: ResponseShape) -> FormattedPlan {
    match shape {
        ResponseShape::Verbose => FormattedPlan::Verbose(verbose(outcome)),
        ResponseShape::Compact => FormattedPlan::Compact(compact(outcome)),
    }
}

fn verbose(outcome: &PlanOutcome) -> VerbosePlan {
    VerbosePlan {
        summary: outcome.summary.clone(),
        channels_usage: outcome
            .channels
            .iter()
            .map(|result| ChannelUsage {
                channel_id: result.channel_id.clone(),
                offers_count: result.planned,
                total_cost: result.spend,
                total_revenue: result.revenue,
            })
            .collect(),
        products_distribution: outcome.products.clone(),
    }
}

fn compact(outcome: &PlanOutcome) -> CompactPlan {
    let summary = &outcome.summary;
    CompactPlan {
        summary: (
            summary.budget_available,
            summary.actual_spend,
            summary.actual_spend_percent,
            summary.expected_revenue,
            summary.expected_roi_percent,
            summary.reach_clients,
        ),
        channels_usage: KeyedTuples(
            outcome
                .channels
                .iter()
                .map(|result| {
                    (
                        result.channel_id.clone(),
                        (result.planned, result.spend, result.revenue),
                    )
                })
                .collect(),
        ),
        products_distribution: KeyedTuples(
            outcome
                .products
                .iter()
                .map(|product| {
                    (
                        product.product_id.clone(),
                        (product.offers_count, product.avg_affinity_revenue),
                    )
                })
                .collect(),
        ),
    }
}
