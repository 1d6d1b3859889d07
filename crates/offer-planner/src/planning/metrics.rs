use super::allocation::Allocation;
use super::domain::{PlanOutcome, PortfolioSummary, Product, ProductDistribution};

/// Guards the ROI denominator; irrelevant in practice because ROI is 0
/// whenever nothing was spent.
const SPEND_EPSILON: f64 = 1e-9;

/// A non-finite value escaped the arithmetic. Validated input never triggers
/// this.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("non-finite value computed for {field}")]
pub struct ComputationError {
    pub field: &'static str,
}

/// Folds per-channel results into the portfolio summary and product split.
pub fn summarize(
    budget: f64,
    allocation: Allocation,
    products: &[Product],
) -> Result<PlanOutcome, ComputationError> {
    let actual_spend: f64 = allocation.results.iter().map(|result| result.spend).sum();
    let expected_conversions: f64 = allocation
        .results
        .iter()
        .map(|result| result.conversions)
        .sum();
    let expected_revenue = expected_conversions * allocation.average_ltv;

    let actual_spend_percent = if budget > 0.0 {
        100.0 * actual_spend / budget
    } else {
        0.0
    };
    let expected_roi_percent = if actual_spend > 0.0 {
        100.0 * (expected_revenue - actual_spend) / actual_spend.max(SPEND_EPSILON)
    } else {
        0.0
    };

    let summary = PortfolioSummary {
        budget_available: budget,
        actual_spend,
        actual_spend_percent,
        expected_revenue,
        expected_roi_percent,
        reach_clients: round_count(expected_conversions),
    };

    let per_product = expected_conversions / products.len().max(1) as f64;
    let distribution = products
        .iter()
        .map(|product| ProductDistribution {
            product_id: product.product_id.clone(),
            offers_count: round_count(per_product),
            avg_affinity_revenue: product.ltv,
        })
        .collect();

    ensure_finite(&summary)?;

    Ok(PlanOutcome {
        summary,
        channels: allocation.results,
        products: distribution,
        expected_conversions,
        remaining_budget: allocation.remaining_budget,
    })
}

fn round_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn ensure_finite(summary: &PortfolioSummary) -> Result<(), ComputationError> {
    let fields = [
        ("budget_available", summary.budget_available),
        ("actual_spend", summary.actual_spend),
        ("actual_spend_percent", summary.actual_spend_percent),
        ("expected_revenue", summary.expected_revenue),
        ("expected_roi_percent", summary.expected_roi_percent),
    ];

    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((field, _)) => Err(ComputationError { field: *field }),
        None => Ok(()),
    }
}
