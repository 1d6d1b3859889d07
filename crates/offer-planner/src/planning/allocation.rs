//! Greedy budget allocation across channels.
//!
//! Channels are funded strictly in the order the caller listed them. An
//! earlier channel keeps whatever it can afford even when a later channel
//! would return more; there is no reordering and no backtracking, so the
//! same input always produces the same plan.

use super::domain::{AllocationResult, Channel, PlanConfig, Product, MAX_PLANNED_CONTACTS};

/// Per-channel results plus the shared values the aggregator reuses.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub results: Vec<AllocationResult>,
    pub average_ltv: f64,
    pub remaining_budget: f64,
}

/// Mean lifetime value over products with a positive LTV, or 0 when none do.
pub fn average_ltv(products: &[Product]) -> f64 {
    let (sum, count) = products
        .iter()
        .map(|product| product.ltv)
        .filter(|ltv| ltv.is_finite() && *ltv > 0.0)
        .fold((0.0, 0usize), |(sum, count), ltv| (sum + ltv, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn response_rate(channel: &Channel, config: &PlanConfig) -> f64 {
    match channel.response_rate {
        Some(rate) if config.manual_response_rate => rate,
        _ => config.model.base_rate(),
    }
}

fn planned_contacts(channel: &Channel, remaining: f64) -> u64 {
    if channel.unit_cost <= 0.0 || remaining <= 0.0 {
        return 0;
    }

    let affordable = (remaining / channel.unit_cost)
        .floor()
        .min(MAX_PLANNED_CONTACTS as f64) as u64;
    match channel.contact_cap() {
        Some(cap) => cap.min(affordable),
        None => affordable,
    }
}

/// Allocates the budget over `channels` in input order.
pub fn allocate(config: &PlanConfig, channels: &[Channel], products: &[Product]) -> Allocation {
    let average_ltv = average_ltv(products);
    let mut remaining = config.budget.max(0.0);
    let mut results = Vec::with_capacity(channels.len());

    for channel in channels {
        let planned = planned_contacts(channel, remaining);
        let spend = if planned == 0 {
            0.0
        } else {
            planned as f64 * channel.unit_cost
        };
        remaining = (remaining - spend).max(0.0);

        let response_rate = response_rate(channel, config);
        let conversions = planned as f64 * response_rate;
        let revenue = conversions * average_ltv;
        let cost_per_conversion = if conversions > 0.0 {
            spend / conversions
        } else {
            0.0
        };

        results.push(AllocationResult {
            channel_id: channel.channel_id.clone(),
            planned,
            spend,
            response_rate,
            conversions,
            revenue,
            profit: revenue - spend,
            cost_per_conversion,
        });
    }

    Allocation {
        results,
        average_ltv,
        remaining_budget: remaining,
    }
}
