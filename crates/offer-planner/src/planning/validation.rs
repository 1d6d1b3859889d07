use serde::Serialize;

use super::domain::{Channel, PlanConfig, Product, MAX_PLANNED_CONTACTS};
use super::request::NormalizedRequest;

/// Problems found in a normalized request.
///
/// `errors` block allocation; `warnings` are advisory and allocation still
/// runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Runs every rule in order and collects all violations.
pub fn validate(request: &NormalizedRequest) -> ValidationReport {
    let mut report = ValidationReport::default();
    let NormalizedRequest {
        config,
        channels,
        products,
        ..
    } = request;

    let budget_valid = is_valid_amount(config.budget);
    if !budget_valid {
        report
            .errors
            .push("budget must be a finite number greater than or equal to 0".to_string());
    }

    if channels.is_empty() {
        report
            .errors
            .push("at least one channel must be provided".to_string());
    }

    if products.is_empty() {
        report
            .errors
            .push("at least one product must be provided".to_string());
    }

    let channels_valid = check_channel_fields(channels, &mut report.errors);
    check_product_fields(products, &mut report.errors);

    if budget_valid {
        check_minimum_budget(config, channels, &mut report.errors);
        check_plannable_volume(config, channels, &mut report.errors);
        if channels_valid {
            check_requested_volume(config, channels, &mut report.warnings);
        }
    }

    if config.manual_response_rate {
        check_manual_rates(channels, &mut report.errors);
    }

    report
}

fn check_channel_fields(channels: &[Channel], errors: &mut Vec<String>) -> bool {
    let before = errors.len();
    for channel in channels {
        if !is_valid_amount(channel.capacity) {
            errors.push(format!(
                "channel '{}': capacity must be a non-negative number (got {})",
                channel.channel_id, channel.capacity
            ));
        }
        if !is_valid_amount(channel.unit_cost) {
            errors.push(format!(
                "channel '{}': cost per contact must be a non-negative number (got {})",
                channel.channel_id, channel.unit_cost
            ));
        }
        if let Some(rate) = channel.response_rate {
            if !is_valid_amount(rate) {
                errors.push(format!(
                    "channel '{}': response rate must be a non-negative number (got {})",
                    channel.channel_id, rate
                ));
            }
        }
    }
    errors.len() == before
}

fn check_product_fields(products: &[Product], errors: &mut Vec<String>) {
    for product in products {
        if !is_valid_amount(product.ltv) {
            errors.push(format!(
                "product '{}': ltv must be a non-negative number (got {})",
                product.product_id, product.ltv
            ));
        }
    }
}

fn check_minimum_budget(config: &PlanConfig, channels: &[Channel], errors: &mut Vec<String>) {
    let min_cost = channels
        .iter()
        .map(|channel| channel.unit_cost)
        .filter(|cost| cost.is_finite() && *cost > 0.0)
        .fold(None, |min: Option<f64>, cost| {
            Some(min.map_or(cost, |current| current.min(cost)))
        });

    if let Some(min_cost) = min_cost {
        if config.budget > 0.0 && config.budget < min_cost {
            errors.push(format!(
                "budget {} is below the minimum feasible budget of {} (cheapest contact)",
                config.budget, min_cost
            ));
        }
    }
}

fn check_plannable_volume(config: &PlanConfig, channels: &[Channel], errors: &mut Vec<String>) {
    for channel in channels {
        if !(channel.unit_cost.is_finite() && channel.unit_cost > 0.0) {
            continue;
        }
        let capped = channel
            .contact_cap()
            .is_some_and(|cap| cap <= MAX_PLANNED_CONTACTS);
        let affordable = (config.budget / channel.unit_cost).floor();
        if !capped && affordable > MAX_PLANNED_CONTACTS as f64 {
            errors.push(format!(
                "channel '{}': budget {} buys more than {} contacts at cost {}",
                channel.channel_id, config.budget, MAX_PLANNED_CONTACTS, channel.unit_cost
            ));
        }
    }
}

fn check_requested_volume(config: &PlanConfig, channels: &[Channel], warnings: &mut Vec<String>) {
    let required: f64 = channels
        .iter()
        .map(|channel| channel.capacity * channel.unit_cost)
        .sum();

    if required > 0.0 && config.budget > 0.0 && config.budget < required {
        warnings.push(format!(
            "budget {} is likely insufficient for the requested volumes (requires {})",
            config.budget, required
        ));
    }
}

fn check_manual_rates(channels: &[Channel], errors: &mut Vec<String>) {
    for channel in channels {
        match channel.response_rate {
            None => errors.push(format!(
                "channel '{}': response rate is required when manual response rates are enabled",
                channel.channel_id
            )),
            Some(rate) if rate > 1.0 => errors.push(format!(
                "channel '{}': response rate must be between 0 and 1 (got {})",
                channel.channel_id, rate
            )),
            Some(_) => {}
        }
    }
}
