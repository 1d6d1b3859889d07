use offer_planner::planning::{
    allocate, normalize, plan_locally, validate, OptimizeError, PlanConfig, Product,
    ResponseModel,
};
use serde_json::{json, Value};

fn plan(body: Value) -> offer_planner::planning::LocalPlan {
    plan_locally(&body).expect("request is valid")
}

#[test]
fn single_channel_campaign_is_fully_funded() {
    let plan = plan(json!({
        "budget": 1000,
        "model": "model1",
        "channels": [{ "channel_id": "sms", "number": 100, "cost_per_contact": 10 }],
        "products": [{ "product_id": "mortgage", "ltv": 1000 }],
    }));

    let sms = &plan.outcome.channels[0];
    assert_eq!(sms.planned, 100);
    assert_eq!(sms.spend, 1000.0);
    assert!((sms.conversions - 2.0).abs() < 1e-9);
    assert!((sms.revenue - 2000.0).abs() < 1e-6);
    assert!((sms.profit - 1000.0).abs() < 1e-6);

    let summary = &plan.outcome.summary;
    assert_eq!(summary.reach_clients, 2);
    assert!((summary.expected_roi_percent - 100.0).abs() < 1e-6);
    assert!((summary.actual_spend_percent - 100.0).abs() < 1e-9);
}

#[test]
fn budget_below_cheapest_contact_is_not_allocated() {
    let error = plan_locally(&json!({
        "budget": 5,
        "channels": [{ "channel_id": "sms", "number": 100, "cost_per_contact": 10 }],
        "products": [{ "product_id": "mortgage", "ltv": 1000 }],
    }))
    .expect_err("infeasible budget");

    match error {
        OptimizeError::Validation(messages) => {
            assert!(messages[0].contains("minimum feasible budget of 10"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn allocation_depends_on_channel_order() {
    let channels = |first: Value, second: Value| {
        json!({
            "budget": 1500,
            "channels": [first, second],
            "products": [{ "product": "mortgage", "ltv": 500 }],
        })
    };
    let sms = json!({ "type": "sms", "max": 100, "cost": 10 });
    let calls = json!({ "type": "calls", "max": 100, "cost": 7 });

    let sms_first = plan(channels(sms.clone(), calls.clone()));
    assert_eq!(sms_first.outcome.channels[0].planned, 100);
    assert_eq!(sms_first.outcome.channels[1].planned, 71);
    assert_eq!(sms_first.warnings.len(), 1);

    let calls_first = plan(channels(calls, sms));
    assert_eq!(calls_first.outcome.channels[0].channel_id, "calls");
    assert_eq!(calls_first.outcome.channels[0].planned, 100);
    assert_eq!(calls_first.outcome.channels[1].planned, 80);

    assert_ne!(
        sms_first.outcome.summary.actual_spend,
        calls_first.outcome.summary.actual_spend
    );
}

#[test]
fn zero_ltv_products_yield_no_revenue() {
    let plan = plan(json!({
        "budget": 1000,
        "channels": [{ "type": "sms", "max": 100, "cost": 5 }],
        "products": [{ "product": "free", "ltv": 0 }, { "product": "trial", "ltv": "0" }],
    }));

    assert_eq!(plan.outcome.summary.expected_revenue, 0.0);
    assert_eq!(plan.outcome.summary.actual_spend, 500.0);
    assert!((plan.outcome.summary.expected_roi_percent - -100.0).abs() < 1e-9);
}

#[test]
fn zero_ltv_products_do_not_dilute_the_average() {
    let products = [
        Product {
            product_id: "mortgage".to_string(),
            ltv: 1000.0,
        },
        Product {
            product_id: "free".to_string(),
            ltv: 0.0,
        },
    ];
    let normalized = normalize(&json!({
        "channels": [{ "type": "sms", "max": 100, "cost": 10 }],
    }));
    let config = PlanConfig {
        budget: 1000.0,
        model: ResponseModel::Model1,
        ..PlanConfig::default()
    };

    let allocation = allocate(&config, &normalized.channels, &products);
    assert_eq!(allocation.average_ltv, 1000.0);
}

#[test]
fn compact_and_verbose_dialects_agree() {
    let verbose = plan(json!({
        "budget": 25000,
        "model": "2",
        "manual_response_rate": "true",
        "channels": [
            { "type": "sms", "max": 5000, "cost": 0.7, "response_rate": 0.03 },
            { "channel_id": "email", "number": 750000, "cost_per_contact": "0,004", "rate": 0.01 },
            { "type": "calls", "max": 2000, "cost": 2.9, "response_rate": 0.08 },
        ],
        "products": [
            { "product": "mortgage", "ltv": 30000 },
            { "product_id": "pension", "ltv": 24000 },
        ],
    }));
    let compact = plan(json!({
        "budget": "25000",
        "model": "lightgbm",
        "manual_response_rate": true,
        "channels": {
            "sms": [5000, 0.7, 0.03],
            "email": [750000, 0.004, 0.01],
            "calls": [2000, "2,9", 0.08],
        },
        "products": { "mortgage": 30000, "pension": "24000" },
    }));

    assert_eq!(verbose.outcome, compact.outcome);
}

#[test]
fn spend_never_exceeds_budget_and_caps_hold() {
    let costs = [0.004, 0.7, 2.9, 13.0, 0.0, 0.33];
    let capacities = [0.0, 17.0, 250.0, 1.0, 40.0, 999.0];

    for budget in [0.0, 1.0, 9.99, 137.5, 1000.0, 12345.67, 1_000_000.0] {
        for rotation in 0..costs.len() {
            let channels: Vec<Value> = (0..costs.len())
                .map(|offset| {
                    let index = (rotation + offset) % costs.len();
                    json!({
                        "type": format!("channel_{index}"),
                        "max": capacities[index],
                        "cost": costs[index],
                    })
                })
                .collect();
            let body = json!({
                "budget": budget,
                "channels": channels,
                "products": [{ "product": "mortgage", "ltv": 100 }],
            });

            let request = normalize(&body);
            let report = validate(&request);
            if !report.is_valid() {
                continue;
            }
            let plan = plan(body);

            let spend: f64 = plan.outcome.channels.iter().map(|result| result.spend).sum();
            assert!(spend <= budget + 1e-6, "spend {spend} exceeds budget {budget}");

            for (result, channel) in plan.outcome.channels.iter().zip(&request.channels) {
                if channel.capacity > 0.0 {
                    assert!(result.planned as f64 <= channel.capacity);
                }
                if channel.unit_cost == 0.0 {
                    assert_eq!(result.planned, 0);
                    assert_eq!(result.spend, 0.0);
                }
                assert!((result.spend - result.planned as f64 * channel.unit_cost).abs() < 1e-9);
                assert!(result.cost_per_conversion >= 0.0);
            }

            let conversions: f64 = plan
                .outcome
                .channels
                .iter()
                .map(|result| result.conversions)
                .sum();
            assert_eq!(plan.outcome.summary.reach_clients, conversions.round() as u64);

            if plan.outcome.summary.actual_spend == 0.0 {
                assert_eq!(plan.outcome.summary.expected_roi_percent, 0.0);
            }
        }
    }
}
