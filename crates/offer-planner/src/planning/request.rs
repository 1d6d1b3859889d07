use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use super::coercion::{flag, number_or_zero, optional_number};
use super::domain::{Channel, PlanConfig, Product, ResponseModel, ResponseShape};

// Priority-ordered synonyms; the first present, non-null field wins.
const CHANNEL_ID_FIELDS: &[&str] = &["channel_id", "type", "channel"];
const CHANNEL_CAPACITY_FIELDS: &[&str] = &["number", "max", "capacity"];
const CHANNEL_COST_FIELDS: &[&str] = &["cost_per_contact", "cost", "unit_cost"];
const CHANNEL_RATE_FIELDS: &[&str] = &["response_rate", "rate"];
const PRODUCT_ID_FIELDS: &[&str] = &["product_id", "product"];
const PRODUCT_LTV_FIELDS: &[&str] = &["ltv"];
const MANUAL_RATE_FIELDS: &[&str] = &[
    "manual_response_rate",
    "manual_response_rate_enabled",
    "manual_rates",
];
const ADVANCED_MODE_FIELDS: &[&str] = &["advanced_mode", "advanced"];
const RESPONSE_FORMAT_FIELDS: &[&str] = &["response_format", "format"];

const MODEL_ALIASES: &[(&str, ResponseModel)] = &[
    ("model1", ResponseModel::Model1),
    ("1", ResponseModel::Model1),
    ("catboost", ResponseModel::Model1),
    ("model2", ResponseModel::Model2),
    ("2", ResponseModel::Model2),
    ("lightgbm", ResponseModel::Model2),
    ("model3", ResponseModel::Model3),
    ("3", ResponseModel::Model3),
];

/// Encoding the caller used for its channel list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestDialect {
    /// Lists of records with synonym fields.
    #[default]
    Verbose,
    /// Id-keyed maps of tuples or bare values.
    Compact,
}

/// Canonical in-memory model produced from any accepted request dialect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRequest {
    pub config: PlanConfig,
    pub channels: Vec<Channel>,
    pub products: Vec<Product>,
    pub dialect: RequestDialect,
    /// Shape explicitly asked for in the body, if any.
    pub response_shape: Option<ResponseShape>,
}

impl NormalizedRequest {
    /// Shape to answer with when no transport-level override is present.
    pub fn preferred_shape(&self) -> ResponseShape {
        self.response_shape.unwrap_or(match self.dialect {
            RequestDialect::Verbose => ResponseShape::Verbose,
            RequestDialect::Compact => ResponseShape::Compact,
        })
    }
}

enum EntrySource<'a> {
    Records(&'a [Value]),
    Keyed(&'a Map<String, Value>),
    Missing,
}

impl<'a> EntrySource<'a> {
    fn detect(body: &'a Map<String, Value>, primary: &str, alias: &str) -> Self {
        let value = match body.get(primary) {
            None | Some(Value::Null) => body.get(alias),
            present => present,
        };

        match value {
            Some(Value::Array(records)) => Self::Records(records),
            Some(Value::Object(entries)) => Self::Keyed(entries),
            _ => Self::Missing,
        }
    }
}

/// Converts an untyped request body into the canonical model.
///
/// A body that is not a JSON object yields an empty model so the validator
/// can report what is missing.
pub fn normalize(body: &Value) -> NormalizedRequest {
    let Some(body) = body.as_object() else {
        debug!("request body is not an object; using empty model");
        return NormalizedRequest::default();
    };

    let advanced_mode = flag(first_present(body, ADVANCED_MODE_FIELDS));
    let config = PlanConfig {
        budget: number_or_zero(body.get("budget")),
        model: resolve_model(body.get("model"), advanced_mode),
        manual_response_rate: flag(first_present(body, MANUAL_RATE_FIELDS)),
        advanced_mode,
    };

    let (mut channels, dialect): (Vec<Channel>, RequestDialect) = match EntrySource::detect(body, "channels", "channels_map") {
        EntrySource::Records(records) => (
            records
                .iter()
                .enumerate()
                .map(|(index, record)| channel_from_record(index, record))
                .collect(),
            RequestDialect::Verbose,
        ),
        EntrySource::Keyed(entries) => (
            entries
                .iter()
                .map(|(id, entry)| channel_from_entry(id, entry))
                .collect(),
            RequestDialect::Compact,
        ),
        EntrySource::Missing => (Vec::new(), RequestDialect::Verbose),
    };

    let mut products: Vec<Product> = match EntrySource::detect(body, "products", "products_map") {
        EntrySource::Records(records) => records
            .iter()
            .enumerate()
            .map(|(index, record)| product_from_record(index, record))
            .collect(),
        EntrySource::Keyed(entries) => entries
            .iter()
            .map(|(id, entry)| product_from_entry(id, entry))
            .collect(),
        EntrySource::Missing => Vec::new(),
    };

    disambiguate(channels.iter_mut().map(|channel| &mut channel.channel_id));
    disambiguate(products.iter_mut().map(|product| &mut product.product_id));

    let response_shape = first_present(body, RESPONSE_FORMAT_FIELDS)
        .and_then(Value::as_str)
        .and_then(ResponseShape::parse);

    debug!(
        ?dialect,
        channels = channels.len(),
        products = products.len(),
        model = config.model.label(),
        "normalized planning request"
    );

    NormalizedRequest {
        config,
        channels,
        products,
        dialect,
        response_shape,
    }
}

fn first_present<'a>(record: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .find_map(|field| record.get(*field).filter(|value| !value.is_null()))
}

fn identifier(value: Option<&Value>) -> Option<String> {
    let id = match value? {
        Value::String(raw) => raw.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// Suffixes repeated ids (`sms`, `sms_1`, `sms_2`) so id-keyed output keeps
/// every entry.
fn disambiguate<'a>(ids: impl Iterator<Item = &'a mut String>) {
    let mut seen = HashSet::new();
    for id in ids {
        if seen.insert(id.clone()) {
            continue;
        }

        let mut suffix = 1;
        let unique = loop {
            let candidate = format!("{id}_{suffix}");
            if !seen.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        debug!(original = %id, renamed = %unique, "duplicate identifier made unique");
        seen.insert(unique.clone());
        *id = unique;
    }
}

fn resolve_model(value: Option<&Value>, advanced_mode: bool) -> ResponseModel {
    let raw = match value {
        Some(Value::String(raw)) => raw.trim().to_ascii_lowercase(),
        // f64 display drops a zero fraction, so 2.0 reads as "2".
        Some(Value::Number(number)) => number
            .as_f64()
            .map_or_else(|| number.to_string(), |value| value.to_string()),
        _ => return ResponseModel::default(),
    };

    let model = MODEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map(|(_, model)| *model)
        .unwrap_or_default();

    if model == ResponseModel::Model3 && !advanced_mode {
        return ResponseModel::default();
    }
    model
}

fn channel_from_record(index: usize, record: &Value) -> Channel {
    let Some(fields) = record.as_object() else {
        return empty_channel(format!("channel_{index}"));
    };
    channel_from_fields(
        identifier(first_present(fields, CHANNEL_ID_FIELDS))
            .unwrap_or_else(|| format!("channel_{index}")),
        fields,
    )
}

fn channel_from_fields(channel_id: String, fields: &Map<String, Value>) -> Channel {
    Channel {
        channel_id,
        capacity: number_or_zero(first_present(fields, CHANNEL_CAPACITY_FIELDS)),
        unit_cost: number_or_zero(first_present(fields, CHANNEL_COST_FIELDS)),
        response_rate: optional_number(first_present(fields, CHANNEL_RATE_FIELDS)),
    }
}

fn channel_from_entry(channel_id: &str, entry: &Value) -> Channel {
    match entry {
        Value::Array(tuple) => Channel {
            channel_id: channel_id.to_string(),
            capacity: number_or_zero(tuple.first()),
            unit_cost: number_or_zero(tuple.get(1)),
            response_rate: optional_number(tuple.get(2)),
        },
        Value::Object(fields) => channel_from_fields(channel_id.to_string(), fields),
        _ => empty_channel(channel_id.to_string()),
    }
}

fn empty_channel(channel_id: String) -> Channel {
    Channel {
        channel_id,
        capacity: 0.0,
        unit_cost: 0.0,
        response_rate: None,
    }
}

fn product_from_record(index: usize, record: &Value) -> Product {
    let fields = record.as_object();
    let product_id = fields
        .and_then(|fields| identifier(first_present(fields, PRODUCT_ID_FIELDS)))
        .unwrap_or_else(|| format!("product_{index}"));
    let ltv = fields
        .map(|fields| number_or_zero(first_present(fields, PRODUCT_LTV_FIELDS)))
        .unwrap_or(0.0);

    Product { product_id, ltv }
}

fn product_from_entry(product_id: &str, entry: &Value) -> Product {
    let ltv = match entry {
        Value::Object(fields) => number_or_zero(first_present(fields, PRODUCT_LTV_FIELDS)),
        literal => number_or_zero(Some(literal)),
    };

    Product {
        product_id: product_id.to_string(),
        ltv,
    }
}
