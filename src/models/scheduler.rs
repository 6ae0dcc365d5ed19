// Scheduler run snapshot models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Outcome of a scheduler run; persisted as its wire name (e.g. "OK").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulerCode {
    Ok,
    Error,
}

impl SchedulerCode {
    pub fn as_str(self) -> &'static str {
        match self {
            SchedulerCode::Ok => "OK",
            SchedulerCode::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(SchedulerCode::Ok),
            "ERROR" => Some(SchedulerCode::Error),
            _ => None,
        }
    }
}

/// Kind of check the scheduler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulerType {
    Tcp,
    SiteMap,
    Grpc,
    Http,
    HttpJsonValue,
}

impl SchedulerType {
    pub fn as_str(self) -> &'static str {
        match self {
            SchedulerType::Tcp => "TCP",
            SchedulerType::SiteMap => "SITE_MAP",
            SchedulerType::Grpc => "GRPC",
            SchedulerType::Http => "HTTP",
            SchedulerType::HttpJsonValue => "HTTP_JSON_VALUE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TCP" => Some(SchedulerType::Tcp),
            "SITE_MAP" => Some(SchedulerType::SiteMap),
            "GRPC" => Some(SchedulerType::Grpc),
            "HTTP" => Some(SchedulerType::Http),
            "HTTP_JSON_VALUE" => Some(SchedulerType::HttpJsonValue),
            _ => None,
        }
    }
}

/// Structured payload attached to a run (e.g. the value extracted by an HTTP JSON check).
/// Plain JSON on the wire; see the `serde_json::Value` conversions below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum MetaValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<MetaValue>),
    Struct(BTreeMap<String, MetaValue>),
}

impl From<serde_json::Value> for MetaValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => MetaValue::Null,
            Value::Bool(b) => MetaValue::Bool(b),
            // Numbers f64 cannot hold become Null, the same as non-finite numbers on output.
            Value::Number(n) => n.as_f64().map_or(MetaValue::Null, MetaValue::Number),
            Value::String(s) => MetaValue::String(s),
            Value::Array(items) => MetaValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(fields) => {
                MetaValue::Struct(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<MetaValue> for serde_json::Value {
    fn from(v: MetaValue) -> Self {
        use serde_json::Value;
        match v {
            MetaValue::Null => Value::Null,
            MetaValue::Bool(b) => Value::Bool(b),
            // JSON has no NaN/inf
            MetaValue::Number(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            MetaValue::String(s) => Value::String(s),
            MetaValue::List(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            MetaValue::Struct(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    /// Run start; also the snapshot's time for windowing and ordering.
    pub start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<MetaValue>,
}

/// One completed scheduler run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub scheduler_id: String,
    pub code: SchedulerCode,
    #[serde(rename = "type")]
    pub type_: SchedulerType,
    #[serde(default)]
    pub error: String,
    pub meta: Option<MetaData>,
}
