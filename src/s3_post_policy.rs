use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct Conditions(Vec<Value>);

impl Conditions {
    pub fn new(
        content_length_range: (u64, u64),
        bucket: &str,
        fields: &BTreeMap<String, String>,
    ) -> Self {
        let mut conditions = Self(vec![]);

        conditions.insert_range_number(
            "content-length-range",
            content_length_range.0,
            content_length_range.1,
        );
        conditions.insert_match("bucket", bucket);
        for (key, value) in fields.iter() {
            conditions.insert_match(key, value);
        }

        conditions
    }

    pub fn insert_match(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let mut condition = serde_json::Map::new();
        condition.insert(key.into(), Value::String(value.into()));
        self.0.push(Value::Object(condition));
    }

    pub fn insert_range_number(&mut self, key: impl Into<String>, from: u64, to: u64) {
        let key: String = key.into();
        self.0.push(json!([key, from, to]));
    }
}

/// Browser-based upload policy, signed with V4.
#[derive(Debug, Clone, Serialize)]
pub struct Policy {
    expiration: String,
    conditions: Conditions,
}

impl Policy {
    pub fn new(expiration: DateTime<Utc>, conditions: Conditions) -> Self {
        let expiration = expiration.to_rfc3339_opts(SecondsFormat::Secs, true);
        Self {
            expiration,
            conditions,
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(BASE64.encode(serde_json::to_string(self)?))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_policy_json_shape() {
        let mut fields = BTreeMap::new();
        fields.insert("key".to_string(), "uploads/a.txt".to_string());
        fields.insert("Content-Type".to_string(), "text/plain".to_string());
        let expiration = Utc.with_ymd_and_hms(2015, 12, 30, 12, 0, 0).unwrap();
        let policy = Policy::new(expiration, Conditions::new((0, 1024), "sigv4examplebucket", &fields));

        let decoded = BASE64.decode(policy.encode().unwrap()).unwrap();
        let value: Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(
            value,
            json!({
                "expiration": "2015-12-30T12:00:00Z",
                "conditions": [
                    ["content-length-range", 0, 1024],
                    {"bucket": "sigv4examplebucket"},
                    {"Content-Type": "text/plain"},
                    {"key": "uploads/a.txt"},
                ]
            })
        );
    }

    #[test]
    fn test_condition_values_are_escaped() {
        let mut conditions = Conditions(vec![]);
        conditions.insert_match("key", "quote\"d");
        assert_eq!(conditions.0[0], json!({"key": "quote\"d"}));
    }
}
