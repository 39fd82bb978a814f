use serde::Serialize;
use serde_json::{Map, Value};

/// Success body shared by every route: `{status, token?, message?, results?, data}`.
#[derive(Serialize)]
pub struct Envelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl Envelope {
    pub fn success() -> Self {
        Self {
            status: "success",
            token: None,
            message: None,
            results: None,
            data: Map::new(),
        }
    }

    /// Serializes `value` under `data.{key}`. Domain types serialize infallibly, so a failure
    /// here is recorded as `null` rather than surfacing as an error.
    pub fn with<T: Serialize>(mut self, key: &str, value: &T) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize response field {}: {}", key, e);
            Value::Null
        });
        self.data.insert(key.to_string(), value);
        self
    }

    /// Like [`Envelope::with`] for a list, also setting `results`.
    pub fn with_list<T: Serialize>(mut self, key: &str, values: &[T]) -> Self {
        self.results = Some(values.len());
        self.with(key, &values)
    }

    pub fn token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Trimmed identity returned by shopkeeper signup while the account awaits approval.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingShopkeeper<'a> {
    #[serde(rename = "_id")]
    pub id: &'a str,
    pub name: &'a str,
    pub shop_name: &'a str,
    pub email: &'a str,
    pub mobile_number: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_omitted() {
        let json = serde_json::to_value(Envelope::success()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "success" }));
    }

    #[test]
    fn list_sets_results() {
        let json = serde_json::to_value(Envelope::success().with_list("orders", &[1, 2, 3])).unwrap();
        assert_eq!(json["results"], 3);
        assert_eq!(json["data"]["orders"], serde_json::json!([1, 2, 3]));
    }
}
