//! Client for the homework status API

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;
use crate::io::HttpClient;

const HOMEWORKS_KEY: &str = "homeworks";
const ERROR_KEYS: [&str; 2] = ["code", "error"];

/// One homework as reported by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(rename = "homework_name", alias = "identifier")]
    pub identifier: String,
    pub status: String,
    #[serde(alias = "date")]
    pub updated_at: i64,
}

/// Polls the status endpoint and validates what comes back
pub struct StatusClient {
    endpoint: String,
    authorization: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for StatusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl StatusClient {
    pub fn new(
        endpoint: &str,
        auth_scheme: &str,
        token: &str,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        tracing::debug!("Created StatusClient for {}", endpoint);
        Self {
            endpoint: endpoint.to_string(),
            authorization: format!("{} {}", auth_scheme, token),
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch every record updated since `since` (epoch seconds)
    pub async fn fetch(&self, since: i64) -> Result<Vec<ResourceRecord>, FetchError> {
        let since_param = since.to_string();
        let response = self
            .http
            .get(
                &self.endpoint,
                &[("from_date", since_param.as_str())],
                &self.authorization,
            )
            .await
            .map_err(|e| FetchError::Transport {
                endpoint: self.endpoint.clone(),
                since,
                detail: e.to_string(),
            })?;

        if response.status != 200 {
            return Err(FetchError::EndpointStatus {
                endpoint: self.endpoint.clone(),
                since,
                code: response.status,
            });
        }

        parse_records(&response.body)
    }
}

/// Validate a response body and decode its records
pub fn parse_records(body: &str) -> Result<Vec<ResourceRecord>, FetchError> {
    let payload: Value =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

    let object = match payload {
        Value::Object(object) => object,
        other => {
            return Err(FetchError::SchemaViolation(format!(
                "ответ API должен быть словарём, получен тип: {}",
                json_type(&other)
            )))
        }
    };

    if let Some((key, value)) = ERROR_KEYS
        .iter()
        .find_map(|key| object.get(*key).map(|value| (*key, value)))
    {
        return Err(FetchError::ApiReportedError {
            key: key.to_string(),
            value: match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        });
    }

    let homeworks = object.get(HOMEWORKS_KEY).ok_or_else(|| {
        FetchError::SchemaViolation(format!("ответ API не содержит ключа \"{}\"", HOMEWORKS_KEY))
    })?;

    let Value::Array(items) = homeworks else {
        return Err(FetchError::SchemaViolation(format!(
            "данные под ключом \"{}\" не являются списком, получен тип: {}",
            HOMEWORKS_KEY,
            json_type(homeworks)
        )));
    };

    items
        .iter()
        .map(|item| {
            ResourceRecord::deserialize(item).map_err(|e| {
                FetchError::SchemaViolation(format!(
                    "некорректная запись в \"{}\": {}",
                    HOMEWORKS_KEY, e
                ))
            })
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
