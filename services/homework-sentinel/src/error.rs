//! Error types for the homework sentinel service

/// Failures of a single poll request against the status API.
///
/// Every variant is retryable: the poll loop reports it and tries again on
/// the next cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Эндпоинт {endpoint} с параметрами from_date={since} не доступен: {detail}")]
    Transport {
        endpoint: String,
        since: i64,
        detail: String,
    },

    #[error("Проблема с доступом к {endpoint} с параметрами from_date={since}. Код ответа: {code}")]
    EndpointStatus {
        endpoint: String,
        since: i64,
        code: u16,
    },

    #[error("Ответ API не является корректным JSON: {0}")]
    MalformedPayload(String),

    #[error("Некорректная структура ответа API: {0}")]
    SchemaViolation(String),

    #[error("API сообщил об ошибке. Ключ: {key}, Значение: {value}")]
    ApiReportedError { key: String, value: String },
}

/// A record carried a status code that has no verdict text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Неизвестный статус \"{status}\" у работы \"{identifier}\"")]
pub struct UnknownStatusError {
    pub status: String,
    pub identifier: String,
}

/// Delivery of a message through the messaging channel failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Сбой при отправке сообщения: {0}")]
pub struct NotifyError(pub String);

/// Anything that can abort a poll cycle and send it to the backoff branch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatusError),
}

/// Errors that can occur in the homework sentinel service
#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Messaging error: {0}")]
    Messaging(String),
}

/// Result type alias for sentinel operations
pub type Result<T> = std::result::Result<T, SentinelError>;
