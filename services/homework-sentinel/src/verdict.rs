//! Mapping of review status codes to the text shown to the student

use std::collections::BTreeMap;

use crate::error::UnknownStatusError;

/// Closed set of known statuses and their verdict text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictMap {
    verdicts: BTreeMap<String, String>,
}

impl VerdictMap {
    pub fn new(verdicts: BTreeMap<String, String>) -> Self {
        Self { verdicts }
    }

    /// Look up the verdict for `status`. `identifier` only feeds the error.
    pub fn resolve(&self, identifier: &str, status: &str) -> Result<&str, UnknownStatusError> {
        self.verdicts
            .get(status)
            .map(String::as_str)
            .ok_or_else(|| UnknownStatusError {
                status: status.to_string(),
                identifier: identifier.to_string(),
            })
    }
}

impl Default for VerdictMap {
    fn default() -> Self {
        Self::new(crate::config::default_verdicts())
    }
}

/// Text sent when a work changes status
pub fn status_change_message(identifier: &str, verdict: &str) -> String {
    format!(
        "Изменился статус проверки работы \"{}\". {}",
        identifier, verdict
    )
}
