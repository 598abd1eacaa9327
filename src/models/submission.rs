use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw contact-form payload as posted by the browser. All fields are
/// optional at this stage so that presence can be checked explicitly;
/// unknown keys land in `extras` (used for the honeypot check).
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[serde(flatten)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl ContactForm {
    /// Require all four fields to be present and non-empty. The original
    /// frontend sends empty strings for untouched inputs, so empty counts
    /// as missing.
    pub fn validate(self) -> Result<ContactSubmission, &'static str> {
        let require = |field: Option<String>| field.filter(|s| !s.is_empty());

        match (
            require(self.name),
            require(self.email),
            require(self.subject),
            require(self.message),
        ) {
            (Some(name), Some(email), Some(subject), Some(message)) => Ok(ContactSubmission {
                name,
                email,
                subject,
                message,
                submitted_at: None,
            }),
            _ => Err("Missing required fields"),
        }
    }
}

/// A validated submission, one workbook row. `submitted_at` is stamped by
/// the writer at persistence time, not by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}
