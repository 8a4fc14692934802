use serde::{Deserialize, Serialize};

/// A processing log entry: one process touching a data subject's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Correlation identifier, also used as the broker partition key.
    pub event_id: String,
    pub process: String,
    pub purpose: String,
    pub processing: String,
    #[serde(alias = "location")]
    pub recipient: String,
    pub storage: String,
    pub user_id: String,
    /// Data categories touched, in random order.
    #[serde(alias = "attributes")]
    pub data: Vec<String>,
}

/// A data subject's consent, made of one or more simple policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentEvent {
    pub consent_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub user_id: String,
    pub simple_policies: Vec<SimplePolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplePolicy {
    pub purpose: String,
    pub processing: String,
    pub recipient: String,
    pub storage: String,
    pub data: String,
}

/// An assembled record travelling through the pipeline.
///
/// Serializes as the bare inner record, without a kind tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Log(LogEvent),
    Consent(ConsentEvent),
}

impl Record {
    /// Identifier used as the partition key when publishing.
    pub fn key(&self) -> &str {
        match self {
            Record::Log(event) => &event.event_id,
            Record::Consent(event) => &event.consent_id,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            Record::Log(event) => event.timestamp,
            Record::Consent(event) => event.timestamp,
        }
    }
}

impl From<LogEvent> for Record {
    fn from(event: LogEvent) -> Self {
        Record::Log(event)
    }
}

impl From<ConsentEvent> for Record {
    fn from(event: ConsentEvent) -> Self {
        Record::Consent(event)
    }
}
