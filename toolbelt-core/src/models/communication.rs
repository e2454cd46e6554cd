use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunicationDirection {
    Inbound,
    Outbound,
}

impl CommunicationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "Inbound",
            Self::Outbound => "Outbound",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Inbound" => Some(Self::Inbound),
            "Outbound" => Some(Self::Outbound),
            _ => None,
        }
    }
}

/// A logged touchpoint with a client (call, email, text). Owned by the
/// client; deleting the client removes its communications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Communication {
    pub id: i64,
    pub client_id: i64,
    /// Free-form channel label, e.g. "call" or "email".
    pub kind: String,
    pub subject: String,
    pub message: String,
    pub direction: CommunicationDirection,
    pub date: DateTime<Utc>,
}

/// For logging a new communication; `date` is stamped on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommunication {
    pub client_id: i64,
    pub kind: String,
    pub subject: String,
    pub message: String,
    pub direction: CommunicationDirection,
}
