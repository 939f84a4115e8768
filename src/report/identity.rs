//! Report identity and rename lookup.
//!
//! Persistence lives outside this crate. A stored report can be addressed either by its
//! stable id or by its creation timestamp, so the artifact carries both.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportIdentity {
    pub report_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl ReportIdentity {
    pub fn new(name: Option<String>, owner: Option<String>) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            created_at: Utc::now(),
            name,
            owner,
        }
    }

    /// RFC 3339 with millisecond precision, the form used for timestamp lookups.
    pub fn created_at_key(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// True if `key` addresses this report and `requester` owns it.
    ///
    /// Reports without an owner never match a rename request.
    pub fn matches(&self, key: &ReportKey, requester: &str) -> bool {
        if self.owner.as_deref() != Some(requester) {
            return false;
        }
        match key {
            ReportKey::Id(id) => *id == self.report_id,
            ReportKey::CreatedAt(ts) => {
                ts.timestamp_millis() == self.created_at.timestamp_millis()
            }
        }
    }
}

/// Lookup key for a stored report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKey {
    Id(Uuid),
    CreatedAt(DateTime<Utc>),
}

impl ReportKey {
    /// Parse a UUID or an RFC 3339 timestamp.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(id) = Uuid::parse_str(raw) {
            return Some(ReportKey::Id(id));
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ReportKey::CreatedAt(ts.with_timezone(&Utc)))
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKey::Id(id) => write!(f, "{id}"),
            ReportKey::CreatedAt(ts) => {
                write!(f, "{}", ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}
