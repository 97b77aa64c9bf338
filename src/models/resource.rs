//! Resource (court) model.
//!
//! A court is available from `opens_at` until `closes_at`. A closing time
//! at or before the opening means the court stays open past midnight.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A court (or table, field, ring) that hosts one match at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Daily opening time.
    pub opens_at: NaiveTime,
    /// Daily closing time. `None` = open until the end of the playing day.
    #[serde(default)]
    pub closes_at: Option<NaiveTime>,
    /// Domain-specific metadata (surface, location).
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Resource {
    /// Creates a court open from `opens_at` to the end of the day.
    pub fn new(id: impl Into<String>, opens_at: NaiveTime) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            opens_at,
            closes_at: None,
            attributes: HashMap::new(),
        }
    }

    /// Sets the resource name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the closing time.
    pub fn with_closes_at(mut self, closes_at: NaiveTime) -> Self {
        self.closes_at = Some(closes_at);
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether the court closes after midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.closes_at.is_some_and(|close| close <= self.opens_at)
    }
}
