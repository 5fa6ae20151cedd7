//! City and country API types.
//!
//! These types model the JSON bodies exchanged with the admin REST API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A city record.
///
/// Returned by `GET /cities` and by the create/update endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    /// Server-assigned identifier. Absent until the record is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Short display name (e.g. "Paris").
    #[serde(default)]
    pub name: String,
    /// Long display name (e.g. "Paris, France").
    #[serde(default)]
    pub detailed_name: String,
    /// IATA location code (e.g. "PAR").
    #[serde(default)]
    pub iata_code: String,
    /// Identifier of the owning country.
    #[serde(default)]
    pub country_id: i64,
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} (#{})", self.name, id),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Body of a create request. Never carries an id; the server assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCity {
    pub name: String,
    pub detailed_name: String,
    pub iata_code: String,
    pub country_id: i64,
}

impl NewCity {
    /// Attach an id, as the server does when it persists the record.
    pub fn with_id(self, id: i64) -> City {
        City {
            id: Some(id),
            name: self.name,
            detailed_name: self.detailed_name,
            iata_code: self.iata_code,
            country_id: self.country_id,
        }
    }
}

/// A country record. Read-only from the admin console's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
}
