//! Core data models used throughout Directory Search.
//!
//! A [`Record`] mirrors one element of the JSON array served by the
//! records endpoint. The four indexed fields (`name`, `username`,
//! `email`, `company.name`) are required; display-only fields default to
//! empty when the payload omits them.

use serde::{Deserialize, Serialize};

/// Unique record identifier.
pub type RecordId = u64;

/// An ordered record collection, in the order the source returned it.
pub type RecordCollection = Vec<Record>;

/// A single directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    pub company: Company,
}

/// Postal address. Display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub geo: Geo,
}

/// Coordinates as served by the source (strings, not parsed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lng: String,
}

/// Employer details. Only `name` is indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub catch_phrase: String,
    #[serde(default)]
    pub bs: String,
}

impl Record {
    /// Build a record carrying only the indexed fields.
    pub fn new(
        id: RecordId,
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            username: username.into(),
            email: email.into(),
            address: Address::default(),
            phone: String::new(),
            website: String::new(),
            company: Company {
                name: company_name.into(),
                catch_phrase: String::new(),
                bs: String::new(),
            },
        }
    }

    pub fn company_name(&self) -> &str {
        &self.company.name
    }

    /// The field values fed to the prefix index, in index order.
    pub fn indexed_fields(&self) -> [&str; 4] {
        [&self.name, &self.username, &self.email, &self.company.name]
    }
}

/// Ids that occur more than once in `records`, in first-repeat order.
///
/// Duplicates are kept in the collection; callers use this to report them.
pub fn duplicate_ids(records: &[Record]) -> Vec<RecordId> {
    let mut seen = std::collections::HashSet::new();
    let mut dups = Vec::new();
    for r in records {
        if !seen.insert(r.id) && !dups.contains(&r.id) {
            dups.push(r.id);
        }
    }
    dups
}
