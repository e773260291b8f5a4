//! Counting queries stored as JSON documents.
//!
//! ```
//! use molloy::CountQuery;
//!
//! let query = CountQuery::from_json_str(r#"{
//!     "items": { "red": 5, "blue": 5 },
//!     "size": 5,
//!     "constraints": "red % 3 == 0"
//! }"#).unwrap();
//!
//! assert_eq!(query.run().unwrap(), 2);
//! ```
//!
//! `size` defaults to the total number of items and `constraints` to none.

use std::{collections::BTreeMap, fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::multiset::{CountError, InvalidMultiset, Multiset};

/// A collection counting query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CountQuery {
    /// Maximum number of copies of every item.
    pub items: BTreeMap<String, usize>,
    /// Size of the collections to count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Constraints that the collections must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
}

/// Errors when loading a [CountQuery].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The query file could not be read
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The query is not valid JSON, or does not have the expected fields
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CountQuery {
    /// Parse a query from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, QueryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a query from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QueryError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The multiset of items of the query.
    pub fn multiset(&self) -> Result<Multiset, InvalidMultiset> {
        Multiset::from_counts(self.items.iter().map(|(item, &count)| (item.as_str(), count)))
    }

    /// Run the query.
    pub fn run(&self) -> Result<u64, CountError> {
        self.multiset()?
            .count_collections(self.size, self.constraints.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnsupportedFeature;

    #[test]
    fn defaults() {
        let query = CountQuery::from_json_str(r#"{ "items": { "red": 5, "blue": 5 } }"#).unwrap();
        assert_eq!(query.size, None);
        assert_eq!(query.constraints, None);
        assert_eq!(query.run(), Ok(1));
    }

    #[test]
    fn rejects_invalid_documents() {
        for json in [
            r#"{ "items": { "red": -1 } }"#,
            r#"{ "items": { "red": 1.5 } }"#,
            r#"{ "items": {}, "colour": "red" }"#,
            r#"{ "size": 3 }"#,
        ] {
            assert!(
                matches!(CountQuery::from_json_str(json), Err(QueryError::Json(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn zero_count_fails_at_run() {
        let query = CountQuery::from_json_str(r#"{ "items": { "red": 0 } }"#).unwrap();
        assert_eq!(
            query.run(),
            Err(CountError::InvalidMultiset(InvalidMultiset::ZeroCount(
                "red".into()
            )))
        );
    }

    #[test]
    fn unsupported_constraints() {
        let query = CountQuery {
            items: [("red".to_string(), 5)].into(),
            size: Some(3),
            constraints: Some("1 < red < 3".into()),
        };
        assert_eq!(
            query.run(),
            Err(CountError::Unsupported(UnsupportedFeature::OperatorChaining))
        );
    }

    #[test]
    fn missing_file() {
        let err = CountQuery::load("this/query/does/not/exist.json").unwrap_err();
        assert!(matches!(err, QueryError::Io(_)));
    }
}
