use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Column '{0}' is mapped more than once")]
    DuplicateSource(String),

    #[error("Column '{0}' is targeted more than once")]
    DuplicateTarget(String),

    #[error("Invalid mapping entry '{0}': expected A_COLUMN=B_COLUMN")]
    InvalidEntry(String),
}

/// One-to-one correspondence from dataset A columns to dataset B columns.
///
/// Pairs keep the order they were added in. Sources are unique and
/// targets are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pairs: Vec<(String, String)>,
}

impl ColumnMapping {
    /// Build a mapping from ordered pairs.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::DuplicateSource` or
    /// `MappingError::DuplicateTarget` if the pairs are not one-to-one.
    pub fn new<A, B>(pairs: impl IntoIterator<Item = (A, B)>) -> Result<Self, MappingError>
    where
        A: Into<String>,
        B: Into<String>,
    {
        let mut mapping = Self::default();
        for (a, b) in pairs {
            mapping.insert(a.into(), b.into())?;
        }
        Ok(mapping)
    }

    /// Parse `a=b` entries as given on the command line.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::InvalidEntry` for entries without `=` or with
    /// an empty side, and the duplicate errors of [`ColumnMapping::new`].
    pub fn parse_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self, MappingError> {
        let mut mapping = Self::default();
        for entry in entries {
            let entry = entry.as_ref();
            let Some((a, b)) = entry.split_once('=') else {
                return Err(MappingError::InvalidEntry(entry.to_string()));
            };
            let (a, b) = (a.trim(), b.trim());
            if a.is_empty() || b.is_empty() {
                return Err(MappingError::InvalidEntry(entry.to_string()));
            }
            mapping.insert(a.to_string(), b.to_string())?;
        }
        Ok(mapping)
    }

    pub(crate) fn insert(&mut self, a: String, b: String) -> Result<(), MappingError> {
        if self.target(&a).is_some() {
            return Err(MappingError::DuplicateSource(a));
        }
        if self.source(&b).is_some() {
            return Err(MappingError::DuplicateTarget(b));
        }
        self.pairs.push((a, b));
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// B column mapped from A column `a`
    #[must_use]
    pub fn target(&self, a: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(src, _)| src == a)
            .map(|(_, dst)| dst.as_str())
    }

    /// A column mapped onto B column `b`
    #[must_use]
    pub fn source(&self, b: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(_, dst)| dst == b)
            .map(|(src, _)| src.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        self.pairs.iter().map(|(a, _)| a.as_str()).collect()
    }

    #[must_use]
    pub fn targets(&self) -> Vec<&str> {
        self.pairs.iter().map(|(_, b)| b.as_str()).collect()
    }

    /// True when every target is distinct (always holds for a built mapping)
    #[must_use]
    pub fn is_injective(&self) -> bool {
        let mut seen = HashSet::new();
        self.pairs.iter().all(|(_, b)| seen.insert(b.as_str()))
    }
}

impl Serialize for ColumnMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pairs.len()))?;
        for (a, b) in &self.pairs {
            map.serialize_entry(a, b)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_lookup() {
        let mapping = ColumnMapping::new([("id", "codigo"), ("v", "valor")]).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.target("id"), Some("codigo"));
        assert_eq!(mapping.source("valor"), Some("v"));
        assert_eq!(mapping.target("missing"), None);
        assert_eq!(mapping.sources(), vec!["id", "v"]);
        assert!(mapping.is_injective());
    }

    #[test]
    fn test_duplicates_rejected() {
        assert_eq!(
            ColumnMapping::new([("a", "x"), ("a", "y")]).unwrap_err(),
            MappingError::DuplicateSource("a".to_string())
        );
        assert_eq!(
            ColumnMapping::new([("a", "x"), ("b", "x")]).unwrap_err(),
            MappingError::DuplicateTarget("x".to_string())
        );
    }

    #[test]
    fn test_parse_entries() {
        let mapping = ColumnMapping::parse_entries(&["id = codigo", "Nome=nome_prod"]).unwrap();
        assert_eq!(mapping.target("id"), Some("codigo"));
        assert_eq!(mapping.target("Nome"), Some("nome_prod"));

        assert!(matches!(
            ColumnMapping::parse_entries(&["novalue"]),
            Err(MappingError::InvalidEntry(_))
        ));
        assert!(matches!(
            ColumnMapping::parse_entries(&["a="]),
            Err(MappingError::InvalidEntry(_))
        ));
    }

    #[test]
    fn test_serializes_in_order() {
        let mapping = ColumnMapping::new([("z", "1"), ("a", "2")]).unwrap();
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
    }
}
