//! Local chemistry knowledge base.
//!
//! A flat JSON file of categorized entries, scanned with a case-insensitive
//! substring match. This is a deliberate keyword lookup, not a retrieval
//! index.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::Result;

/// One knowledge base entry
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub name: String,
    pub description: String,
}

/// Knowledge base: category name → entries
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    categories: HashMap<String, Vec<Entry>>,
}

impl KnowledgeBase {
    /// An empty knowledge base
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from a JSON file. A missing file logs a warning and yields an
    /// empty base; malformed JSON is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            warn!("Knowledge base not found at {:?}, using empty knowledge base", path);
            return Ok(Self::empty());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let categories: HashMap<String, Vec<Entry>> = serde_json::from_str(json)?;
        Ok(Self { categories })
    }

    /// Find the first entry whose name or description contains the query
    /// (case-insensitive, either direction for the name).
    pub fn lookup(&self, query: &str) -> Option<String> {
        let query = query.to_lowercase();

        for entries in self.categories.values() {
            for entry in entries {
                let name = entry.name.to_lowercase();
                if query.contains(&name)
                    || name.contains(&query)
                    || entry.description.to_lowercase().contains(&query)
                {
                    return Some(entry.description.clone());
                }
            }
        }
        None
    }

    /// Number of entries across all categories
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "delivery_systems": [
            {"name": "Liposome", "description": "Spherical vesicle with a lipid bilayer used to carry drugs."},
            {"name": "Dendrimer", "description": "Branched polymer carrier for targeted delivery."}
        ],
        "targeting": [
            {"name": "EPR effect", "description": "Enhanced permeability and retention in tumor vasculature."}
        ]
    }"#;

    #[test]
    fn test_lookup_by_name_in_query() {
        let kb = KnowledgeBase::from_json(SAMPLE).unwrap();
        let hit = kb.lookup("tell me about liposome carriers").unwrap();
        assert!(hit.contains("lipid bilayer"));
    }

    #[test]
    fn test_lookup_miss() {
        let kb = KnowledgeBase::from_json(SAMPLE).unwrap();
        assert!(kb.lookup("quantum chromodynamics").is_none());
    }

    #[test]
    fn test_missing_file_yields_empty_base() {
        let kb = KnowledgeBase::load("/nonexistent/chem_knowledge.json").unwrap();
        assert!(kb.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let kb = KnowledgeBase::load(file.path()).unwrap();
        assert_eq!(kb.len(), 3);
        assert!(kb.lookup("EPR effect").is_some());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(KnowledgeBase::from_json("{not json").is_err());
    }
}
