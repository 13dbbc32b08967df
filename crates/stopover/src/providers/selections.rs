use anyhow::{Context, Result};
use std::path::Path;

use crate::place::RawSearchSelection;

use super::{PlaceSearch, ProviderError};

/// Search selections recorded in a JSON file, in the Places result shape.
///
/// Searching matches the query case-insensitively against name and address,
/// keeping file order.
#[derive(Debug, Clone, Default)]
pub struct SelectionFile {
    selections: Vec<RawSearchSelection>,
}

impl SelectionFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let selections: Vec<RawSearchSelection> = serde_json::from_str(json)?;
        Ok(Self { selections })
    }

    /// Every recorded selection, in file order.
    pub fn selections(&self) -> &[RawSearchSelection] {
        &self.selections
    }
}

impl PlaceSearch for SelectionFile {
    fn search(&self, query: &str) -> Result<Vec<RawSearchSelection>, ProviderError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .selections
            .iter()
            .filter(|s| {
                [&s.name, &s.formatted_address]
                    .into_iter()
                    .flatten()
                    .any(|text| text.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}
