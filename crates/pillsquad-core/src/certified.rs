//! Certified-product registry
//!
//! Loads the MFDS product export (a CSV of product → company pairs) once at
//! startup and answers containment queries against it. The registry is
//! immutable after construction and meant to be shared behind an `Arc`.

use crate::error::{Error, Result};
use crate::types::CertifiedProductEntry;
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Column headers of the product CSV
#[derive(Debug, Clone)]
pub struct RegistryColumns {
    pub product: String,
    pub company: String,
}

impl Default for RegistryColumns {
    fn default() -> Self {
        Self {
            product: "제품명".to_string(),
            company: "업소명".to_string(),
        }
    }
}

/// In-memory registry of certified products
pub struct CertifiedRegistry {
    /// Entries in first-seen order
    entries: Vec<CertifiedProductEntry>,

    /// Lowercased product names, parallel to `entries`
    lowered: Vec<String>,

    /// Matcher over `lowered` for scanning free text
    matcher: Option<AhoCorasick>,
}

impl CertifiedRegistry {
    /// Load the registry from a CSV file using the default column headers
    pub fn load(csv_path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_columns(csv_path, &RegistryColumns::default())
    }

    /// Load the registry from a CSV file with explicit column headers
    pub fn load_with_columns(csv_path: impl AsRef<Path>, columns: &RegistryColumns) -> Result<Self> {
        let path = csv_path.as_ref();
        if !path.exists() {
            return Err(Error::data_load(format!(
                "certified product CSV not found: {}",
                path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::data_load(format!("failed to open {}: {}", path.display(), e)))?;

        let headers = reader
            .headers()
            .map_err(|e| Error::data_load(format!("failed to read CSV header: {}", e)))?
            .clone();

        let column_index = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| Error::data_load(format!("missing column '{}' in {}", name, path.display())))
        };
        let product_idx = column_index(&columns.product)?;
        let company_idx = column_index(&columns.company)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| Error::data_load(format!("malformed CSV row: {}", e)))?;
            let product = record.get(product_idx).unwrap_or_default();
            let company = record.get(company_idx).unwrap_or_default();
            rows.push(CertifiedProductEntry::new(product, company));
        }

        let registry = Self::from_entries(rows)?;
        info!(
            "Loaded {} certified products from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Build a registry from entries. Names are trimmed, entries with an empty
    /// product name are dropped and a repeated product keeps its first position
    /// with the last company seen.
    pub fn from_entries(entries: impl IntoIterator<Item = CertifiedProductEntry>) -> Result<Self> {
        let mut deduped: Vec<CertifiedProductEntry> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let product = entry.product_name.trim();
            if product.is_empty() {
                continue;
            }
            let company = entry.company_name.trim().to_string();

            match positions.get(product) {
                Some(&idx) => deduped[idx].company_name = company,
                None => {
                    positions.insert(product.to_string(), deduped.len());
                    deduped.push(CertifiedProductEntry::new(product, company));
                }
            }
        }

        let lowered: Vec<String> = deduped
            .iter()
            .map(|e| e.product_name.to_lowercase())
            .collect();

        let matcher = if lowered.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::Standard)
                    .build(&lowered)
                    .map_err(|e| Error::data_load(format!("failed to build product matcher: {e}")))?,
            )
        };

        Ok(Self {
            entries: deduped,
            lowered,
            matcher,
        })
    }

    /// Every entry whose product name contains `query`, ignoring case
    pub fn lookup(&self, query: &str) -> Vec<&CertifiedProductEntry> {
        let needle = query.trim().to_lowercase();
        let matches: Vec<_> = self
            .entries
            .iter()
            .zip(&self.lowered)
            .filter(|(_, lowered)| lowered.contains(&needle))
            .map(|(entry, _)| entry)
            .collect();

        debug!(query, matches = matches.len(), "registry lookup");
        matches
    }

    /// Every entry whose product name appears inside `text`, ignoring case
    pub fn scan_text(&self, text: &str) -> Vec<&CertifiedProductEntry> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };

        let haystack = text.to_lowercase();
        let mut seen = vec![false; self.entries.len()];
        for m in matcher.find_overlapping_iter(&haystack) {
            seen[m.pattern().as_usize()] = true;
        }

        self.entries
            .iter()
            .zip(seen)
            .filter_map(|(entry, hit)| hit.then_some(entry))
            .collect()
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[CertifiedProductEntry] {
        &self.entries
    }

    /// Number of distinct products
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no products
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CertifiedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertifiedRegistry")
            .field("products", &self.entries.len())
            .finish()
    }
}
