//! TF-IDF text vectorizer
//!
//! Reproduces the feature extraction of a fitted word-level TF-IDF vectorizer
//! exported to JSON: vocabulary, optional idf weights, n-gram range and norm.

use pillsquad_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Row normalisation applied after weighting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

/// Exported vectorizer parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerSpec {
    /// Term → feature column
    pub vocabulary: HashMap<String, usize>,

    /// Inverse document frequencies by column; raw counts when absent
    #[serde(default)]
    pub idf: Option<Vec<f32>>,

    #[serde(default = "default_true")]
    pub lowercase: bool,

    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    #[serde(default)]
    pub norm: Norm,

    #[serde(default)]
    pub sublinear_tf: bool,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Fitted TF-IDF vectorizer producing dense feature rows
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    spec: VectorizerSpec,
    n_features: usize,
    token_pattern: Regex,
}

impl TfidfVectorizer {
    /// Load an exported vectorizer from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::data_load(format!("failed to read vectorizer {}: {}", path.display(), e))
        })?;
        let spec: VectorizerSpec = serde_json::from_str(&content).map_err(|e| {
            Error::data_load(format!("failed to parse vectorizer {}: {}", path.display(), e))
        })?;
        Self::new(spec)
    }

    /// Validate a spec and build the vectorizer
    pub fn new(spec: VectorizerSpec) -> Result<Self> {
        let n_features = spec.vocabulary.values().max().map_or(0, |max| max + 1);

        if let Some(idf) = &spec.idf {
            if idf.len() < n_features {
                return Err(Error::data_load(format!(
                    "idf has {} weights but vocabulary spans {} columns",
                    idf.len(),
                    n_features
                )));
            }
        }

        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::data_load(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        let token_pattern = Regex::new(r"\b\w\w+\b")
            .map_err(|e| Error::internal(format!("token pattern: {e}")))?;

        let n_features = spec.idf.as_ref().map_or(n_features, |idf| idf.len());

        Ok(Self {
            spec,
            n_features,
            token_pattern,
        })
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Tokens and n-grams of a document, in order
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.spec.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .collect();

        let (min_n, max_n) = self.spec.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 1 {
                terms.extend(tokens.iter().map(|t| t.to_string()));
            } else {
                terms.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }
        terms
    }

    /// Transform a document into a dense feature row
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut row = vec![0.0f32; self.n_features];

        for term in self.analyze(text) {
            if let Some(&col) = self.spec.vocabulary.get(&term) {
                row[col] += 1.0;
            }
        }

        if self.spec.sublinear_tf {
            for value in row.iter_mut().filter(|v| **v > 0.0) {
                *value = 1.0 + value.ln();
            }
        }

        if let Some(idf) = &self.spec.idf {
            for (value, weight) in row.iter_mut().zip(idf) {
                *value *= weight;
            }
        }

        let norm = match self.spec.norm {
            Norm::L2 => row.iter().map(|v| v * v).sum::<f32>().sqrt(),
            Norm::L1 => row.iter().map(|v| v.abs()).sum::<f32>(),
            Norm::None => 0.0,
        };
        if norm > 0.0 {
            for value in row.iter_mut() {
                *value /= norm;
            }
        }

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(terms: &[&str]) -> VectorizerSpec {
        VectorizerSpec {
            vocabulary: terms
                .iter()
                .enumerate()
                .map(|(i, t)| (t.to_string(), i))
                .collect(),
            idf: None,
            lowercase: true,
            ngram_range: (1, 1),
            norm: Norm::None,
            sublinear_tf: false,
        }
    }

    #[test]
    fn test_analyze_drops_single_char_tokens() {
        let vec = TfidfVectorizer::new(spec(&["은행잎추출물"])).unwrap();
        assert_eq!(
            vec.analyze("은행잎추출물 A 코스맥스"),
            vec!["은행잎추출물".to_string(), "코스맥스".to_string()]
        );
    }

    #[test]
    fn test_counts_without_idf() {
        let vec = TfidfVectorizer::new(spec(&["vitamin", "gold"])).unwrap();
        assert_eq!(vec.transform("Vitamin vitamin GOLD silver"), vec![2.0, 1.0]);
    }

    #[test]
    fn test_bigrams() {
        let mut s = spec(&["milk", "milk thistle"]);
        s.ngram_range = (1, 2);
        let vec = TfidfVectorizer::new(s).unwrap();
        assert_eq!(vec.transform("milk thistle"), vec![1.0, 1.0]);
    }

    #[test]
    fn test_tfidf_l2_normalised() {
        let mut s = spec(&["a1", "b2"]);
        s.idf = Some(vec![1.0, 2.0]);
        s.norm = Norm::L2;
        let vec = TfidfVectorizer::new(s).unwrap();

        let row = vec.transform("a1 b2");
        let length: f32 = row.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((length - 1.0).abs() < 1e-6);
        assert!(row[1] > row[0]);
    }

    #[test]
    fn test_unknown_terms_yield_zero_row() {
        let mut s = spec(&["known"]);
        s.norm = Norm::L2;
        let vec = TfidfVectorizer::new(s).unwrap();
        assert_eq!(vec.transform("nothing here"), vec![0.0]);
    }

    #[test]
    fn test_rejects_short_idf() {
        let mut s = spec(&["a1", "b2"]);
        s.idf = Some(vec![1.0]);
        assert!(TfidfVectorizer::new(s).is_err());
    }
}
