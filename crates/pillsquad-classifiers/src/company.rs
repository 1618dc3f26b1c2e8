//! Company-origin classifier
//!
//! Estimates whether a seller (company name, representative, address) is a
//! disguised foreign company. The scoring itself is delegated to a
//! [`ProbabilityScorer`], normally the BERT scorer.

use crate::classifier::{ClassificationResult, LabelSet, Verdict};
use pillsquad_core::{CompanyRequest, Error, Result};
use std::sync::Arc;

/// Decision threshold on the suspect probability (inclusive)
const SUSPECT_THRESHOLD: f32 = 0.5;

/// Maps text to the probability of the positive class
pub trait ProbabilityScorer: Send + Sync {
    fn probability(&self, text: &str) -> Result<f32>;

    /// Identifier of the underlying model
    fn model_name(&self) -> &str;
}

pub struct CompanyOriginClassifier {
    scorer: Arc<dyn ProbabilityScorer>,
}

impl CompanyOriginClassifier {
    pub fn new(scorer: Arc<dyn ProbabilityScorer>) -> Self {
        Self { scorer }
    }

    /// Text fed to the scorer: the three parts space-joined, trimmed
    pub fn compose_input(company: &str, ceo: &str, address: &str) -> String {
        [company, ceo, address].join(" ").trim().to_string()
    }

    /// Classify from the three parts; `None` when there is nothing to classify
    pub fn classify_parts(
        &self,
        company: &str,
        ceo: &str,
        address: &str,
    ) -> Result<Option<ClassificationResult>> {
        let text = Self::compose_input(company, ceo, address);
        if text.is_empty() {
            return Ok(None);
        }
        self.score(&text).map(Some)
    }

    /// Classify a wire request
    pub fn classify_request(&self, request: &CompanyRequest) -> Result<Option<ClassificationResult>> {
        self.classify_parts(
            request.company.as_deref().unwrap_or_default(),
            request.ceo.as_deref().unwrap_or_default(),
            request.address.as_deref().unwrap_or_default(),
        )
    }

    fn score(&self, text: &str) -> Result<ClassificationResult> {
        let prob = self.scorer.probability(text)?;
        if !(0.0..=1.0).contains(&prob) {
            return Err(Error::classifier(format!(
                "{} produced probability {} outside [0, 1]",
                self.scorer.model_name(),
                prob
            )));
        }

        let verdict = if prob >= SUSPECT_THRESHOLD {
            Verdict::Positive
        } else {
            Verdict::Negative
        };

        Ok(ClassificationResult::new(verdict, LabelSet::COMPANY, prob)
            .with_input(text))
    }
}
