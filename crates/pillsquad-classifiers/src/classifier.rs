//! Verdict and result types shared by the classifiers

/// Binary outcome shared by every PillSquad classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The risky class: reported seller, suspect company, flagged image
    Positive,
    /// The benign class
    Negative,
}

/// Display labels for the two verdicts of one classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelSet {
    pub positive: &'static str,
    pub negative: &'static str,
}

impl LabelSet {
    /// Labels of the ingredient/company-name classifier
    pub const INGREDIENT: LabelSet = LabelSet {
        positive: "신고업체",
        negative: "정상업체",
    };

    /// Labels of the BERT company-origin classifier
    pub const COMPANY: LabelSet = LabelSet {
        positive: "의심",
        negative: "안심",
    };

    /// Labels of the product-image classifier
    pub const IMAGE: LabelSet = LabelSet {
        positive: "Yes",
        negative: "No",
    };

    /// Label for a verdict
    pub fn label(&self, verdict: Verdict) -> &'static str {
        match verdict {
            Verdict::Positive => self.positive,
            Verdict::Negative => self.negative,
        }
    }
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Binary verdict
    pub verdict: Verdict,

    /// Display label of the verdict
    pub label: String,

    /// Score in [0.0, 1.0]; its meaning is defined by each classifier
    pub score: f32,

    /// The text that was actually classified, when it was assembled from parts
    pub input: Option<String>,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(verdict: Verdict, labels: LabelSet, score: f32) -> Self {
        Self {
            verdict,
            label: labels.label(verdict).to_string(),
            score,
            input: None,
        }
    }

    /// Attach the classified text
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Whether the verdict is the risky class
    pub fn is_positive(&self) -> bool {
        self.verdict == Verdict::Positive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_sets() {
        assert_eq!(LabelSet::INGREDIENT.label(Verdict::Positive), "신고업체");
        assert_eq!(LabelSet::COMPANY.label(Verdict::Negative), "안심");
        assert_eq!(LabelSet::IMAGE.label(Verdict::Positive), "Yes");
    }

    #[test]
    fn test_result_builder() {
        let result = ClassificationResult::new(Verdict::Negative, LabelSet::IMAGE, 0.0)
            .with_input("x");
        assert_eq!(result.label, "No");
        assert_eq!(result.input.as_deref(), Some("x"));
        assert!(!result.is_positive());
    }
}
