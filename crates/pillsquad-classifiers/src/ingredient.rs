//! Ingredient / company-name risk classifier
//!
//! Flags sellers whose ingredient list and company name resemble previously
//! reported (신고) sellers. Text is vectorized with the exported TF-IDF
//! vectorizer and scored by the exported random forest.

use crate::classifier::{ClassificationResult, LabelSet, Verdict};
use crate::forest::RandomForest;
use crate::vectorizer::TfidfVectorizer;
use pillsquad_core::{Error, Result};
use std::path::Path;

/// Decision threshold on the positive-class probability (exclusive)
const POSITIVE_THRESHOLD: f32 = 0.5;

pub struct IngredientRiskClassifier {
    vectorizer: TfidfVectorizer,
    forest: RandomForest,
}

impl IngredientRiskClassifier {
    pub fn new(vectorizer: TfidfVectorizer, forest: RandomForest) -> Result<Self> {
        forest.validate()?;
        if forest.n_classes != 2 {
            return Err(Error::data_load(format!(
                "ingredient classifier expects a binary forest, got {} classes",
                forest.n_classes
            )));
        }
        Ok(Self {
            vectorizer,
            forest,
        })
    }

    /// Load both exported artifacts
    pub fn from_files(vectorizer: impl AsRef<Path>, forest: impl AsRef<Path>) -> Result<Self> {
        Self::new(
            TfidfVectorizer::from_file(vectorizer)?,
            RandomForest::from_file(forest)?,
        )
    }

    /// Text fed to the vectorizer: ingredients then company name, space-joined
    pub fn compose_input(ingredients: &[String], company_name: &str) -> String {
        ingredients
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(company_name))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Classify a seller from its ingredient list and company name
    pub fn classify_request(
        &self,
        ingredients: Option<&[String]>,
        company_name: Option<&str>,
    ) -> Result<ClassificationResult> {
        let ingredients = ingredients.unwrap_or_default();
        let company_name = company_name.unwrap_or_default();

        if ingredients.is_empty() && company_name.is_empty() {
            return Err(Error::invalid_input(
                "ingredients 또는 company_name 중 하나 이상 입력해주세요.",
            ));
        }

        let text = Self::compose_input(ingredients, company_name);
        self.score(&text)
    }

    fn score(&self, text: &str) -> Result<ClassificationResult> {
        let features = self.vectorizer.transform(text);
        let proba = self.forest.predict_proba(&features)?;
        let p_positive = proba[1];

        let (verdict, p_label) = if p_positive > POSITIVE_THRESHOLD {
            (Verdict::Positive, p_positive)
        } else {
            (Verdict::Negative, proba[0])
        };

        tracing::debug!(text, p_positive, "ingredient risk scored");

        Ok(ClassificationResult::new(verdict, LabelSet::INGREDIENT, round4(p_label))
            .with_input(text))
    }
}

/// Round to four decimal places
pub fn round4(value: f32) -> f32 {
    ((f64::from(value) * 10_000.0).round() / 10_000.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::DecisionTree;
    use crate::vectorizer::{Norm, VectorizerSpec};

    /// Vocabulary of two terms; the forest flags any text containing "위험원료"
    fn classifier() -> IngredientRiskClassifier {
        let vectorizer = TfidfVectorizer::new(VectorizerSpec {
            vocabulary: [("위험원료".to_string(), 0), ("코스맥스".to_string(), 1)]
                .into_iter()
                .collect(),
            idf: None,
            lowercase: true,
            ngram_range: (1, 1),
            norm: Norm::None,
            sublinear_tf: false,
        })
        .unwrap();

        let forest = RandomForest {
            n_classes: 2,
            trees: vec![DecisionTree {
                children_left: vec![1, -1, -1],
                children_right: vec![2, -1, -1],
                feature: vec![0, -2, -2],
                threshold: vec![0.5, -2.0, -2.0],
                value: vec![vec![5.0, 5.0], vec![7.0, 3.0], vec![1.0, 9.0]],
            }],
        };

        IngredientRiskClassifier::new(vectorizer, forest).unwrap()
    }

    #[test]
    fn test_malformed_forest_is_rejected_at_construction() {
        let vectorizer = TfidfVectorizer::new(VectorizerSpec {
            vocabulary: [("위험원료".to_string(), 0)].into_iter().collect(),
            idf: None,
            lowercase: true,
            ngram_range: (1, 1),
            norm: Norm::None,
            sublinear_tf: false,
        })
        .unwrap();
        let forest = RandomForest {
            n_classes: 2,
            trees: vec![DecisionTree {
                children_left: vec![1, -1],
                children_right: vec![-1, -1],
                feature: vec![0, -2],
                threshold: vec![0.5, -2.0],
                value: vec![vec![1.0, 1.0], vec![1.0, 0.0]],
            }],
        };

        let err = IngredientRiskClassifier::new(vectorizer, forest).err().unwrap();
        assert!(matches!(err, Error::DataLoad(_)));
    }

    #[test]
    fn test_compose_input() {
        let text = IngredientRiskClassifier::compose_input(
            &["은행잎추출물".to_string()],
            "코스맥스",
        );
        assert_eq!(text, "은행잎추출물 코스맥스");

        let text = IngredientRiskClassifier::compose_input(
            &["a".to_string(), "b".to_string()],
            "",
        );
        assert_eq!(text, "a b ");
    }

    #[test]
    fn test_empty_request_is_invalid_input() {
        let clf = classifier();
        let err = clf.classify_request(None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = clf.classify_request(Some(&[]), Some("")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_scenario_ginkgo_cosmax() {
        let clf = classifier();
        let ingredients = vec!["은행잎추출물".to_string()];

        let result = clf
            .classify_request(Some(&ingredients), Some("코스맥스"))
            .unwrap();
        assert_eq!(result.input.as_deref(), Some("은행잎추출물 코스맥스"));
        assert!(["신고업체", "정상업체"].contains(&result.label.as_str()));
        assert!((0.5..=1.0).contains(&result.score));
        assert_eq!(result.label, "정상업체");
        assert_eq!(result.score, 0.7);
    }

    #[test]
    fn test_positive_label_confidence_is_positive_probability() {
        let clf = classifier();
        let ingredients = vec!["위험원료".to_string()];

        let result = clf.classify_request(Some(&ingredients), None).unwrap();
        assert_eq!(result.verdict, Verdict::Positive);
        assert_eq!(result.label, "신고업체");
        assert_eq!(result.score, 0.9);
    }

    #[test]
    fn test_company_name_only() {
        let clf = classifier();
        let result = clf.classify_request(None, Some("코스맥스")).unwrap();
        assert_eq!(result.input.as_deref(), Some("코스맥스"));
        assert!(result.score >= 0.5);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.5), 0.5);
    }
}
