//! Loading the ingredient model from exported JSON artifacts

use pillsquad_classifiers::{LoadedClassifiers, ModelsConfig};
use std::fs;
use std::path::Path;

const VECTORIZER: &str = r#"{
  "vocabulary": { "은행잎추출물": 0, "코스맥스": 1, "시부트라민": 2 },
  "idf": [1.5, 1.2, 3.0],
  "ngram_range": [1, 1],
  "norm": "l2"
}"#;

// Two stumps on the 시부트라민 column; both flag a non-zero weight.
const FOREST: &str = r#"{
  "n_classes": 2,
  "trees": [
    {
      "children_left": [1, -1, -1],
      "children_right": [2, -1, -1],
      "feature": [2, -2, -2],
      "threshold": [0.1, -2.0, -2.0],
      "value": [[10.0, 10.0], [8.0, 2.0], [1.0, 9.0]]
    },
    {
      "children_left": [1, -1, -1],
      "children_right": [2, -1, -1],
      "feature": [2, -2, -2],
      "threshold": [0.2, -2.0, -2.0],
      "value": [[10.0, 10.0], [6.0, 4.0], [0.0, 10.0]]
    }
  ]
}"#;

fn write_artifacts(dir: &Path) -> ModelsConfig {
    fs::write(dir.join("vectorizer.json"), VECTORIZER).unwrap();
    fs::write(dir.join("forest.json"), FOREST).unwrap();

    let yaml = format!(
        "ingredient:\n  vectorizer: {{ path: {} }}\n  forest: {{ path: {} }}\n",
        dir.join("vectorizer.json").display(),
        dir.join("forest.json").display()
    );
    ModelsConfig::from_yaml(&yaml).unwrap()
}

#[test]
fn test_only_configured_models_are_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = LoadedClassifiers::load(&write_artifacts(dir.path())).unwrap();

    assert!(loaded.ingredient.is_some());
    assert!(loaded.company.is_none());
    assert!(loaded.image.is_none());
}

#[test]
fn test_benign_seller() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = LoadedClassifiers::load(&write_artifacts(dir.path())).unwrap();
    let clf = loaded.ingredient.unwrap();

    let ingredients = vec!["은행잎추출물".to_string()];
    let result = clf
        .classify_request(Some(&ingredients), Some("코스맥스"))
        .unwrap();

    assert_eq!(result.label, "정상업체");
    // mean of 0.8 and 0.6
    assert_eq!(result.score, 0.7);
    assert_eq!(result.input.as_deref(), Some("은행잎추출물 코스맥스"));
}

#[test]
fn test_reported_seller() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = LoadedClassifiers::load(&write_artifacts(dir.path())).unwrap();
    let clf = loaded.ingredient.unwrap();

    let ingredients = vec!["시부트라민".to_string(), "은행잎추출물".to_string()];
    let result = clf.classify_request(Some(&ingredients), None).unwrap();

    assert_eq!(result.label, "신고업체");
    assert_eq!(result.score, 0.95);
}

#[test]
fn test_forest_with_wrong_class_count_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(dir.path());
    fs::write(
        dir.path().join("forest.json"),
        FOREST.replace("\"n_classes\": 2", "\"n_classes\": 3"),
    )
    .unwrap();

    assert!(LoadedClassifiers::load(&config).is_err());
}
