//! PillSquad Classifiers
//!
//! Adapters around the three pretrained models used to screen supplement
//! sellers:
//! - Ingredient risk: TF-IDF features scored by a random forest (pure Rust)
//! - Company origin: BERT encoder with a dense sigmoid head (candle)
//! - Product image: ResNet-18 two-class classifier (candle)
//!
//! Each adapter delegates the numeric work to a small backend trait so the
//! surrounding logic can run against stub models.

pub mod classifier;
pub mod company;
pub mod config;
pub mod forest;
pub mod image;
pub mod ingredient;
pub mod loaded;
pub mod model_loader;
pub mod vectorizer;

#[cfg(feature = "ml-models")]
pub mod bert;
#[cfg(feature = "ml-models")]
pub mod resnet;

#[cfg(feature = "ml-models")]
pub use model_loader::create_device;

pub use classifier::{ClassificationResult, LabelSet, Verdict};
pub use company::{CompanyOriginClassifier, ProbabilityScorer};
pub use config::{
    Activation, CompanyModelConfig, ImageModelConfig, IngredientModelConfig, ModelsConfig,
};
pub use forest::{DecisionTree, RandomForest};
pub use image::{preprocess, ImageModel, ProductImageClassifier};
pub use ingredient::IngredientRiskClassifier;
pub use loaded::LoadedClassifiers;
pub use model_loader::{DeviceType, ModelFormat, ModelSource};
pub use vectorizer::{Norm, TfidfVectorizer, VectorizerSpec};
