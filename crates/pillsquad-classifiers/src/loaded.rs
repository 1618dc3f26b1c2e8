//! The set of classifiers a process serves, loaded once at startup

use crate::company::CompanyOriginClassifier;
use crate::config::ModelsConfig;
use crate::image::ProductImageClassifier;
use crate::ingredient::IngredientRiskClassifier;
use pillsquad_core::Result;
use std::sync::Arc;

/// Loaded adapters; `None` marks a model that was not configured
#[derive(Clone, Default)]
pub struct LoadedClassifiers {
    pub ingredient: Option<Arc<IngredientRiskClassifier>>,
    pub company: Option<Arc<CompanyOriginClassifier>>,
    pub image: Option<Arc<ProductImageClassifier>>,
}

impl LoadedClassifiers {
    /// Load every configured model; any configured model that fails is an error
    pub fn load(config: &ModelsConfig) -> Result<Self> {
        let mut loaded = Self::default();

        if let Some(ingredient) = &config.ingredient {
            let clf = IngredientRiskClassifier::from_files(
                ingredient.vectorizer.resolve_path()?,
                ingredient.forest.resolve_path()?,
            )?;
            tracing::info!("ingredient classifier loaded");
            loaded.ingredient = Some(Arc::new(clf));
        }

        if config.company.is_some() || config.image.is_some() {
            loaded.load_neural(config)?;
        }

        if loaded.is_empty() {
            tracing::warn!("no models configured; prediction endpoints will return 503");
        }

        Ok(loaded)
    }

    #[cfg(feature = "ml-models")]
    fn load_neural(&mut self, config: &ModelsConfig) -> Result<()> {
        use crate::bert::BertScorer;
        use crate::model_loader::create_device;
        use crate::resnet::ResNetModel;

        let device = create_device(config.device, config.device_index)?;

        if let Some(company) = &config.company {
            let scorer = BertScorer::load(company, &device)?;
            self.company = Some(Arc::new(CompanyOriginClassifier::new(Arc::new(scorer))));
        }

        if let Some(image) = &config.image {
            let model = ResNetModel::load(image, &device)?;
            self.image = Some(Arc::new(ProductImageClassifier::new(Arc::new(model))));
        }

        Ok(())
    }

    #[cfg(not(feature = "ml-models"))]
    fn load_neural(&mut self, _config: &ModelsConfig) -> Result<()> {
        Err(pillsquad_core::Error::config(
            "company and image models require the 'ml-models' feature",
        ))
    }

    pub fn with_ingredient(mut self, clf: IngredientRiskClassifier) -> Self {
        self.ingredient = Some(Arc::new(clf));
        self
    }

    pub fn with_company(mut self, clf: CompanyOriginClassifier) -> Self {
        self.company = Some(Arc::new(clf));
        self
    }

    pub fn with_image(mut self, clf: ProductImageClassifier) -> Self {
        self.image = Some(Arc::new(clf));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ingredient.is_none() && self.company.is_none() && self.image.is_none()
    }
}
