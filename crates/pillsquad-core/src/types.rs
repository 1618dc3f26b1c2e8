//! Core types for PillSquad

use serde::{Deserialize, Serialize};

/// A product registered with the MFDS and the company that registered it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertifiedProductEntry {
    /// Registered product name
    pub product_name: String,

    /// Registered company (업소명)
    pub company_name: String,
}

impl CertifiedProductEntry {
    /// Create a new entry
    pub fn new(product_name: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            company_name: company_name.into(),
        }
    }
}

/// Request body for the ingredient/company-name risk classifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientRequest {
    /// Ingredient names used by the seller
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,

    /// Seller company name
    #[serde(default)]
    pub company_name: Option<String>,
}

impl IngredientRequest {
    /// Whether neither field carries any content
    pub fn is_empty(&self) -> bool {
        self.ingredients.as_ref().map_or(true, |i| i.is_empty())
            && self.company_name.as_deref().map_or(true, str::is_empty)
    }
}

/// Request body for the BERT company-origin classifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRequest {
    /// Company name
    #[serde(default)]
    pub company: Option<String>,

    /// Representative (CEO) name
    #[serde(default)]
    pub ceo: Option<String>,

    /// Registered address
    #[serde(default)]
    pub address: Option<String>,
}

impl CompanyRequest {
    /// Create a request from the three parts
    pub fn new(
        company: impl Into<String>,
        ceo: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            company: Some(company.into()),
            ceo: Some(ceo.into()),
            address: Some(address.into()),
        }
    }

    /// Whether every field is empty or absent
    pub fn is_empty(&self) -> bool {
        [&self.company, &self.ceo, &self.address]
            .iter()
            .all(|f| f.as_deref().map_or(true, str::is_empty))
    }
}

/// Response of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientPrediction {
    /// The combined text that was classified
    pub input: String,

    /// `신고업체` or `정상업체`
    pub prediction: String,

    /// Probability of the returned label, rounded to 4 decimals
    pub confidence: f64,
}

/// Response of `POST /predict-company`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPrediction {
    /// `의심` or `안심`
    pub label: String,

    /// Model probability of the suspect class
    pub probability: f64,
}

/// Response of `POST /classify-image`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVerdict {
    /// `Yes` or `No`
    pub result: String,
}

/// Structured error payload returned in place of a prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Result of extracting a page's text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// Visible page text, truncated to 2000 characters plus `...`
    pub page_text: String,

    /// Absolute image URLs in document order
    pub image_urls: Vec<String>,

    /// Certified products mentioned anywhere in the untruncated text
    pub certification_matches: Vec<CertifiedProductEntry>,
}
