use serde::{Deserialize, Serialize};

/// One row of the listings dataset behind the market analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub property_type: String,
    pub sector: String,
    /// Price in crore rupees
    pub price: f64,
    pub price_per_sqft: f64,
    pub built_up_area: f64,
    #[serde(rename = "bedRoom")]
    pub bedrooms: f64,
    #[serde(rename = "bathroom")]
    pub bathrooms: f64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub luxury_score: Option<f64>,
    #[serde(default)]
    pub furnishing_type: Option<String>,
    #[serde(rename = "servant room", default)]
    pub servant_room: f64,
    #[serde(rename = "study room", default)]
    pub study_room: f64,
    #[serde(rename = "pooja room", default)]
    pub pooja_room: f64,
    #[serde(rename = "store room", default)]
    pub store_room: f64,
    #[serde(default)]
    pub others: f64,
}

/// Free-text amenity/feature description scraped for a sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureText {
    pub sector: String,
    pub feature: String,
}
