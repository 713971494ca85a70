//! The twelve-field property description the price pipeline was trained on

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names as the pipeline was trained on them
pub mod columns {
    pub const PROPERTY_TYPE: &str = "property_type";
    pub const SECTOR: &str = "sector";
    pub const BEDROOMS: &str = "bedRoom";
    pub const BATHROOMS: &str = "bathroom";
    pub const BALCONY: &str = "balcony";
    pub const AGE_POSSESSION: &str = "agePossession";
    pub const BUILT_UP_AREA: &str = "built_up_area";
    pub const SERVANT_ROOM: &str = "servant room";
    pub const STORE_ROOM: &str = "store room";
    pub const FURNISHING_TYPE: &str = "furnishing_type";
    pub const LUXURY_CATEGORY: &str = "luxury_category";
    pub const FLOOR_CATEGORY: &str = "floor_category";

    pub const CATEGORICAL: [&str; 7] = [
        PROPERTY_TYPE,
        SECTOR,
        BALCONY,
        AGE_POSSESSION,
        FURNISHING_TYPE,
        LUXURY_CATEGORY,
        FLOOR_CATEGORY,
    ];

    pub const NUMERIC: [&str; 5] = [BEDROOMS, BATHROOMS, BUILT_UP_AREA, SERVANT_ROOM, STORE_ROOM];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Flat,
    House,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Flat => "flat",
            PropertyType::House => "house",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence flag for an extra room, encoded as 0 or 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct RoomFlag(bool);

impl RoomFlag {
    pub const YES: RoomFlag = RoomFlag(true);
    pub const NO: RoomFlag = RoomFlag(false);

    pub fn is_present(&self) -> bool {
        self.0
    }
}

impl TryFrom<f64> for RoomFlag {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 0.0 {
            Ok(RoomFlag(false))
        } else if value == 1.0 {
            Ok(RoomFlag(true))
        } else {
            Err(format!("room flag must be 0 or 1, got {}", value))
        }
    }
}

impl From<RoomFlag> for f64 {
    fn from(flag: RoomFlag) -> f64 {
        if flag.0 {
            1.0
        } else {
            0.0
        }
    }
}

impl From<bool> for RoomFlag {
    fn from(present: bool) -> Self {
        RoomFlag(present)
    }
}

/// Property description submitted for a price estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureRecord {
    pub property_type: PropertyType,
    pub sector: String,
    #[serde(rename = "bedRoom")]
    pub bedrooms: f64,
    #[serde(rename = "bathroom")]
    pub bathrooms: f64,
    /// Balcony bucket as trained ("0", "1", "2", "3", "3+")
    pub balcony: String,
    #[serde(rename = "agePossession")]
    pub age_possession: String,
    /// Built-up area in square feet
    pub built_up_area: f64,
    #[serde(rename = "servant room")]
    pub servant_room: RoomFlag,
    #[serde(rename = "store room")]
    pub store_room: RoomFlag,
    pub furnishing_type: String,
    pub luxury_category: String,
    pub floor_category: String,
}

impl FeatureRecord {
    /// Value of a categorical column
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            columns::PROPERTY_TYPE => Some(self.property_type.as_str()),
            columns::SECTOR => Some(&self.sector),
            columns::BALCONY => Some(&self.balcony),
            columns::AGE_POSSESSION => Some(&self.age_possession),
            columns::FURNISHING_TYPE => Some(&self.furnishing_type),
            columns::LUXURY_CATEGORY => Some(&self.luxury_category),
            columns::FLOOR_CATEGORY => Some(&self.floor_category),
            _ => None,
        }
    }

    /// Value of a numeric column (room flags as 0.0 / 1.0)
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            columns::BEDROOMS => Some(self.bedrooms),
            columns::BATHROOMS => Some(self.bathrooms),
            columns::BUILT_UP_AREA => Some(self.built_up_area),
            columns::SERVANT_ROOM => Some(self.servant_room.into()),
            columns::STORE_ROOM => Some(self.store_room.into()),
            _ => None,
        }
    }
}
