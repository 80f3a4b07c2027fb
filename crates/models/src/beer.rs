use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Store-assigned beer identifier. Rendered as a bare integer on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeerId(pub u64);

impl core::fmt::Display for BeerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Beer style, serialized in its upper-case wire form (`"LAGER"`, `"IPA"`, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BeerType {
    Lager,
    Pilsen,
    Malte,
    Weiss,
    Other,
    Ipa,
    Stout,
}

/// Persisted stock record.
/// - `name` is unique across all records (case-sensitive exact match)
/// - `0 <= quantity <= max` holds at all times
/// - `id` and `created_at` are stamped by the store on insert
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Beer {
    pub id: BeerId,
    pub name: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub beer_type: BeerType,
    pub quantity: i64,
    pub max: i64,
    pub created_at: DateTime<Utc>,
}

/// Creation input model: no id/created_at, those are assigned server-side.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewBeer {
    pub name: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub beer_type: BeerType,
    pub quantity: i64,
    pub max: i64,
}

impl NewBeer {
    /// Shape validation: non-blank name/brand, positive capacity, quantity in bounds.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::Validation("name must not be blank".into()));
        }
        if self.brand.trim().is_empty() {
            return Err(ModelError::Validation("brand must not be blank".into()));
        }
        if self.max <= 0 {
            return Err(ModelError::Validation("max must be positive".into()));
        }
        if self.quantity < 0 || self.quantity > self.max {
            return Err(ModelError::Validation(format!(
                "quantity must be within 0..={}",
                self.max
            )));
        }
        Ok(())
    }

    /// Explicit input-to-entity conversion; the store supplies id and timestamp.
    pub fn into_beer(self, id: BeerId, created_at: DateTime<Utc>) -> Beer {
        Beer {
            id,
            name: self.name,
            brand: self.brand,
            beer_type: self.beer_type,
            quantity: self.quantity,
            max: self.max,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewBeer {
        NewBeer {
            name: "Brahma".into(),
            brand: "Ambev".into(),
            beer_type: BeerType::Lager,
            quantity: 10,
            max: 50,
        }
    }

    #[test]
    fn valid_input_passes() {
        input().validate().expect("valid");
    }

    #[test]
    fn blank_name_rejected() {
        let mut i = input();
        i.name = "   ".into();
        assert!(matches!(i.validate(), Err(ModelError::Validation(_))));
    }

    #[test]
    fn quantity_above_max_rejected() {
        let mut i = input();
        i.quantity = 51;
        assert!(matches!(i.validate(), Err(ModelError::Validation(_))));
    }

    #[test]
    fn quantity_equal_to_max_allowed() {
        let mut i = input();
        i.quantity = 50;
        i.validate().expect("boundary is valid");
    }

    #[test]
    fn non_positive_max_rejected() {
        let mut i = input();
        i.max = 0;
        assert!(i.validate().is_err());
    }

    #[test]
    fn beer_type_wire_form_is_upper_case() {
        let json = serde_json::to_string(&BeerType::Ipa).expect("serialize");
        assert_eq!(json, "\"IPA\"");
        let back: BeerType = serde_json::from_str("\"WEISS\"").expect("deserialize");
        assert_eq!(back, BeerType::Weiss);
    }

    #[test]
    fn beer_id_is_transparent_in_json() {
        let beer = input().into_beer(BeerId(7), chrono::Utc::now());
        let value = serde_json::to_value(&beer).expect("serialize");
        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], "LAGER");
    }
}
