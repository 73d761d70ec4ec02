//! Postal address domain types.
//!
//! Three shapes of the same record:
//!
//! - [`AddressDraft`] - raw client input for a new address; every field optional
//! - [`NewAddress`] - a draft that passed validation and is ready to insert
//! - [`AddressChanges`] - a partial update; only supplied fields are applied
//!
//! [`Address`] is the stored record. None of the input types carry an id,
//! owner, or timestamps: those are server-managed, and any such keys in a
//! request body are dropped during deserialization.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::id::{AddressId, UserId};

/// A stored postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// User who owns this address.
    pub owner_id: UserId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Whether this is the owner's preferred address.
    pub is_default: bool,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
    /// When the address was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// Apply a set of changes in place.
    ///
    /// Does not touch `updated_at`; the store owns timestamps.
    pub fn apply(&mut self, changes: &AddressChanges) {
        if let Some(street) = &changes.street {
            self.street.clone_from(street);
        }
        if let Some(city) = &changes.city {
            self.city.clone_from(city);
        }
        if let Some(state) = &changes.state {
            self.state.clone_from(state);
        }
        if let Some(postal_code) = &changes.postal_code {
            self.postal_code.clone_from(postal_code);
        }
        if let Some(latitude) = changes.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = changes.longitude {
            self.longitude = longitude;
        }
        if let Some(is_default) = changes.is_default {
            self.is_default = is_default;
        }
    }
}

/// Fields every address must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Street,
    City,
    State,
    PostalCode,
}

impl RequiredField {
    /// Field name as it appears in the JSON API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postalCode",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced when address input fails validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields were absent or blank.
    #[error("Missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<RequiredField>),
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Client input for a new address, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_default: Option<bool>,
}

impl AddressDraft {
    /// Validate the draft, trimming text fields.
    ///
    /// A field that is empty after trimming counts as missing. All missing
    /// fields are reported at once, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingFields` if any required field is
    /// absent or blank.
    pub fn validate(self) -> Result<NewAddress, ValidationError> {
        let mut missing = Vec::new();

        let street = required(self.street, RequiredField::Street, &mut missing);
        let city = required(self.city, RequiredField::City, &mut missing);
        let state = required(self.state, RequiredField::State, &mut missing);
        let postal_code = required(self.postal_code, RequiredField::PostalCode, &mut missing);

        match (street, city, state, postal_code) {
            (Some(street), Some(city), Some(state), Some(postal_code)) => Ok(NewAddress {
                street,
                city,
                state,
                postal_code,
                latitude: self.latitude,
                longitude: self.longitude,
                is_default: self.is_default.unwrap_or(false),
            }),
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }
}

/// A validated address ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_default: bool,
}

/// A partial update to an address.
///
/// Coordinates are tri-state: absent leaves the stored value alone, an
/// explicit `null` clears it, and a number replaces it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressChanges {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub longitude: Option<Option<f64>>,
    pub is_default: Option<bool>,
}

impl AddressChanges {
    /// Returns `true` if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.is_default.is_none()
    }

    /// Trim supplied text fields and reject any that end up blank.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingFields` listing each supplied
    /// required field that was blank.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        let mut blank = Vec::new();

        self.street = supplied(self.street, RequiredField::Street, &mut blank);
        self.city = supplied(self.city, RequiredField::City, &mut blank);
        self.state = supplied(self.state, RequiredField::State, &mut blank);
        self.postal_code = supplied(self.postal_code, RequiredField::PostalCode, &mut blank);

        if blank.is_empty() {
            Ok(self)
        } else {
            Err(ValidationError::MissingFields(blank))
        }
    }
}

/// Distinguish an explicit `null` from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

fn trimmed(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

fn required(
    value: Option<String>,
    field: RequiredField,
    missing: &mut Vec<RequiredField>,
) -> Option<String> {
    let value = value.and_then(trimmed);
    if value.is_none() {
        missing.push(field);
    }
    value
}

fn supplied(
    value: Option<String>,
    field: RequiredField,
    blank: &mut Vec<RequiredField>,
) -> Option<String> {
    let value = value?;
    let value = trimmed(value);
    if value.is_none() {
        blank.push(field);
    }
    value
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_draft() -> AddressDraft {
        AddressDraft {
            street: Some("12 Harbour Rd".to_string()),
            city: Some("Portland".to_string()),
            state: Some("ME".to_string()),
            postal_code: Some("04101".to_string()),
            ..AddressDraft::default()
        }
    }

    #[test]
    fn test_draft_validates_and_defaults_is_default_to_false() {
        let address = full_draft().validate().unwrap();
        assert_eq!(address.street, "12 Harbour Rd");
        assert!(!address.is_default);
        assert_eq!(address.latitude, None);
    }

    #[test]
    fn test_draft_trims_text_fields() {
        let draft = AddressDraft {
            city: Some("  Portland \n".to_string()),
            ..full_draft()
        };
        assert_eq!(draft.validate().unwrap().city, "Portland");
    }

    #[test]
    fn test_draft_reports_every_missing_field() {
        let draft = AddressDraft {
            street: None,
            state: Some("   ".to_string()),
            postal_code: Some(String::new()),
            ..full_draft()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                RequiredField::Street,
                RequiredField::State,
                RequiredField::PostalCode,
            ])
        );
        assert_eq!(
            err.to_string(),
            "Missing required fields: street, state, postalCode"
        );
    }

    #[test]
    fn test_draft_ignores_server_managed_keys() {
        let draft: AddressDraft = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "ownerId": "someone-else",
            "userId": "someone-else",
            "createdAt": "2020-01-01T00:00:00Z",
            "street": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "postalCode": "62701",
            "isDefault": true,
            "latitude": 39.78
        }))
        .unwrap();
        let address = draft.validate().unwrap();
        assert!(address.is_default);
        assert_eq!(address.latitude, Some(39.78));
    }

    #[test]
    fn test_changes_distinguish_null_from_absent() {
        let changes: AddressChanges =
            serde_json::from_value(serde_json::json!({ "latitude": null })).unwrap();
        assert_eq!(changes.latitude, Some(None));
        assert_eq!(changes.longitude, None);
        assert!(!changes.is_empty());

        let changes: AddressChanges =
            serde_json::from_value(serde_json::json!({ "longitude": -70.25 })).unwrap();
        assert_eq!(changes.longitude, Some(Some(-70.25)));
    }

    #[test]
    fn test_changes_only_server_managed_keys_is_empty() {
        let changes: AddressChanges = serde_json::from_value(serde_json::json!({
            "id": "x",
            "ownerId": "y",
            "createdAt": "z",
            "updatedAt": "w"
        }))
        .unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_changes_reject_blank_required_field() {
        let changes = AddressChanges {
            city: Some(" ".to_string()),
            ..AddressChanges::default()
        };
        assert_eq!(
            changes.validate().unwrap_err(),
            ValidationError::MissingFields(vec![RequiredField::City])
        );
    }

    #[test]
    fn test_apply_changes_only_supplied_fields() {
        let now = Utc::now();
        let mut address = Address {
            id: AddressId::generate(),
            owner_id: UserId::generate(),
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            latitude: Some(39.78),
            longitude: Some(-89.65),
            is_default: false,
            created_at: now,
            updated_at: now,
        };

        address.apply(&AddressChanges {
            street: Some("2 Elm St".to_string()),
            latitude: Some(None),
            is_default: Some(true),
            ..AddressChanges::default()
        });

        assert_eq!(address.street, "2 Elm St");
        assert_eq!(address.city, "Springfield");
        assert_eq!(address.latitude, None);
        assert_eq!(address.longitude, Some(-89.65));
        assert!(address.is_default);
    }

    #[test]
    fn test_address_serializes_camel_case() {
        let now = Utc::now();
        let address = Address {
            id: AddressId::generate(),
            owner_id: UserId::generate(),
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            latitude: None,
            longitude: None,
            is_default: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["postalCode"], "62701");
        assert_eq!(json["isDefault"], true);
        assert_eq!(json["ownerId"], address.owner_id.to_string());
        assert!(json["latitude"].is_null());
    }
}
