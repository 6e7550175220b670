//! Tri-state field for partial updates.
//!
//! A JSON object key can be absent, present with `null`, or present with a
//! value. `Option<T>` collapses the first two, so update payloads use
//! `Patch<T>` together with `#[serde(default)]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Key absent: keep the stored value.
    Unset,
    /// Key present with `null`.
    Null,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            _ => None,
        }
    }

    /// For non-nullable fields: `Null` is rejected, `Unset` means "no change".
    pub fn into_required(self, field: &'static str) -> Result<Option<T>, ValidationError> {
        match self {
            Patch::Unset => Ok(None),
            Patch::Null => Err(ValidationError::new(field, "must not be null")),
            Patch::Set(v) => Ok(Some(v)),
        }
    }

    /// For nullable fields: `Some(None)` clears the value.
    pub fn into_nullable(self) -> Option<Option<T>> {
        match self {
            Patch::Unset => None,
            Patch::Null => Some(None),
            Patch::Set(v) => Some(Some(v)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}
