use serde::{Deserialize, Serialize};

/// One field of a partial update.
///
/// `Unchanged` is what a missing field deserializes into (together with
/// `#[serde(default)]`), while a present field always becomes `Set`. For a
/// nullable field use `FieldPatch<Option<T>>` where `Set(None)` clears the value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPatch<T> {
    Unchanged,
    Set(T),
}

impl<T> Default for FieldPatch<T> {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl<T> FieldPatch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(val) => Some(val),
            Self::Unchanged => None,
        }
    }

    /// Overwrites `target` if the field was set
    pub fn apply_to(self, target: &mut T) {
        if let Self::Set(val) = self {
            *target = val;
        }
    }
}

impl<T> From<Option<T>> for FieldPatch<T> {
    fn from(val: Option<T>) -> Self {
        match val {
            Some(val) => Self::Set(val),
            None => Self::Unchanged,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldPatch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::Set)
    }
}

impl<T: Serialize> Serialize for FieldPatch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Set(val) => val.serialize(serializer),
            Self::Unchanged => serializer.serialize_none(),
        }
    }
}
