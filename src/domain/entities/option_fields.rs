use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::ValidateLength;

/// Represents optional field semantics in partial update requests.
///
/// - `Unchanged` → key absent from the payload
/// - `SetToNull` → key present with `null`
/// - `SetToValue` → key present with a value
///
/// Fields of this type must carry `#[serde(default)]` so that an absent key
/// deserializes to `Unchanged`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionField<T> {
    #[default]
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<'de, T> Deserialize<'de> for OptionField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => OptionField::SetToValue(value),
            None => OptionField::SetToNull,
        })
    }
}

impl<T: Serialize> Serialize for OptionField<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OptionField::SetToValue(value) => serializer.serialize_some(value),
            _ => serializer.serialize_none(),
        }
    }
}

// ---------------------- Validation support ----------------------

impl<T> ValidateLength<u64> for OptionField<T>
where
    T: ValidateLength<u64>
{
    fn length(&self) -> Option<u64> {
        match self {
            OptionField::SetToValue(value) => value.length(),
            _ => None,
        }
    }
    fn validate_length(&self, min: Option<u64>, max: Option<u64>, equal: Option<u64>) -> bool {
        match self {
            OptionField::SetToValue(value) => value.validate_length(min, max, equal),
            _ => true,
        }
    }
}

// ---------------------- Core helpers ----------------------

impl<T> OptionField<T> {
    /// Borrowed nested option:
    /// - `None` → unchanged
    /// - `Some(None)` → set null
    /// - `Some(Some(&T))` → set to value
    pub fn as_ref_option(&self) -> Option<Option<&T>> {
        match self {
            Self::Unchanged => None,
            Self::SetToNull => Some(None),
            Self::SetToValue(value) => Some(Some(value)),
        }
    }

    /// Applies the patch to an existing nullable value.
    pub fn apply_to(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Unchanged => current,
            Self::SetToNull => None,
            Self::SetToValue(v) => Some(v),
        }
    }
}

pub type PatchString = OptionField<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct Patch {
        ward: PatchString,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.ward, OptionField::Unchanged);

        let null: Patch = serde_json::from_str(r#"{"ward": null}"#).unwrap();
        assert_eq!(null.ward, OptionField::SetToNull);

        let value: Patch = serde_json::from_str(r#"{"ward": "Ward 4"}"#).unwrap();
        assert_eq!(value.ward, OptionField::SetToValue("Ward 4".to_string()));
    }

    #[test]
    fn apply_to_respects_patch_state() {
        let current = Some("old".to_string());
        assert_eq!(PatchString::Unchanged.apply_to(current.clone()), current);
        assert_eq!(PatchString::SetToNull.apply_to(current.clone()), None);
        assert_eq!(
            PatchString::SetToValue("new".into()).apply_to(current),
            Some("new".to_string())
        );
    }

    #[test]
    fn length_only_checked_when_set() {
        assert!(PatchString::Unchanged.validate_length(Some(5), Some(10), None));
        assert!(!PatchString::SetToValue("abc".into()).validate_length(Some(5), Some(10), None));
    }
}
