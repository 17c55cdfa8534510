use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A list of strings stored as a JSON array column.
///
/// Used for the denormalised id lists (`customers.shop_ids`,
/// `shops.observer_ids`) and for `books.genre`.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl StringList {
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    /// Appends `value` unless already present. Returns whether the list changed.
    pub fn insert(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }
        self.0.push(value.to_string());
        true
    }

    /// Removes every occurrence of `value`. Returns whether the list changed.
    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|v| v != value);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for StringList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut list = StringList::default();
        assert!(list.insert("shop-1"));
        assert!(!list.insert("shop-1"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_drops_duplicates() {
        let mut list = StringList(vec!["a".into(), "b".into(), "a".into()]);
        assert!(list.remove("a"));
        assert_eq!(list, StringList(vec!["b".into()]));
        assert!(!list.remove("a"));
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let list = StringList(vec!["fantasy".into(), "poetry".into()]);
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"["fantasy","poetry"]"#);
    }
}
