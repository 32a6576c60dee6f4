//! Sort strategies.
//!
//! A strategy knows three things about a sort order: which fields make a
//! record's position unique, how to turn a decoded cursor into a filter that
//! starts past (or stops before) that position, and what sort order to hand
//! to the data source.

use crate::{
    cursor::CursorData,
    filter::{compare_values, CompareOp, Filter},
    source::Record,
    ConfigurationError, ConnectionError, ConnectionResult,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{cmp::Ordering, fmt, sync::Arc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Concrete sort order passed to the find operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortValue(pub Vec<SortKey>);

impl SortValue {
    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    /// Order two records under this sort.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for key in self.keys() {
            let a = a.get(&key.field).unwrap_or(&Value::Null);
            let b = b.get(&key.field).unwrap_or(&Value::Null);
            let ordering = match key.direction {
                SortDirection::Asc => compare_values(a, b),
                SortDirection::Desc => compare_values(b, a),
            };
            if ordering.is_ne() {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Which side of a cursor the page lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorBound {
    After,
    Before,
}

/// Keyset pagination over an ordered list of sort keys.
///
/// The sort keys double as the unique fields, so the last key should be a
/// field that is unique on its own (usually the record identifier).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeysetSort {
    sort_value: SortValue,
    unique_fields: Vec<String>,
}

impl KeysetSort {
    pub fn new<I, F>(keys: I) -> Self
    where
        I: IntoIterator<Item = (F, SortDirection)>,
        F: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(|(field, direction)| SortKey::new(field, direction))
            .collect::<Vec<_>>();
        let unique_fields = keys.iter().map(|key| key.field.clone()).collect();
        Self {
            sort_value: SortValue(keys),
            unique_fields,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new([(field.into(), SortDirection::Asc)])
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new([(field.into(), SortDirection::Desc)])
    }

    pub fn sort_value(&self) -> &SortValue {
        &self.sort_value
    }

    /// Builds `(k1 > v1) OR (k1 = v1 AND k2 > v2) OR ...`, with each
    /// comparison flipped for descending keys and for `Before`.
    fn position_filter(&self, bound: CursorBound, data: &CursorData) -> Filter {
        let keys = self.sort_value.keys();
        let value_of = |key: &SortKey| data.get(&key.field).cloned().unwrap_or(Value::Null);

        let mut branches = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let op = match (bound, key.direction) {
                    (CursorBound::After, SortDirection::Asc)
                    | (CursorBound::Before, SortDirection::Desc) => CompareOp::Gt,
                    (CursorBound::After, SortDirection::Desc)
                    | (CursorBound::Before, SortDirection::Asc) => CompareOp::Lt,
                };
                let mut terms = keys[..i]
                    .iter()
                    .map(|prefix| {
                        Filter::compare(&prefix.field, CompareOp::Eq, value_of(prefix))
                    })
                    .collect::<Vec<_>>();
                terms.push(Filter::compare(&key.field, op, value_of(key)));
                match terms.len() {
                    1 => terms.remove(0),
                    _ => Filter::And(terms),
                }
            })
            .collect::<Vec<_>>();

        match branches.len() {
            1 => branches.remove(0),
            _ => Filter::Or(branches),
        }
    }
}

/// A sort order authored by the host instead of derived from sort keys.
pub trait CustomSort: Send + Sync + fmt::Debug {
    fn unique_fields(&self) -> &[String];
    fn cursor_to_filter(
        &self,
        bound: CursorBound,
        data: &CursorData,
        filter: Option<Filter>,
    ) -> Filter;
    fn sort_value(&self) -> &SortValue;
}

#[derive(Clone, Debug)]
pub enum SortStrategy {
    Keyset(KeysetSort),
    Custom(Arc<dyn CustomSort>),
}

impl SortStrategy {
    /// Fields that together give every record a unique position.
    pub fn unique_fields(&self) -> &[String] {
        match self {
            Self::Keyset(sort) => &sort.unique_fields,
            Self::Custom(sort) => sort.unique_fields(),
        }
    }

    /// Narrow `filter` to the records on the `bound` side of the cursor.
    pub fn cursor_to_filter(
        &self,
        bound: CursorBound,
        data: &CursorData,
        filter: Option<Filter>,
    ) -> Filter {
        match self {
            Self::Keyset(sort) => {
                Filter::intersect(filter, sort.position_filter(bound, data))
            }
            Self::Custom(sort) => sort.cursor_to_filter(bound, data, filter),
        }
    }

    pub fn sort_value(&self) -> &SortValue {
        match self {
            Self::Keyset(sort) => &sort.sort_value,
            Self::Custom(sort) => sort.sort_value(),
        }
    }
}

impl From<KeysetSort> for SortStrategy {
    fn from(sort: KeysetSort) -> Self {
        Self::Keyset(sort)
    }
}

/// Named sort options in declaration order. The first option is the default.
#[derive(Clone, Debug, Default)]
pub struct SortOptions {
    options: IndexMap<String, SortStrategy>,
}

impl SortOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(
        mut self,
        name: impl Into<String>,
        strategy: impl Into<SortStrategy>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if self.options.contains_key(&name) {
            return Err(ConfigurationError::DuplicateSortOption(name));
        }
        self.options.insert(name, strategy.into());
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn default_option(&self) -> Option<(&str, &SortStrategy)> {
        self.options
            .first()
            .map(|(name, strategy)| (name.as_str(), strategy))
    }

    /// Look up the named option, or the default one when no name is given.
    pub fn resolve(&self, name: Option<&str>) -> ConnectionResult<&SortStrategy> {
        match name {
            Some(name) => self
                .options
                .get(name)
                .ok_or_else(|| ConnectionError::UnknownSort(name.to_string())),
            None => self
                .default_option()
                .map(|(_, strategy)| strategy)
                .ok_or(ConnectionError::Configuration(
                    ConfigurationError::NoSortOptions,
                )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data(value: Value) -> CursorData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_key_after_and_before() {
        let sort = SortStrategy::from(KeysetSort::asc("id"));
        let cursor = data(json!({ "id": 3 }));

        assert_eq!(
            sort.cursor_to_filter(CursorBound::After, &cursor, None),
            Filter::compare("id", CompareOp::Gt, json!(3))
        );
        assert_eq!(
            sort.cursor_to_filter(CursorBound::Before, &cursor, None),
            Filter::compare("id", CompareOp::Lt, json!(3))
        );
    }

    #[test]
    fn test_descending_key_flips_comparison() {
        let sort = SortStrategy::from(KeysetSort::desc("id"));
        let cursor = data(json!({ "id": 3 }));

        assert_eq!(
            sort.cursor_to_filter(CursorBound::After, &cursor, None),
            Filter::compare("id", CompareOp::Lt, json!(3))
        );
    }

    #[test]
    fn test_compound_keys_build_lexicographic_filter() {
        let sort = SortStrategy::from(KeysetSort::new([
            ("age", SortDirection::Desc),
            ("id", SortDirection::Asc),
        ]));
        let cursor = data(json!({ "age": 30, "id": 7 }));

        assert_eq!(sort.unique_fields(), &["age".to_string(), "id".to_string()]);
        assert_eq!(
            sort.cursor_to_filter(CursorBound::After, &cursor, None),
            Filter::Or(vec![
                Filter::compare("age", CompareOp::Lt, json!(30)),
                Filter::And(vec![
                    Filter::compare("age", CompareOp::Eq, json!(30)),
                    Filter::compare("id", CompareOp::Gt, json!(7)),
                ]),
            ])
        );
    }

    #[test]
    fn test_after_then_before_intersects_bounds() {
        let sort = SortStrategy::from(KeysetSort::asc("id"));
        let user = Filter::Raw(json!({ "kind": "block" }));

        let filter = sort.cursor_to_filter(
            CursorBound::After,
            &data(json!({ "id": 2 })),
            Some(user.clone()),
        );
        let filter = sort.cursor_to_filter(
            CursorBound::Before,
            &data(json!({ "id": 6 })),
            Some(filter),
        );

        assert_eq!(
            filter,
            Filter::And(vec![
                user,
                Filter::compare("id", CompareOp::Gt, json!(2)),
                Filter::compare("id", CompareOp::Lt, json!(6)),
            ])
        );
        let inside = json!({ "id": 4, "kind": "block" });
        let outside = json!({ "id": 6, "kind": "block" });
        assert!(filter.matches(&inside));
        assert!(!filter.matches(&outside));
    }

    #[test]
    fn test_sort_value_compare() {
        let sort = KeysetSort::new([("age", SortDirection::Desc), ("id", SortDirection::Asc)]);
        let sort_value = SortStrategy::from(sort).sort_value().clone();

        let a = json!({ "age": 40, "id": 2 });
        let b = json!({ "age": 30, "id": 1 });
        let c = json!({ "age": 30, "id": 3 });

        assert_eq!(sort_value.compare(&a, &b), Ordering::Less);
        assert_eq!(sort_value.compare(&b, &c), Ordering::Less);
        assert_eq!(sort_value.compare(&c, &c), Ordering::Equal);
    }

    #[test]
    fn test_sort_options_default_and_lookup() {
        let options = SortOptions::new()
            .with_option("ID_ASC", KeysetSort::asc("id"))
            .unwrap()
            .with_option("ID_DESC", KeysetSort::desc("id"))
            .unwrap();

        assert_eq!(options.default_option().map(|(name, _)| name), Some("ID_ASC"));
        assert_eq!(
            options.names().collect::<Vec<_>>(),
            vec!["ID_ASC", "ID_DESC"]
        );
        assert_eq!(
            options.resolve(Some("ID_DESC")).unwrap().sort_value(),
            &KeysetSort::desc("id").sort_value
        );
        assert_matches!(
            options.resolve(Some("NAME_ASC")),
            Err(ConnectionError::UnknownSort(name)) if name == "NAME_ASC"
        );
    }

    #[test]
    fn test_sort_options_reject_duplicates() {
        let result = SortOptions::new()
            .with_option("ID_ASC", KeysetSort::asc("id"))
            .unwrap()
            .with_option("ID_ASC", KeysetSort::desc("id"));

        assert_matches!(result, Err(ConfigurationError::DuplicateSortOption(_)));
    }
}
