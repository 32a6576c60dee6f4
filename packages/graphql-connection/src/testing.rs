//! An in-memory data source over JSON records, for tests and demos.

use crate::source::{
    CountOperation, FetchParams, FindManyOperation, Record, SourceResult, SourceType,
};
use async_trait::async_trait;
use graphql_connection_lib::defaults;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct MemorySource {
    records: Vec<Record>,
    find_calls: Mutex<Vec<FetchParams>>,
    count_calls: Mutex<Vec<FetchParams>>,
}

impl MemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Parameters of every find-many call so far.
    pub fn find_calls(&self) -> Vec<FetchParams> {
        self.find_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Parameters of every count call so far.
    pub fn count_calls(&self) -> Vec<FetchParams> {
        self.count_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn matching(&self, params: &FetchParams) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| {
                params
                    .filter
                    .as_ref()
                    .map_or(true, |filter| filter.matches(record))
            })
            .collect()
    }

    fn record_call(calls: &Mutex<Vec<FetchParams>>, params: &FetchParams) {
        if let Ok(mut calls) = calls.lock() {
            calls.push(params.clone());
        }
    }
}

#[async_trait]
impl CountOperation for MemorySource {
    async fn count(&self, params: FetchParams) -> SourceResult<u64> {
        Self::record_call(&self.count_calls, &params);
        Ok(self.matching(&params).len() as u64)
    }
}

#[async_trait]
impl FindManyOperation for MemorySource {
    async fn find_many(&self, params: FetchParams) -> SourceResult<Vec<Record>> {
        Self::record_call(&self.find_calls, &params);

        let mut records = self.matching(&params);
        if let Some(sort) = &params.sort {
            records.sort_by(|a, b| sort.compare(a, b));
        }

        let skip = usize::try_from(params.skip).unwrap_or(usize::MAX);
        let limit = params
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(records
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|record| params.projection.apply(record))
            .collect())
    }
}

/// A source type named `name` whose records are identified by their `id`
/// field, with count and find-many registered under the default names.
pub fn memory_source_type(
    name: impl Into<String>,
    records: Vec<Record>,
) -> (SourceType, Arc<MemorySource>) {
    let source = Arc::new(MemorySource::new(records));
    let source_type = SourceType::new(name)
        .with_id_field("id")
        .with_count_operation(defaults::COUNT_RESOLVER_NAME, source.clone())
        .with_find_many_operation(defaults::FIND_RESOLVER_NAME, source.clone());
    (source_type, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filter::{CompareOp, Filter},
        sort::{KeysetSort, SortStrategy},
        source::Projection,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_source_find_many() {
        let source = MemorySource::new(vec![
            json!({ "id": 3, "name": "c" }),
            json!({ "id": 1, "name": "a" }),
            json!({ "id": 2, "name": "b" }),
            json!({ "id": 4, "name": "d" }),
        ]);
        let sort = SortStrategy::from(KeysetSort::asc("id"));

        let found = source
            .find_many(FetchParams {
                filter: Some(Filter::compare("id", CompareOp::Gt, json!(1))),
                sort: Some(sort.sort_value().clone()),
                skip: 1,
                limit: Some(2),
                projection: Projection::fields(["id"]),
            })
            .await
            .unwrap();

        assert_eq!(found, vec![json!({ "id": 3 }), json!({ "id": 4 })]);
        assert_eq!(source.find_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_source_count() {
        let source = MemorySource::new(vec![
            json!({ "id": 1, "kind": "a" }),
            json!({ "id": 2, "kind": "b" }),
            json!({ "id": 3, "kind": "a" }),
        ]);

        let count = source
            .count(FetchParams {
                filter: Some(Filter::Raw(json!({ "kind": "a" }))),
                ..FetchParams::default()
            })
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(source.count_calls().len(), 1);
    }
}
