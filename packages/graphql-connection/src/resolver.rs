//! The connection resolver.
//!
//! Translates `first`/`last`/`after`/`before`/`sort` into the parameters of a
//! single find-many call, over-fetching by one record to detect whether more
//! records follow, and shapes the result into edges and page info.
//! See: https://relay.dev/graphql/connections.htm

use crate::{
    cursor::{self, Cursor},
    filter::Filter,
    sort::{CursorBound, SortOptions, SortStrategy},
    source::{
        CountOperation, FetchParams, FindManyOperation, IdExtractor, OperationKind,
        Projection, Record, SupportsPagination,
    },
    ConfigurationError, ConnectionError, ConnectionResult,
};
use graphql_connection_lib::config::{ConnectionConfig, PagingConfig};
use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::{debug, info, trace};

/// Arguments of one pagination request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaginationArgs {
    pub first: Option<i64>,
    pub last: Option<i64>,
    pub after: Option<Cursor>,
    pub before: Option<Cursor>,
    pub sort: Option<String>,
    pub filter: Option<Filter>,
}

/// Parts of the connection the caller selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionProjection {
    pub count: bool,
    /// Fields requested from `edges.node`, if `edges` was selected at all.
    pub edges: Option<Projection>,
    pub page_info: bool,
}

impl Default for ConnectionProjection {
    fn default() -> Self {
        Self {
            count: true,
            edges: Some(Projection::All),
            page_info: true,
        }
    }
}

impl ConnectionProjection {
    fn fetches_records(&self) -> bool {
        self.edges.is_some() || self.page_info
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub cursor: Cursor,
    pub node: Record,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub start_cursor: Option<Cursor>,
    pub end_cursor: Option<Cursor>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Connection {
    /// Present only when the caller selected it.
    pub count: Option<u64>,
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
}

/// Page size and offset derived from `first` and `last`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u64,
    pub skip: u64,
}

impl PageWindow {
    /// `last` wins over `first` for the page size. When both are given and
    /// `first` is larger, the difference is skipped so the page ends where
    /// `first` records would have ended.
    ///
    /// A zero `first` or `last` counts as absent, so passing neither (or
    /// zeros) yields the configured default page size.
    pub fn new(first: Option<u64>, last: Option<u64>, paging: &PagingConfig) -> Self {
        let first = first.filter(|first| *first > 0);
        let last = last.filter(|last| *last > 0);
        let limit = match (first, last) {
            (_, Some(last)) => last,
            (Some(first), None) => first,
            (None, None) => paging.default_limit,
        };
        let limit = match paging.max_limit {
            Some(max) => limit.min(max),
            None => limit,
        };
        let skip = match (first, last) {
            (Some(first), Some(last)) => first.saturating_sub(last),
            _ => 0,
        };
        Self { limit, skip }
    }
}

/// Everything the resolver is about to ask of the data source.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchPlan {
    pub window: PageWindow,
    /// `None` when neither edges nor page info were selected.
    pub find: Option<FetchParams>,
    /// `None` when the count was not selected.
    pub count: Option<FetchParams>,
}

pub struct ConnectionResolver {
    type_name: String,
    id_extractor: IdExtractor,
    count: Arc<dyn CountOperation>,
    find_many: Arc<dyn FindManyOperation>,
    sort_options: SortOptions,
    paging: PagingConfig,
}

impl fmt::Debug for ConnectionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionResolver")
            .field("type_name", &self.type_name)
            .field("sort_options", &self.sort_options.names().collect::<Vec<_>>())
            .field("paging", &self.paging)
            .finish()
    }
}

impl ConnectionResolver {
    /// Wire a connection onto `host`, failing if it lacks an identifier
    /// extractor or either of the configured operations.
    pub fn new<T: SupportsPagination + ?Sized>(
        host: &T,
        sort_options: SortOptions,
        config: &ConnectionConfig,
    ) -> ConnectionResult<Self> {
        let type_name = host.type_name().to_string();
        let operations = &config.operations;

        let id_extractor = host
            .id_extractor()
            .ok_or_else(|| ConfigurationError::MissingIdExtractor(type_name.clone()))?;

        let count = host
            .count_operation(&operations.count_resolver_name)
            .ok_or_else(|| ConfigurationError::MissingOperation {
                type_name: type_name.clone(),
                kind: OperationKind::Count,
                name: operations.count_resolver_name.clone(),
            })?;

        let find_many = host
            .find_many_operation(&operations.find_resolver_name)
            .ok_or_else(|| ConfigurationError::MissingOperation {
                type_name: type_name.clone(),
                kind: OperationKind::FindMany,
                name: operations.find_resolver_name.clone(),
            })?;

        if sort_options.is_empty() {
            return Err(ConfigurationError::NoSortOptions.into());
        }

        info!(
            "Connection for {type_name} uses {} and {} with {} sort option(s).",
            operations.count_resolver_name,
            operations.find_resolver_name,
            sort_options.len()
        );

        Ok(Self {
            type_name,
            id_extractor,
            count,
            find_many,
            sort_options,
            paging: config.paging.clone(),
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn sort_options(&self) -> &SortOptions {
        &self.sort_options
    }

    /// Identifier of a record, as reported by the host type.
    pub fn node_id(&self, record: &Record) -> Option<Value> {
        (self.id_extractor)(record)
    }

    /// Compute the count and find-many parameters for a request without
    /// calling the data source.
    pub fn plan(
        &self,
        args: &PaginationArgs,
        projection: &ConnectionProjection,
    ) -> ConnectionResult<FetchPlan> {
        let sort = self.sort_options.resolve(args.sort.as_deref())?;
        self.plan_for(sort, args, projection)
    }

    fn plan_for(
        &self,
        sort: &SortStrategy,
        args: &PaginationArgs,
        projection: &ConnectionProjection,
    ) -> ConnectionResult<FetchPlan> {
        let first = non_negative("first", args.first)?;
        let last = non_negative("last", args.last)?;
        let window = PageWindow::new(first, last, &self.paging);

        let count = projection.count.then(|| FetchParams {
            filter: args.filter.clone(),
            ..FetchParams::default()
        });

        let find = projection.fetches_records().then(|| {
            let filter = cursor_filter(sort, args);
            let node_projection = projection
                .edges
                .clone()
                .unwrap_or_else(|| Projection::fields(Vec::<String>::new()))
                .with_fields(sort.unique_fields());
            FetchParams {
                filter,
                sort: Some(sort.sort_value().clone()),
                skip: window.skip,
                limit: Some(window.limit.saturating_add(1)),
                projection: node_projection,
            }
        });

        Ok(FetchPlan {
            window,
            find,
            count,
        })
    }

    /// Resolve one page of the connection.
    ///
    /// The count, when selected, runs concurrently with the find and is joined
    /// only when the connection is assembled. Failures of either operation are
    /// returned as [`ConnectionError::Source`].
    pub async fn resolve(
        &self,
        args: PaginationArgs,
        projection: &ConnectionProjection,
    ) -> ConnectionResult<Connection> {
        let sort = self.sort_options.resolve(args.sort.as_deref())?;
        let FetchPlan {
            window,
            find,
            count,
        } = self.plan_for(sort, &args, projection)?;

        debug!(
            "Resolving {} connection: limit={}, skip={}, find={find:?}, count={count:?}",
            self.type_name, window.limit, window.skip
        );

        let count_fut = async {
            match count {
                Some(params) => self.count.count(params).await.map(Some),
                None => Ok(None),
            }
        };
        let find_fut = async {
            match find {
                Some(params) => self.find_many.find_many(params).await.map(Some),
                None => Ok(None),
            }
        };

        let (records, count) = futures::try_join!(find_fut, count_fut)?;

        let (edges, page_info) = match records {
            Some(records) => self.page(records, window, sort),
            None => (Vec::new(), PageInfo::default()),
        };

        Ok(Connection {
            count,
            edges,
            page_info,
        })
    }

    fn page(
        &self,
        mut records: Vec<Record>,
        window: PageWindow,
        sort: &SortStrategy,
    ) -> (Vec<Edge>, PageInfo) {
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);

        let mut has_next_page = false;
        if records.len() > limit {
            has_next_page = true;
            // Drops the over-fetched record and the one before it.
            records.truncate(limit.saturating_sub(1));
        }
        let has_previous_page = window.skip > 0;

        let edges = records
            .into_iter()
            .map(|node| {
                let data = cursor::cursor_data(&node, sort.unique_fields());
                trace!("{} edge for node {:?}", self.type_name, self.node_id(&node));
                Edge {
                    cursor: cursor::encode(&data),
                    node,
                }
            })
            .collect::<Vec<_>>();

        let page_info = match (edges.first(), edges.last()) {
            (Some(start), Some(end)) => PageInfo {
                start_cursor: Some(start.cursor.clone()),
                end_cursor: Some(end.cursor.clone()),
                has_previous_page,
                has_next_page,
            },
            _ => PageInfo::default(),
        };

        (edges, page_info)
    }
}

fn non_negative(name: &str, value: Option<i64>) -> ConnectionResult<Option<u64>> {
    value
        .map(|value| {
            u64::try_from(value).map_err(|_| {
                ConnectionError::InvalidPaginationArgs(format!(
                    "`{name}` must be non-negative, got {value}"
                ))
            })
        })
        .transpose()
}

fn cursor_filter(sort: &SortStrategy, args: &PaginationArgs) -> Option<Filter> {
    let mut filter = args.filter.clone();
    for (bound, cursor) in [
        (CursorBound::After, args.after.as_deref()),
        (CursorBound::Before, args.before.as_deref()),
    ] {
        let Some(data) = cursor::decode(cursor) else {
            continue;
        };
        // A cursor from another sort order carries no position under this one.
        if let Some(missing) = sort
            .unique_fields()
            .iter()
            .find(|field| !data.contains_key(field.as_str()))
        {
            debug!("Ignoring {bound:?} cursor without sort field {missing:?}");
            continue;
        }
        filter = Some(sort.cursor_to_filter(bound, &data, filter));
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cursor::CursorData, filter::CompareOp, sort::KeysetSort,
        testing::memory_source_type,
    };
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn paging(default_limit: u64, max_limit: Option<u64>) -> PagingConfig {
        PagingConfig {
            default_limit,
            max_limit,
        }
    }

    fn resolver() -> ConnectionResolver {
        let (source_type, _) = memory_source_type("User", vec![]);
        let options = SortOptions::new()
            .with_option("ID_ASC", KeysetSort::asc("id"))
            .unwrap();
        ConnectionResolver::new(&source_type, options, &ConnectionConfig::default())
            .unwrap()
    }

    #[test]
    fn test_page_window_limit_and_skip() {
        let paging = paging(20, None);

        assert_eq!(
            PageWindow::new(None, None, &paging),
            PageWindow { limit: 20, skip: 0 }
        );
        assert_eq!(
            PageWindow::new(Some(2), None, &paging),
            PageWindow { limit: 2, skip: 0 }
        );
        assert_eq!(
            PageWindow::new(None, Some(3), &paging),
            PageWindow { limit: 3, skip: 0 }
        );
        assert_eq!(
            PageWindow::new(Some(2), Some(1), &paging),
            PageWindow { limit: 1, skip: 1 }
        );
        assert_eq!(
            PageWindow::new(Some(1), Some(3), &paging),
            PageWindow { limit: 3, skip: 0 }
        );
        assert_eq!(
            PageWindow::new(Some(4), Some(0), &paging),
            PageWindow { limit: 4, skip: 0 }
        );
    }

    #[test]
    fn test_page_window_zero_counts_as_absent() {
        let paging = paging(20, None);

        assert_eq!(
            PageWindow::new(Some(0), None, &paging),
            PageWindow { limit: 20, skip: 0 }
        );
        assert_eq!(
            PageWindow::new(None, Some(0), &paging),
            PageWindow { limit: 20, skip: 0 }
        );
        assert_eq!(
            PageWindow::new(Some(0), Some(0), &paging),
            PageWindow { limit: 20, skip: 0 }
        );
        assert_eq!(
            PageWindow::new(Some(0), Some(3), &paging),
            PageWindow { limit: 3, skip: 0 }
        );
    }

    #[test]
    fn test_page_window_respects_max_limit() {
        assert_eq!(
            PageWindow::new(Some(500), None, &paging(20, Some(100))),
            PageWindow {
                limit: 100,
                skip: 0
            }
        );
        assert_eq!(
            PageWindow::new(None, None, &paging(20, Some(10))),
            PageWindow { limit: 10, skip: 0 }
        );
    }

    #[test]
    fn test_plan_over_fetches_by_one() {
        let plan = resolver()
            .plan(
                &PaginationArgs {
                    first: Some(2),
                    ..PaginationArgs::default()
                },
                &ConnectionProjection::default(),
            )
            .unwrap();

        let find = plan.find.unwrap();
        assert_eq!(find.limit, Some(3));
        assert_eq!(find.skip, 0);
        assert_eq!(find.filter, None);
        assert_eq!(find.sort, Some(KeysetSort::asc("id").sort_value().clone()));
        assert_eq!(plan.count, Some(FetchParams::default()));
    }

    #[test]
    fn test_plan_adds_unique_fields_to_projection() {
        let projection = ConnectionProjection {
            count: false,
            edges: Some(Projection::fields(["name"])),
            page_info: false,
        };
        let plan = resolver()
            .plan(&PaginationArgs::default(), &projection)
            .unwrap();

        assert_eq!(
            plan.find.unwrap().projection,
            Projection::fields(["id", "name"])
        );
        assert_eq!(plan.count, None);
    }

    #[test]
    fn test_plan_count_ignores_cursors() {
        let after = cursor::encode(&CursorData::from([("id".to_string(), json!(3))]));
        let user = Filter::Raw(json!({ "kind": "a" }));
        let plan = resolver()
            .plan(
                &PaginationArgs {
                    after: Some(after),
                    filter: Some(user.clone()),
                    ..PaginationArgs::default()
                },
                &ConnectionProjection::default(),
            )
            .unwrap();

        assert_eq!(plan.count.unwrap().filter, Some(user.clone()));
        assert_eq!(
            plan.find.unwrap().filter,
            Some(Filter::And(vec![
                user,
                Filter::compare("id", CompareOp::Gt, json!(3)),
            ]))
        );
    }

    #[test]
    fn test_plan_ignores_malformed_cursor() {
        let plan = resolver()
            .plan(
                &PaginationArgs {
                    after: Some("not a cursor".to_string()),
                    ..PaginationArgs::default()
                },
                &ConnectionProjection::default(),
            )
            .unwrap();

        assert_eq!(plan.find.unwrap().filter, None);
    }

    #[test]
    fn test_plan_ignores_cursor_from_another_sort() {
        let before = cursor::encode(&CursorData::from([(
            "name".to_string(),
            json!("user3"),
        )]));
        let plan = resolver()
            .plan(
                &PaginationArgs {
                    before: Some(before),
                    ..PaginationArgs::default()
                },
                &ConnectionProjection::default(),
            )
            .unwrap();

        assert_eq!(plan.find.unwrap().filter, None);
    }

    #[test]
    fn test_plan_count_only_skips_find() {
        let projection = ConnectionProjection {
            count: true,
            edges: None,
            page_info: false,
        };
        let plan = resolver()
            .plan(&PaginationArgs::default(), &projection)
            .unwrap();

        assert!(plan.find.is_none());
        assert!(plan.count.is_some());
    }

    #[test]
    fn test_plan_rejects_negative_arguments() {
        let result = resolver().plan(
            &PaginationArgs {
                last: Some(-1),
                ..PaginationArgs::default()
            },
            &ConnectionProjection::default(),
        );

        assert_matches!(result, Err(ConnectionError::InvalidPaginationArgs(_)));
    }
}
