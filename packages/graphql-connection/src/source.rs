//! The capability a host type must provide to be paginated: a way to
//! identify records and two named operations, one counting records and one
//! fetching them.

use crate::{filter::Filter, sort::SortValue};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::{collections::BTreeSet, fmt, sync::Arc};

pub type Record = Value;

/// Fields a caller asked to read from each record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,
    Fields(BTreeSet<String>),
}

impl Projection {
    pub fn fields<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self::Fields(fields.into_iter().map(Into::into).collect())
    }

    /// Add fields to an explicit projection. `All` already covers them.
    pub fn with_fields(self, extra: &[String]) -> Self {
        match self {
            Self::All => Self::All,
            Self::Fields(mut fields) => {
                fields.extend(extra.iter().cloned());
                Self::Fields(fields)
            }
        }
    }

    /// Keep only the projected fields of an object record.
    pub fn apply(&self, record: &Record) -> Record {
        match (self, record) {
            (Self::Fields(fields), Value::Object(object)) => Value::Object(
                object
                    .iter()
                    .filter(|(key, _)| fields.contains(key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
            _ => record.clone(),
        }
    }
}

/// Parameters of a single call to a count or find-many operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchParams {
    pub filter: Option<Filter>,
    pub sort: Option<SortValue>,
    pub skip: u64,
    pub limit: Option<u64>,
    pub projection: Projection,
}

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait CountOperation: Send + Sync {
    async fn count(&self, params: FetchParams) -> SourceResult<u64>;
}

#[async_trait]
pub trait FindManyOperation: Send + Sync {
    async fn find_many(&self, params: FetchParams) -> SourceResult<Vec<Record>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Count,
    FindMany,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::FindMany => write!(f, "find-many"),
        }
    }
}

#[derive(Clone)]
pub enum Operation {
    Count(Arc<dyn CountOperation>),
    FindMany(Arc<dyn FindManyOperation>),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Count(_) => OperationKind::Count,
            Self::FindMany(_) => OperationKind::FindMany,
        }
    }
}

/// Extracts the stable identifier of a record.
pub type IdExtractor = Arc<dyn Fn(&Record) -> Option<Value> + Send + Sync>;

/// Capability required of any type exposed through a connection.
pub trait SupportsPagination {
    fn type_name(&self) -> &str;
    fn id_extractor(&self) -> Option<IdExtractor>;
    fn count_operation(&self, name: &str) -> Option<Arc<dyn CountOperation>>;
    fn find_many_operation(&self, name: &str) -> Option<Arc<dyn FindManyOperation>>;
}

/// A host type assembled at runtime from named operations.
#[derive(Clone)]
pub struct SourceType {
    name: String,
    id_extractor: Option<IdExtractor>,
    operations: IndexMap<String, Operation>,
}

impl SourceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_extractor: None,
            operations: IndexMap::new(),
        }
    }

    pub fn with_id_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&Record) -> Option<Value> + Send + Sync + 'static,
    {
        self.id_extractor = Some(Arc::new(extractor));
        self
    }

    /// Identify records by the value of a single field.
    pub fn with_id_field(self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.with_id_extractor(move |record| record.get(&field).cloned())
    }

    pub fn with_count_operation(
        mut self,
        name: impl Into<String>,
        operation: Arc<dyn CountOperation>,
    ) -> Self {
        self.operations
            .insert(name.into(), Operation::Count(operation));
        self
    }

    pub fn with_find_many_operation(
        mut self,
        name: impl Into<String>,
        operation: Arc<dyn FindManyOperation>,
    ) -> Self {
        self.operations
            .insert(name.into(), Operation::FindMany(operation));
        self
    }
}

impl fmt::Debug for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceType")
            .field("name", &self.name)
            .field("id_extractor", &self.id_extractor.is_some())
            .field(
                "operations",
                &self
                    .operations
                    .iter()
                    .map(|(name, op)| (name.as_str(), op.kind()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SupportsPagination for SourceType {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn id_extractor(&self) -> Option<IdExtractor> {
        self.id_extractor.clone()
    }

    fn count_operation(&self, name: &str) -> Option<Arc<dyn CountOperation>> {
        match self.operations.get(name)? {
            Operation::Count(op) => Some(op.clone()),
            _ => None,
        }
    }

    fn find_many_operation(&self, name: &str) -> Option<Arc<dyn FindManyOperation>> {
        match self.operations.get(name)? {
            Operation::FindMany(op) => Some(op.clone()),
            _ => None,
        }
    }
}
