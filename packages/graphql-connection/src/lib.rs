pub mod cursor;
pub mod filter;
pub mod resolver;
pub mod schema;
pub mod sort;
pub mod source;
pub mod testing;

pub use cursor::{Cursor, CursorData};
pub use filter::{CompareOp, Filter};
pub use resolver::{
    Connection, ConnectionProjection, ConnectionResolver, Edge, FetchPlan, PageInfo,
    PageWindow, PaginationArgs,
};
pub use sort::{
    CursorBound, CustomSort, KeysetSort, SortDirection, SortKey, SortOptions,
    SortStrategy, SortValue,
};
pub use source::{
    CountOperation, FetchParams, FindManyOperation, IdExtractor, Operation,
    OperationKind, Projection, Record, SourceError, SourceResult, SourceType,
    SupportsPagination,
};

use thiserror::Error;

pub type ConnectionResult<T> = Result<T, ConnectionError>;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("Invalid pagination arguments: {0}")]
    InvalidPaginationArgs(String),
    #[error("Unknown sort option: {0:?}")]
    UnknownSort(String),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors raised while wiring a connection onto a host type. These are fatal
/// and are reported before any query runs.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Type {0:?} does not provide a record identifier extractor")]
    MissingIdExtractor(String),
    #[error("Type {type_name:?} has no {kind} operation named {name:?}")]
    MissingOperation {
        type_name: String,
        kind: OperationKind,
        name: String,
    },
    #[error("A connection requires at least one sort option")]
    NoSortOptions,
    #[error("Sort option {0:?} is declared more than once")]
    DuplicateSortOption(String),
}
