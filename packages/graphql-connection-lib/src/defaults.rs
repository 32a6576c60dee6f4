/// Name of the count operation looked up on the host type.
pub const COUNT_RESOLVER_NAME: &str = "count";

/// Name of the find-many operation looked up on the host type.
pub const FIND_RESOLVER_NAME: &str = "findMany";

/// Page size used when neither `first` nor `last` is provided.
pub const DEFAULT_LIMIT: u64 = 20;

pub const LOG_LEVEL: &str = "info";

pub const VERBOSE_LOGGING: bool = false;
