use anyhow::{anyhow, Context as _, Result};
use async_graphql::dynamic::{Field, Object, Schema, TypeRef};
use clap::Parser;
use graphql_connection::{
    schema::*, testing::memory_source_type, ConnectionResolver, KeysetSort, Record,
    SortDirection, SortOptions,
};
use graphql_connection_lib::{
    config::{ConnectionArgs, ConnectionConfig},
    utils::init_logging,
};
use std::{collections::BTreeSet, fs, path::PathBuf, sync::Arc};
use tracing::info;

const NODE_NAME: &str = "Record";
const FIELD_NAME: &str = "records";

#[derive(Debug, Parser)]
#[clap(
    name = "graphql-connection",
    about = "Run a paginated connection query against a JSON record set.",
    version,
    rename_all = "kebab-case"
)]
struct Opt {
    #[clap(flatten)]
    args: ConnectionArgs,

    /// JSON file holding an array of record objects.
    #[clap(long, value_name = "FILE", help = "JSON file holding an array of record objects.")]
    records: PathBuf,

    /// Comma separated `field:direction` pairs, e.g. `age:desc,id:asc`.
    #[clap(
        long,
        default_value = "id:asc",
        help = "Comma separated `field:direction` pairs, e.g. `age:desc,id:asc`."
    )]
    sort_keys: String,

    /// GraphQL query to run against the `records` connection.
    #[clap(long, help = "GraphQL query to run against the `records` connection.")]
    query: String,
}

fn parse_sort_keys(sort_keys: &str) -> Result<KeysetSort> {
    let keys = sort_keys
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| {
            let (field, direction) = key.split_once(':').unwrap_or((key, "asc"));
            let direction = match direction.to_lowercase().as_str() {
                "asc" => SortDirection::Asc,
                "desc" => SortDirection::Desc,
                other => return Err(anyhow!("Unknown sort direction {other:?} for {field:?}")),
            };
            Ok((field.to_string(), direction))
        })
        .collect::<Result<Vec<_>>>()?;

    if keys.is_empty() {
        return Err(anyhow!("At least one sort key is required"));
    }

    Ok(KeysetSort::new(keys))
}

fn sort_option_name(sort: &KeysetSort) -> String {
    sort.sort_value()
        .keys()
        .iter()
        .map(|key| {
            let direction = match key.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            format!("{}_{direction}", key.field.to_uppercase())
        })
        .collect::<Vec<_>>()
        .join("_")
}

fn load_records(path: &PathBuf) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&content)
        .with_context(|| format!("Expected a JSON array of objects in {}", path.display()))?;
    Ok(records)
}

/// Union of the top-level keys of every object record.
fn record_field_names(records: &[Record]) -> Result<BTreeSet<String>> {
    let field_names = records
        .iter()
        .filter_map(|record| record.as_object())
        .flat_map(|object| object.keys().cloned())
        .collect::<BTreeSet<_>>();
    if field_names.is_empty() {
        return Err(anyhow!(
            "No record fields found: expected a non-empty JSON array of objects"
        ));
    }
    Ok(field_names)
}

#[tokio::main]
pub async fn main() -> Result<()> {
    let opt = Opt::parse();

    let config = ConnectionConfig::try_from(opt.args)?;
    init_logging(&config)?;

    let records = load_records(&opt.records)?;
    let field_names = record_field_names(&records).with_context(|| {
        format!("Cannot build a node type from {}", opt.records.display())
    })?;

    let sort = parse_sort_keys(&opt.sort_keys)?;
    let sort_options = SortOptions::new().with_option(sort_option_name(&sort), sort)?;

    info!("Loaded {} record(s) from {}.", records.len(), opt.records.display());

    let (source_type, _source) = memory_source_type(NODE_NAME, records);
    let resolver = Arc::new(ConnectionResolver::new(&source_type, sort_options, &config)?);

    let node = Object::new_record(
        NODE_NAME,
        field_names
            .iter()
            .map(|name| (name.as_str(), TypeRef::named(TypeRef::JSON))),
    );
    let query = Object::new("Query").field(Field::new_connection(
        FIELD_NAME,
        NODE_NAME,
        resolver.clone(),
    ));

    let schema = Schema::build("Query", None, None)
        .register_filtering_types()
        .register_connection(&resolver, NODE_NAME)
        .register(node)
        .register(query)
        .finish()
        .map_err(|e| anyhow!("Failed to build schema: {e:?}"))?;

    let response = schema.execute(opt.query.as_str()).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
