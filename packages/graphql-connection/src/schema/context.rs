use super::self_prelude::*;
use crate::{
    filter::Filter,
    resolver::{ConnectionProjection, PaginationArgs},
    source::Projection,
};
use async_graphql::{Error, Result};
use std::any::Any;

#[extension_trait]
pub impl<'a> ConnectionResolverContext<'a> for ResolverContext<'a> {
    fn parent<T: Any + Send + Sync>(&self) -> Result<&'a T> {
        self.parent_value.try_downcast_ref::<T>()
    }

    /// Argument value, treating an explicit `null` as absent.
    fn arg(&self, name: &str) -> Option<ValueAccessor<'_>> {
        self.args.get(name).filter(|arg| !arg.is_null())
    }
    fn arg_i64(&self, name: &str) -> Result<Option<i64>> {
        self.arg(name).map(|arg| arg.i64()).transpose()
    }
    fn arg_string(&self, name: &str) -> Result<Option<String>> {
        self.arg(name)
            .map(|arg| arg.string().map(ToString::to_string))
            .transpose()
    }
    fn arg_enum(&self, name: &str) -> Result<Option<String>> {
        self.arg(name)
            .map(|arg| arg.enum_name().map(ToString::to_string))
            .transpose()
    }
    fn arg_json(&self, name: &str) -> Result<Option<serde_json::Value>> {
        self.arg(name)
            .map(|arg| {
                arg.deserialize::<serde_json::Value>().map_err(|e| {
                    Error::new(format!(
                        "Failed to read argument {name} as JSON: {}",
                        e.message
                    ))
                })
            })
            .transpose()
    }

    fn pagination_args(&self) -> Result<PaginationArgs> {
        Ok(PaginationArgs {
            first: self.arg_i64("first")?,
            last: self.arg_i64("last")?,
            after: self.arg_string("after")?,
            before: self.arg_string("before")?,
            sort: self.arg_enum("sort")?,
            filter: self.arg_json("filter")?.map(Filter::Raw),
        })
    }

    /// Read which parts of the connection the query selected.
    fn connection_projection(&self) -> ConnectionProjection {
        let mut projection = ConnectionProjection {
            count: false,
            edges: None,
            page_info: false,
        };

        for selection in self.field().selection_set() {
            match selection.name() {
                "count" => projection.count = true,
                "pageInfo" => projection.page_info = true,
                "edges" => {
                    let node_fields = selection
                        .selection_set()
                        .filter(|edge_field| edge_field.name() == "node")
                        .flat_map(|node| {
                            node.selection_set()
                                .map(|node_field| node_field.name().to_string())
                                .collect::<Vec<_>>()
                        })
                        .filter(|name| !name.starts_with("__"))
                        .collect::<Vec<_>>();
                    projection.edges = Some(match projection.edges.take() {
                        Some(existing) => existing.with_fields(&node_fields),
                        None => Projection::fields(node_fields),
                    });
                }
                _ => {}
            }
        }

        projection
    }
}
