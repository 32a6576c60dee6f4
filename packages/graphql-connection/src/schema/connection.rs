//! `async_graphql::dynamic` extensions for handling GraphQL connections.
//! See: https://relay.dev/graphql/connections.htm#sec-Connection-Types

use super::context::*;
use super::filtering::*;
use super::ordering::*;
use super::paging::*;
use super::self_prelude::*;
use crate::resolver::{Connection, ConnectionResolver, Edge};
use std::sync::Arc;

#[extension_trait]
pub impl ConnectionTypeRef for TypeRef {
    fn connection(node_name: impl Into<String>) -> String {
        format!("{}Connection", node_name.into())
    }
    fn edge(node_name: impl Into<String>) -> String {
        format!("{}Edge", node_name.into())
    }
}

#[extension_trait]
pub impl ConnectionObject for Object {
    fn new_connection(node_name: impl Into<String>) -> Self {
        let node_name = node_name.into();
        Self::new(TypeRef::connection(&node_name))
            .field(Field::new("count", TypeRef::named_nn(TypeRef::INT), |ctx| {
                FieldFuture::new(async move {
                    let parent = ctx.parent::<Connection>()?;
                    Ok(parent.count.map(|count| FieldValue::value(count)))
                })
            }))
            .field(Field::new(
                "edges",
                TypeRef::named_nn_list_nn(TypeRef::edge(&node_name)),
                |ctx| {
                    FieldFuture::new(async move {
                        let parent = ctx.parent::<Connection>()?;
                        let edges = parent
                            .edges
                            .iter()
                            .map(|edge| FieldValue::owned_any(edge.clone()));
                        Ok(Some(FieldValue::list(edges)))
                    })
                },
            ))
            .field(Field::new(
                "pageInfo",
                TypeRef::named_nn(TypeRef::PAGE_INFO),
                |ctx| {
                    FieldFuture::new(async move {
                        let parent = ctx.parent::<Connection>()?;
                        Ok(Some(FieldValue::owned_any(parent.page_info.clone())))
                    })
                },
            ))
    }
}

#[extension_trait]
pub impl ConnectionEdgeObject for Object {
    fn new_edge(node_name: impl Into<String>) -> Self {
        let node_name = node_name.into();
        Self::new(TypeRef::edge(&node_name))
            .field(Field::new(
                "cursor",
                TypeRef::named_nn(TypeRef::CURSOR),
                |ctx| {
                    FieldFuture::new(async move {
                        let parent = ctx.parent::<Edge>()?;
                        Ok(Some(FieldValue::value(parent.cursor.clone())))
                    })
                },
            ))
            .field(Field::new("node", TypeRef::named_nn(node_name), |ctx| {
                FieldFuture::new(async move {
                    let parent = ctx.parent::<Edge>()?;
                    Ok(Some(FieldValue::owned_any(parent.node.clone())))
                })
            }))
    }
}

#[extension_trait]
pub impl ConnectionField for Field {
    /// A field resolving one page of `resolver`'s records.
    ///
    /// Arguments: `first`, `after`, `last`, `before`, `sort` and `filter`.
    /// Only the parts of the connection selected by the query are computed.
    fn new_connection(
        field_name: impl Into<String>,
        node_name: impl Into<String>,
        resolver: Arc<ConnectionResolver>,
    ) -> Self {
        let node_name = node_name.into();
        let sort_argument_options = resolver.sort_options().clone();
        Self::new(
            field_name,
            TypeRef::named_nn(TypeRef::connection(&node_name)),
            move |ctx| {
                let resolver = resolver.clone();
                FieldFuture::new(async move {
                    let args = ctx.pagination_args()?;
                    let projection = ctx.connection_projection();
                    let connection = resolver.resolve(args, &projection).await?;
                    Ok(Some(FieldValue::owned_any(connection)))
                })
            },
        )
        .pagination_arguments()
        .sort_argument(&node_name, &sort_argument_options)
        .filter_argument(TypeRef::JSON)
    }
}

#[extension_trait]
pub impl SchemaBuilderConnectionExt for SchemaBuilder {
    /// Register the connection, edge, page info and sort types of `node_name`.
    fn register_connection(self, resolver: &ConnectionResolver, node_name: &str) -> Self {
        self.register_paging_types()
            .register(Object::new_connection(node_name))
            .register(Object::new_edge(node_name))
            .register(Enum::new_sort(node_name, resolver.sort_options()))
    }
}
