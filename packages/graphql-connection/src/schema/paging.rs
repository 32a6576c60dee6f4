//! `async_graphql::dynamic` extensions for handling pagination.
//! See: https://graphql.org/learn/pagination/

use super::context::*;
use super::self_prelude::*;
use crate::resolver::PageInfo;

#[extension_trait]
pub impl PagingTypeRef for TypeRef {
    const CURSOR: &'static str = "String";
    const PAGE_INFO: &'static str = "PageInfo";
}

#[extension_trait]
pub impl PagingField for Field {
    fn pagination_arguments(self) -> Self {
        self.forward_pagination_arguments()
            .backward_pagination_arguments()
    }
    /// Add forward pagination arguments to a field.
    /// See: https://relay.dev/graphql/connections.htm#sec-Forward-pagination-arguments
    fn forward_pagination_arguments(self) -> Self {
        self.argument(
            InputValue::new("first", TypeRef::named(TypeRef::INT)).description(
                "Paginate forward, returning the given amount of edges at most.",
            ),
        )
        .argument(
            InputValue::new("after", TypeRef::named(TypeRef::CURSOR))
                .description("Return edges after the given cursor."),
        )
    }
    /// Add backward pagination arguments to a field.
    /// See: https://relay.dev/graphql/connections.htm#sec-Backward-pagination-arguments
    fn backward_pagination_arguments(self) -> Self {
        self.argument(
            InputValue::new("last", TypeRef::named(TypeRef::INT)).description(
                "Paginate backward, returning the given amount of edges at most.",
            ),
        )
        .argument(
            InputValue::new("before", TypeRef::named(TypeRef::CURSOR))
                .description("Return edges before the given cursor."),
        )
    }
}

/// See: https://relay.dev/graphql/connections.htm#sec-PageInfo
#[extension_trait]
pub impl PageInfoObject for Object {
    fn new_page_info() -> Self {
        Self::new(TypeRef::PAGE_INFO)
            .field(Field::new(
                "hasNextPage",
                TypeRef::named_nn(TypeRef::BOOLEAN),
                |ctx| {
                    FieldFuture::new(async move {
                        let parent = ctx.parent::<PageInfo>()?;
                        Ok(Some(FieldValue::value(parent.has_next_page)))
                    })
                },
            ))
            .field(Field::new(
                "hasPreviousPage",
                TypeRef::named_nn(TypeRef::BOOLEAN),
                |ctx| {
                    FieldFuture::new(async move {
                        let parent = ctx.parent::<PageInfo>()?;
                        Ok(Some(FieldValue::value(parent.has_previous_page)))
                    })
                },
            ))
            .field(Field::new(
                "startCursor",
                TypeRef::named(TypeRef::CURSOR),
                |ctx| {
                    FieldFuture::new(async move {
                        let parent = ctx.parent::<PageInfo>()?;
                        Ok(parent.start_cursor.clone().map(|c| FieldValue::value(c)))
                    })
                },
            ))
            .field(Field::new(
                "endCursor",
                TypeRef::named(TypeRef::CURSOR),
                |ctx| {
                    FieldFuture::new(async move {
                        let parent = ctx.parent::<PageInfo>()?;
                        Ok(parent.end_cursor.clone().map(|c| FieldValue::value(c)))
                    })
                },
            ))
    }
}

#[extension_trait]
pub impl SchemaBuilderPagingExt for SchemaBuilder {
    fn register_paging_types(self) -> Self {
        self.register(Object::new_page_info())
    }
}
