//! `async_graphql::dynamic` extensions for handling connection ordering.

use super::self_prelude::*;
use crate::sort::SortOptions;
use async_graphql::{Name, Value};

#[extension_trait]
pub impl OrderingTypeRef for TypeRef {
    fn sort_enum(node_name: impl Into<String>) -> String {
        format!("SortFindMany{}Input", node_name.into())
    }
}

#[extension_trait]
pub impl OrderingEnum for Enum {
    /// One item per sort option, in declaration order.
    fn new_sort(node_name: impl Into<String>, options: &SortOptions) -> Self {
        options
            .names()
            .fold(Self::new(TypeRef::sort_enum(node_name)), |sort_enum, name| {
                sort_enum.item(name)
            })
    }
}

#[extension_trait]
pub impl OrderingField for Field {
    /// Add a `sort` argument defaulting to the first declared option.
    fn sort_argument(self, node_name: impl Into<String>, options: &SortOptions) -> Self {
        let mut sort = InputValue::new("sort", TypeRef::named(TypeRef::sort_enum(node_name)))
            .description("Order of the returned edges.");
        if let Some((name, _)) = options.default_option() {
            sort = sort.default_value(Value::Enum(Name::new(name)));
        }
        self.argument(sort)
    }
}
