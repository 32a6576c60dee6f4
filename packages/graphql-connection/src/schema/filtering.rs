//! `async_graphql::dynamic` extensions for handling connection filtering.

use super::self_prelude::*;

#[extension_trait]
pub impl FilteringTypeRef for TypeRef {
    /// Scalar accepting any JSON value, used for pass-through filters.
    const JSON: &'static str = "JSON";
}

#[extension_trait]
pub impl FilteringField for Field {
    /// Add a pass-through `filter` argument of the given input type.
    fn filter_argument(self, type_name: impl Into<String>) -> Self {
        self.argument(
            InputValue::new("filter", TypeRef::named(type_name.into()))
                .description("Restrict the connection to matching records."),
        )
    }
}

#[extension_trait]
pub impl SchemaBuilderFilteringExt for SchemaBuilder {
    fn register_filtering_types(self) -> Self {
        self.register(Scalar::new(TypeRef::JSON))
    }
}
