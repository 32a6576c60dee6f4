//! `async_graphql::dynamic` extensions for exposing JSON records as node objects.

use super::context::*;
use super::self_prelude::*;
use crate::source::Record;
use async_graphql::Value;

#[extension_trait]
pub impl RecordField for Field {
    /// A field resolved from the record key of the same name.
    fn record_field(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        let name = name.into();
        let key = name.clone();
        Self::new(name, ty, move |ctx| {
            let key = key.clone();
            FieldFuture::new(async move {
                let record = ctx.parent::<Record>()?;
                match record.get(&key) {
                    None | Some(serde_json::Value::Null) => Ok(None),
                    Some(value) => {
                        Ok(Some(FieldValue::value(Value::from_json(value.clone())?)))
                    }
                }
            })
        })
    }
}

#[extension_trait]
pub impl RecordObject for Object {
    /// A node object whose fields are read straight from the record.
    fn new_record<'f>(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (&'f str, TypeRef)>,
    ) -> Self {
        fields
            .into_iter()
            .fold(Self::new(name), |object, (field_name, ty)| {
                object.field(Field::record_field(field_name, ty))
            })
    }
}
