//! `async_graphql::dynamic` extensions that expose a [`ConnectionResolver`]
//! as a GraphQL connection field.
//!
//! [`ConnectionResolver`]: crate::resolver::ConnectionResolver

mod connection;
mod context;
mod filtering;
mod ordering;
mod paging;
mod record;

pub use connection::*;
pub use context::*;
pub use filtering::*;
pub use ordering::*;
pub use paging::*;
pub use record::*;

pub(self) mod self_prelude {
    pub use async_graphql::dynamic::*;
    pub use extension_trait::extension_trait;
}
