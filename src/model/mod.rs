pub mod common;
pub mod post;
pub mod schema;

pub use common::*;
pub use post::*;
pub use schema::*;
