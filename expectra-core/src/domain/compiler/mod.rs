// expectra-core/src/domain/compiler/mod.rs

pub mod query;

pub use query::{ActiveBatch, FilterExpression, QuerySpec, QueryTemplate};
