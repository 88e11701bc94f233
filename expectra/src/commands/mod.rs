// expectra/src/commands/mod.rs

pub mod clean;
pub mod diagnose;
pub mod list;
pub mod run;
pub mod validate;
