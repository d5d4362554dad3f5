pub mod cache;
pub mod dashboard;
pub mod error;
pub mod filter_codec;
pub mod group;
pub mod join;
pub mod query;
pub mod report;
pub mod task_ops;
pub mod team_ops;
