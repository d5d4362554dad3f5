pub mod config;
pub mod filter;
pub mod project;
pub mod refs;
pub mod report;
pub mod session;
pub mod tag;
pub mod task;
pub mod team;
pub mod user;

pub use config::*;
pub use filter::*;
pub use project::*;
pub use report::*;
pub use session::*;
pub use tag::*;
pub use task::*;
pub use team::*;
pub use user::*;
