pub mod api;
pub mod config_io;
pub mod http;
pub mod paths;
pub mod session_io;
