pub mod http;
pub mod schema;

pub use http::{run, HttpServerConfig};
