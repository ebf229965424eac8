//! Backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
