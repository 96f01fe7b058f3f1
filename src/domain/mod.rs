//! Domain layer: topics, path routing and the request/reply wire types.
//!
//! Everything in here is pure: no I/O, no bus access. The service and
//! WebSocket layers build on these types.

pub mod message;
pub mod path_router;
pub mod topic;

pub use message::{Reply, RequestMessage};
pub use path_router::{QueryParams, RequestRoute};
pub use topic::Topic;
