//! Data transfer objects for the HTTP API.

mod response;

pub use response::{ApiResponse, FileResponse, RemovedResponse};
