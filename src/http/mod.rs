//! Request and response translation between the flat input/output records
//! and the `http` types clients send and receive.

pub mod orderedheaders;
pub mod request;
pub mod response;
pub mod responsebody;
pub mod translate;

pub use orderedheaders::HeaderOrder;
pub use request::{build_request, WireRequest};
pub use response::HttpResponse;
pub use responsebody::ResponseBody;
pub use translate::{build_response, cookies_from_headers, cookies_to_map, Response};
