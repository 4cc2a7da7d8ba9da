mod logging;
mod request_id;

pub use logging::{log_requests, MAX_BODY_BYTES};
pub use request_id::{next_request_id, ClockRequestId};
