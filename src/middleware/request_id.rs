use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};

static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

/// Request ids taken from the wall clock in nanoseconds since the epoch.
/// Two requests landing on the same reading still get distinct, increasing ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockRequestId;

impl MakeRequestId for ClockRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&next_request_id().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

pub fn next_request_id() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0);

    let mut last = LAST_ISSUED.load(Ordering::Relaxed);
    loop {
        let next = now.max(last.saturating_add(1));
        match LAST_ISSUED.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}
