//! Synthesizes a time-based UUID for an omitted `_tid` key column on write.
//! Fixed node id, fixed clock-sequence seed — "deterministic" here
//! means derived predictably from wall-clock time, not literally constant.

use std::sync::OnceLock;

use chrono::Utc;
use uuid::{Context, Timestamp, Uuid};

const NODE_ID: [u8; 6] = [0x6c, 0x61, 0x74, 0x74, 0x69, 0x63];

fn context() -> &'static Context {
    static CONTEXT: OnceLock<Context> = OnceLock::new();
    CONTEXT.get_or_init(|| Context::new(0))
}

/// A v1 UUID stamped with the current wall-clock time.
pub fn now() -> Uuid {
    let now = Utc::now();
    let ts = Timestamp::from_unix(context(), now.timestamp() as u64, now.timestamp_subsec_nanos());
    Uuid::new_v1(ts, &NODE_ID)
}
