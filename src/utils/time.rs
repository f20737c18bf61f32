use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn time_millis() -> i64 {
    now().timestamp_millis()
}
