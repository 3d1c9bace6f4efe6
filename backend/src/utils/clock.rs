use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;

/// Source of "now" for the engine. Swapped for [`ManualClock`] in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Start of the local day containing `now`, expressed in UTC.
///
/// Where midnight does not exist locally (a DST jump at 00:00) the first
/// instant of the day is used instead.
pub fn local_midnight(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);
    let naive_midnight = local.date_naive().and_time(NaiveTime::MIN);

    match tz.from_local_datetime(&naive_midnight).earliest() {
        Some(midnight) => midnight.with_timezone(&Utc),
        None => now - Duration::seconds(i64::from(local.num_seconds_from_midnight())),
    }
}
