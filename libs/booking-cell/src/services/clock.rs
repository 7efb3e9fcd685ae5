use chrono::{DateTime, NaiveDate, Utc};

use schedule_cell::services::calendar::today_local;

/// Time source for the flow machinery. Production uses the system clock;
/// tests inject fixed instants so notice expiry and the payment redirect
/// delay can be advanced deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar date for past-date guarding, local zone.
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        today_local()
    }
}
