//! Time source for stamping and expiring records.

use std::cell::Cell;

use chrono::{DateTime, TimeDelta, Utc};

pub trait Clock {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to. Used to replay page views at chosen
/// instants.
#[derive(Debug, Clone)]
pub struct FixedClock(Cell<DateTime<Utc>>);

impl FixedClock {
  pub fn new(now: DateTime<Utc>) -> Self { Self(Cell::new(now)) }

  /// A clock at `millis` since the epoch, or at the epoch itself when the
  /// value is out of range.
  pub fn at_millis(millis: i64) -> Self {
    Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
  }

  pub fn set(&self, now: DateTime<Utc>) { self.0.set(now); }

  pub fn advance(&self, by: TimeDelta) { self.0.set(self.0.get() + by); }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0.get() }
}

impl<C: Clock + ?Sized> Clock for &C {
  fn now(&self) -> DateTime<Utc> { (**self).now() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_clock_advances_on_request() {
    let clock = FixedClock::at_millis(1_000);
    clock.advance(TimeDelta::seconds(2));
    assert_eq!(clock.now().timestamp_millis(), 3_000);
  }
}
