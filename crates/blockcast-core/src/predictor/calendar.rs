//! Time-block calendar.
//!
//! Maps wall-clock instants to block indices and block boundaries. Blocks are
//! counted from the Unix epoch in UTC, so block 0 of a 1440-minute cycle
//! starts at 00:00 UTC.

use chrono::{DateTime, Duration, Utc};

use super::config::PredictorConfig;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBlockCalendar {
    block_length: u32,
    block_count: usize,
}

impl TimeBlockCalendar {
    /// Build a calendar from a validated configuration.
    pub fn from_config(config: &PredictorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            block_length: config.block_length,
            block_count: config.block_count(),
        })
    }

    pub fn block_length(&self) -> u32 {
        self.block_length
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Index of the block containing `now`, in `0..block_count`.
    pub fn current_block_index(&self, now: DateTime<Utc>) -> usize {
        let block = epoch_minutes(now).div_euclid(self.block_length as i64);
        block.rem_euclid(self.block_count as i64) as usize
    }

    /// Start of the block containing `now`.
    pub fn block_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let length = self.block_length as i64;
        let start_min = epoch_minutes(now).div_euclid(length) * length;
        let into_block = Duration::seconds(now.timestamp() - start_min * 60)
            + Duration::nanoseconds(now.timestamp_subsec_nanos() as i64);
        now - into_block
    }

    /// Start of the block following the one containing `now`.
    pub fn next_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.block_start(now) + Duration::minutes(self.block_length as i64)
    }

    /// `HH:MM` start of a block within a day, for display.
    pub fn block_label(&self, index: usize) -> String {
        let minutes = index as u64 * self.block_length as u64;
        format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
    }
}

fn epoch_minutes(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn calendar(block_length: u32) -> TimeBlockCalendar {
        let cfg = PredictorConfig::new("t", "binary_sensor.t", block_length, 0.5, 0.5);
        TimeBlockCalendar::from_config(&cfg).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn index_counts_from_utc_midnight() {
        let cal = calendar(30);
        assert_eq!(cal.block_count(), 48);
        assert_eq!(cal.current_block_index(at(0, 0, 0)), 0);
        assert_eq!(cal.current_block_index(at(0, 29, 59)), 0);
        assert_eq!(cal.current_block_index(at(0, 30, 0)), 1);
        assert_eq!(cal.current_block_index(at(23, 59, 59)), 47);
    }

    #[test]
    fn index_wraps_each_cycle() {
        let cal = calendar(60);
        let day1 = at(5, 10, 0);
        let day2 = day1 + Duration::days(1);
        assert_eq!(cal.current_block_index(day1), cal.current_block_index(day2));
    }

    #[test]
    fn next_boundary_truncates_seconds() {
        let cal = calendar(30);
        assert_eq!(cal.next_boundary(at(10, 17, 42)), at(10, 30, 0));
        assert_eq!(cal.next_boundary(at(10, 30, 0)), at(11, 0, 0));
        assert_eq!(cal.next_boundary(at(23, 45, 1)), at(0, 0, 0) + Duration::days(1));
    }

    #[test]
    fn next_boundary_drops_subsecond_part() {
        let cal = calendar(15);
        let now = at(8, 14, 59) + Duration::milliseconds(999);
        assert_eq!(cal.next_boundary(now), at(8, 15, 0));
        assert_eq!(cal.block_start(now), at(8, 0, 0));
    }

    #[test]
    fn block_before_epoch_is_well_defined() {
        let cal = calendar(30);
        let now = Utc.with_ymd_and_hms(1969, 12, 31, 23, 45, 0).unwrap();
        assert_eq!(cal.current_block_index(now), 47);
        assert_eq!(cal.next_boundary(now), Utc.timestamp_opt(0, 0).unwrap());
    }

    #[test]
    fn labels_blocks_by_start_time() {
        let cal = calendar(30);
        assert_eq!(cal.block_label(0), "00:00");
        assert_eq!(cal.block_label(3), "01:30");
        assert_eq!(cal.block_label(47), "23:30");
    }
}
