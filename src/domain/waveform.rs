// Triangular waveform generator for auto runs
use super::glucose::{GlucoseSample, GlucoseUnit};
use super::run::RunConfig;
use chrono::{DateTime, Duration, Utc};

/// Deterministic sample sequence for one run: ramp from the configured min up
/// to the max one step per interval, then back down, repeating until the time
/// window or the entry count is exhausted.
///
/// Pure and restartable: building two generators from the same config yields
/// identical sequences. Pacing is the caller's concern.
#[derive(Debug, Clone)]
pub struct TriangularWave {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    value: f64,
    min: f64,
    max: f64,
    step: f64,
    tick: Duration,
    unit: GlucoseUnit,
    remaining: u64,
    ascending: bool,
}

impl TriangularWave {
    pub fn new(config: &RunConfig) -> Self {
        let tick_ms = (config.interval_seconds * 1000.0).round() as i64;
        let span_ms = (config.end_time - config.start_time).num_milliseconds();
        let remaining = if tick_ms > 0 && span_ms >= 0 {
            (span_ms / tick_ms) as u64
        } else {
            0
        };

        Self {
            cursor: config.start_time,
            end: config.end_time,
            value: config.min_value,
            min: config.min_value,
            max: config.max_value,
            step: config.step,
            tick: Duration::milliseconds(tick_ms),
            unit: config.unit,
            remaining,
            ascending: true,
        }
    }

    /// Entries still to be emitted.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Iterator for TriangularWave {
    type Item = GlucoseSample;

    fn next(&mut self) -> Option<GlucoseSample> {
        if self.remaining == 0 || self.cursor > self.end {
            return None;
        }

        let sample = GlucoseSample::new(self.cursor, self.value, self.unit);

        if self.ascending {
            self.value += self.step;
            if self.value >= self.max {
                self.value = self.max;
                self.ascending = false;
            }
        } else {
            self.value -= self.step;
            if self.value <= self.min {
                self.value = self.min;
                self.ascending = true;
            }
        }

        self.cursor += self.tick;
        self.remaining -= 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (0, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config(
        window_minutes: i64,
        min: f64,
        max: f64,
        step: f64,
        interval_seconds: f64,
    ) -> RunConfig {
        let start = Utc.with_ymd_and_hms(2025, 3, 16, 8, 0, 0).unwrap();
        RunConfig {
            start_time: start,
            end_time: start + Duration::minutes(window_minutes),
            min_value: min,
            max_value: max,
            step,
            interval_seconds,
            unit: GlucoseUnit::MgDl,
        }
    }

    #[test]
    fn test_sample_count_and_bounds() {
        let config = config(60, 72.0, 140.0, 10.0, 300.0);
        let samples: Vec<_> = TriangularWave::new(&config).collect();

        // 60 minutes at one sample per 5 minutes
        assert_eq!(samples.len(), 12);
        for sample in &samples {
            assert!(sample.value >= 72.0 && sample.value <= 140.0);
        }
    }

    #[test]
    fn test_ramp_up_then_down() {
        let config = config(50, 70.0, 100.0, 10.0, 300.0);
        let values: Vec<f64> = TriangularWave::new(&config).map(|s| s.value).collect();

        assert_eq!(
            values,
            vec![70.0, 80.0, 90.0, 100.0, 90.0, 80.0, 70.0, 80.0, 90.0, 100.0]
        );
    }

    #[test]
    fn test_two_sample_window_excludes_end() {
        // start=T, end=T+10min, interval=5min: T+10min itself is never emitted
        let config = config(10, 70.0, 100.0, 10.0, 300.0);
        let samples: Vec<_> = TriangularWave::new(&config).collect();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 70.0);
        assert_eq!(samples[1].value, 80.0);
        assert_eq!(samples[0].timestamp, config.start_time);
        assert_eq!(
            samples[1].timestamp,
            config.start_time + Duration::minutes(5)
        );
    }

    #[test]
    fn test_restartable_sequences_are_identical() {
        let config = config(120, 72.0, 140.0, 7.0, 180.0);
        let first: Vec<_> = TriangularWave::new(&config).collect();
        let second: Vec<_> = TriangularWave::new(&config).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_flat_range_emits_constant() {
        let config = config(30, 90.0, 90.0, 5.0, 300.0);
        let samples: Vec<_> = TriangularWave::new(&config).collect();

        assert_eq!(samples.len(), 6);
        assert!(samples.iter().all(|s| s.value == 90.0));
    }

    #[test]
    fn test_oversized_step_alternates_between_bounds() {
        let config = config(25, 70.0, 100.0, 50.0, 300.0);
        let values: Vec<f64> = TriangularWave::new(&config).map(|s| s.value).collect();

        assert_eq!(values, vec![70.0, 100.0, 70.0, 100.0, 70.0]);
    }

    #[test]
    fn test_window_shorter_than_interval_is_empty() {
        let config = config(2, 72.0, 140.0, 1.0, 300.0);
        assert_eq!(TriangularWave::new(&config).count(), 0);
    }

    #[test]
    fn test_timestamps_advance_by_interval() {
        let config = config(30, 72.0, 140.0, 1.0, 600.0);
        let samples: Vec<_> = TriangularWave::new(&config).collect();

        assert_eq!(samples.len(), 3);
        for pair in samples.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::minutes(10));
        }
    }

    #[test]
    fn test_sub_second_interval() {
        let config = config(1, 72.0, 80.0, 1.0, 0.5);
        let samples: Vec<_> = TriangularWave::new(&config).collect();

        assert_eq!(samples.len(), 120);
        assert_eq!(
            samples[1].timestamp - samples[0].timestamp,
            Duration::milliseconds(500)
        );
    }
}
