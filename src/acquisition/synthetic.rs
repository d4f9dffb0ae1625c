// SyntheticSource - simulated probe signal for demos and soak tests
//
// Produces a noisy baseline followed by a scripted insertion: a fast
// sustained descent through the threshold band, a hold at the trough, a
// recovery, and a flat post-puncture plateau. The plateau is emitted
// noise-free so the stability tracker can latch onto identical readings.
// The RNG is seeded, so a given seed always produces the same feed.
//
// The descent rate must outpace the rolling window's adaptation for the
// dwell classifier to see it; the default profile drops 2.5% of baseline
// over 12 seconds, well above that floor at the default window size.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::acquisition::{RawReading, SampleSource};

/// Shape of the simulated insertion
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    /// Resting sensor level
    pub baseline: f64,
    /// Uniform noise amplitude applied outside the plateau
    pub noise: f64,
    /// Seconds between readings
    pub cadence_seconds: f64,
    /// Session time at which the descent begins
    pub dip_start_seconds: f64,
    /// Descent duration from baseline to trough
    pub descent_seconds: f64,
    /// Fractional drop below baseline at the trough
    pub dip_depth: f64,
    /// Seconds held at the trough
    pub hold_seconds: f64,
    /// Recovery duration from trough back up to the plateau
    pub recovery_seconds: f64,
    /// Fractional drop below baseline of the flat plateau
    pub plateau_drop: f64,
    /// Total feed duration
    pub duration_seconds: f64,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            baseline: 620_000.0,
            noise: 120.0,
            cadence_seconds: 0.05,
            dip_start_seconds: 15.0,
            descent_seconds: 12.0,
            dip_depth: 0.025,
            hold_seconds: 3.0,
            recovery_seconds: 2.0,
            plateau_drop: 0.0005,
            duration_seconds: 40.0,
        }
    }
}

/// SyntheticSource walks the profile at device cadence
pub struct SyntheticSource {
    profile: SyntheticProfile,
    rng: StdRng,
    index: u64,
}

impl SyntheticSource {
    pub fn new(profile: SyntheticProfile, seed: u64) -> Self {
        Self {
            profile,
            rng: StdRng::seed_from_u64(seed),
            index: 0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SyntheticProfile::default(), seed)
    }

    fn value_at(&mut self, t: f64) -> f64 {
        let p = &self.profile;
        let trough = p.baseline * (1.0 - p.dip_depth);
        let plateau = p.baseline * (1.0 - p.plateau_drop);
        let descent_end = p.dip_start_seconds + p.descent_seconds;
        let hold_end = descent_end + p.hold_seconds;
        let recovery_end = hold_end + p.recovery_seconds;

        if t >= recovery_end {
            // Flat plateau, no noise: identical readings end the session.
            return plateau;
        }

        let shape = if t < p.dip_start_seconds {
            p.baseline
        } else if t < descent_end {
            let progress = (t - p.dip_start_seconds) / p.descent_seconds;
            p.baseline + (trough - p.baseline) * progress
        } else if t < hold_end {
            trough
        } else {
            let progress = (t - hold_end) / p.recovery_seconds;
            trough + (plateau - trough) * progress
        };

        shape + self.rng.gen_range(-p.noise..=p.noise)
    }
}

impl SampleSource for SyntheticSource {
    fn next_reading(&mut self) -> Option<RawReading> {
        let t = self.index as f64 * self.profile.cadence_seconds;
        if t > self.profile.duration_seconds {
            return None;
        }
        self.index += 1;

        let value = self.value_at(t);
        // The device reports integer counts as ASCII.
        Some(RawReading::new(t, format!("{:.0}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_feed() {
        let mut a = SyntheticSource::with_seed(7);
        let mut b = SyntheticSource::with_seed(7);

        for _ in 0..50 {
            assert_eq!(a.next_reading(), b.next_reading());
        }
    }

    #[test]
    fn test_baseline_phase_stays_near_baseline() {
        let mut source = SyntheticSource::with_seed(1);
        let profile = SyntheticProfile::default();

        for _ in 0..100 {
            let reading = source.next_reading().unwrap();
            assert!(reading.timestamp < profile.dip_start_seconds);
            let value = reading.parse().unwrap();
            assert!((value - profile.baseline).abs() <= profile.noise + 0.5);
        }
    }

    #[test]
    fn test_trough_reaches_dip_depth() {
        let mut source = SyntheticSource::with_seed(1);
        let profile = SyntheticProfile::default();
        let trough = profile.baseline * (1.0 - profile.dip_depth);

        let mut minimum = f64::MAX;
        while let Some(reading) = source.next_reading() {
            minimum = minimum.min(reading.parse().unwrap());
        }
        assert!((minimum - trough).abs() <= profile.noise + 1.0);
    }

    #[test]
    fn test_plateau_is_flat() {
        let profile = SyntheticProfile::default();
        let plateau_start = profile.dip_start_seconds
            + profile.descent_seconds
            + profile.hold_seconds
            + profile.recovery_seconds;
        let mut source = SyntheticSource::new(profile, 3);

        let mut plateau_values = Vec::new();
        while let Some(reading) = source.next_reading() {
            if reading.timestamp >= plateau_start {
                plateau_values.push(reading.text);
            }
        }
        assert!(plateau_values.len() >= 5);
        assert!(plateau_values.iter().all(|v| v == &plateau_values[0]));
    }

    #[test]
    fn test_feed_ends_at_duration() {
        let mut profile = SyntheticProfile::default();
        profile.duration_seconds = 1.0;
        let mut source = SyntheticSource::new(profile, 1);

        let mut count = 0;
        while source.next_reading().is_some() {
            count += 1;
        }
        // 0.0 through 1.0 inclusive at 50 ms cadence.
        assert_eq!(count, 21);
    }
}
