// ScriptedSource - replay a recorded (time, value) table

use std::collections::VecDeque;

use crate::acquisition::{RawReading, SampleSource};

/// ScriptedSource replays a fixed sequence of readings in order
///
/// Used by tests and the CLI replay command; the readings keep their raw
/// text form so the parse/discard path is exercised exactly as with a
/// live device.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    readings: VecDeque<RawReading>,
}

impl ScriptedSource {
    pub fn new(readings: impl IntoIterator<Item = RawReading>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    /// Build from numeric (time, value) pairs
    pub fn from_values(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, value)| RawReading::new(timestamp, format!("{}", value))),
        )
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl SampleSource for ScriptedSource {
    fn next_reading(&mut self) -> Option<RawReading> {
        self.readings.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order() {
        let mut source = ScriptedSource::from_values([(0.0, 100.0), (0.05, 101.0)]);

        let first = source.next_reading().unwrap();
        assert_eq!(first.timestamp, 0.0);
        assert_eq!(first.parse().unwrap(), 100.0);

        let second = source.next_reading().unwrap();
        assert_eq!(second.timestamp, 0.05);
        assert!(source.next_reading().is_none());
    }

    #[test]
    fn test_preserves_raw_text() {
        let mut source = ScriptedSource::new([RawReading::new(0.0, "not-a-number")]);
        let reading = source.next_reading().unwrap();
        assert!(reading.parse().is_err());
    }
}
