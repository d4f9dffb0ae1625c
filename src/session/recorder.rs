// SampleLog - session history containers
//
// Keeps the unbounded append-only raw history (export, full-session
// charting) strictly separate from the bounded ring used for live display.
// The two are never conflated: the ring drops old points, the log never
// does. Event labels are recorded alongside so the export table can mark
// the rows where something happened.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::analysis::Sample;

/// Plain tabular export row handed to the export collaborator
///
/// The core emits rows without any formatting concerns; file layout is
/// owned by the exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub time: f64,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// SampleLog owns the session's history containers
pub struct SampleLog {
    raw: Vec<Sample>,
    plot: VecDeque<Sample>,
    plot_capacity: usize,
    events: Vec<(f64, String)>,
}

impl SampleLog {
    pub fn new(plot_capacity: usize) -> Self {
        let plot_capacity = plot_capacity.max(1);
        Self {
            raw: Vec::new(),
            plot: VecDeque::with_capacity(plot_capacity),
            plot_capacity,
            events: Vec::new(),
        }
    }

    /// Record one accepted reading in both containers
    pub fn record(&mut self, timestamp: f64, value: f64) {
        let sample = Sample::new(timestamp, value);
        self.raw.push(sample);

        if self.plot.len() == self.plot_capacity {
            self.plot.pop_front();
        }
        self.plot.push_back(sample);
    }

    /// Record a labeled event at the given session time
    pub fn record_event(&mut self, timestamp: f64, label: impl Into<String>) {
        self.events.push((timestamp, label.into()));
    }

    /// Full unbounded history
    pub fn raw(&self) -> &[Sample] {
        &self.raw
    }

    /// Copy of the bounded live-display window
    pub fn plot_snapshot(&self) -> Vec<Sample> {
        self.plot.iter().copied().collect()
    }

    pub fn events(&self) -> &[(f64, String)] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Build the export table: one row per sample, labels attached to the
    /// first row at or after the event's timestamp
    pub fn export_rows(&self) -> Vec<ExportRow> {
        let mut rows: Vec<ExportRow> = self
            .raw
            .iter()
            .map(|sample| ExportRow {
                time: sample.timestamp,
                value: sample.value,
                label: None,
            })
            .collect();

        let mut next_event = 0;
        for row in rows.iter_mut() {
            let mut labels: Vec<&str> = Vec::new();
            while next_event < self.events.len() && self.events[next_event].0 <= row.time {
                labels.push(&self.events[next_event].1);
                next_event += 1;
            }
            if !labels.is_empty() {
                row.label = Some(labels.join("; "));
            }
        }

        // Events past the last sample (e.g. a stop label) attach to the
        // final row rather than being dropped.
        if next_event < self.events.len() {
            if let Some(last) = rows.last_mut() {
                let mut labels: Vec<String> = last.label.take().into_iter().collect();
                labels.extend(self.events[next_event..].iter().map(|(_, l)| l.clone()));
                last.label = Some(labels.join("; "));
            }
        }

        rows
    }

    /// Drop all histories and labels (session reset)
    pub fn clear(&mut self) {
        self.raw.clear();
        self.plot.clear();
        self.events.clear();
    }
}
