// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Label-grouped entries accumulated between two flushes.

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::Serialize;

/// One line of a stream as it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub line: String,
}

/// Entries sharing one label set, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stream {
    pub labels: String,
    pub entries: Vec<Entry>,
}

/// All streams accumulated since the last flush.
///
/// Streams keep the order in which their label first appeared, and entries keep the
/// order in which they were pushed.
#[derive(Debug, Default)]
pub struct Batch {
    streams: Vec<Stream>,
    index: HashMap<String, usize>,
    len: usize,
}

impl Batch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to the stream for `label`, creating the stream if needed.
    pub fn push(&mut self, label: &str, entry: Entry) {
        let position = match self.index.get(label) {
            Some(&position) => position,
            None => {
                self.streams.push(Stream {
                    labels: label.to_string(),
                    entries: Vec::new(),
                });
                let position = self.streams.len() - 1;
                self.index.insert(label.to_string(), position);
                position
            }
        };
        self.streams[position].entries.push(entry);
        self.len += 1;
    }

    /// Total number of entries across all streams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    #[must_use]
    pub fn into_streams(self) -> Vec<Stream> {
        self.streams
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn entry(secs: i64, line: &str) -> Entry {
        Entry {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            line: line.to_string(),
        }
    }

    #[test]
    fn test_new_batch_is_empty() {
        let batch = Batch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
        assert!(batch.streams().is_empty());
    }

    #[test]
    fn test_groups_by_label() {
        let mut batch = Batch::new();
        batch.push("A", entry(1, "x"));
        batch.push("B", entry(3, "z"));
        batch.push("A", entry(2, "y"));

        assert_eq!(batch.len(), 3);
        let streams = batch.into_streams();
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].labels, "A");
        assert_eq!(streams[0].entries, vec![entry(1, "x"), entry(2, "y")]);
        assert_eq!(streams[1].labels, "B");
        assert_eq!(streams[1].entries, vec![entry(3, "z")]);
    }

    #[test]
    fn test_json_shape_of_stream() {
        let stream = Stream {
            labels: "{job=\"a\"}".to_string(),
            entries: vec![entry(0, "hello")],
        };
        let value = serde_json::to_value(&stream).unwrap();
        assert_eq!(value["labels"], "{job=\"a\"}");
        assert_eq!(value["entries"][0]["ts"], "1970-01-01T00:00:00Z");
        assert_eq!(value["entries"][0]["line"], "hello");
    }

    proptest! {
        #[test]
        fn prop_per_label_order_is_push_order(
            pushes in proptest::collection::vec((0usize..4, "[a-z]{0,8}"), 0..64)
        ) {
            let mut batch = Batch::new();
            for (i, (label, line)) in pushes.iter().enumerate() {
                batch.push(&format!("L{label}"), entry(i as i64, line));
            }

            prop_assert_eq!(batch.len(), pushes.len());
            let streams = batch.into_streams();
            for stream in &streams {
                let expected: Vec<Entry> = pushes
                    .iter()
                    .enumerate()
                    .filter(|(_, (label, _))| format!("L{label}") == stream.labels)
                    .map(|(i, (_, line))| entry(i as i64, line))
                    .collect();
                prop_assert_eq!(&stream.entries, &expected);
            }
            let total: usize = streams.iter().map(|s| s.entries.len()).sum();
            prop_assert_eq!(total, pushes.len());
        }
    }
}
