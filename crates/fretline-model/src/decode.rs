use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::chart::Chart;
use crate::event::{Event, EventKind, secs_to_us};
use crate::lane::{Lane, LaneTarget};

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to read chart file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse chart: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk chart layout. Times are in seconds.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChart {
    #[serde(default)]
    song_name: String,
    #[serde(default = "default_bpm")]
    bpm: f64,
    #[serde(default)]
    global_offset: f64,
    /// Decoded one by one so a malformed note only drops itself.
    #[serde(default)]
    notes: Vec<serde_json::Value>,
}

fn default_bpm() -> f64 {
    120.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNote {
    time: f64,
    #[serde(default)]
    end_time: Option<f64>,
    /// 1..=6, or 0 for "any lane".
    #[serde(default)]
    line: i64,
    #[serde(default)]
    kind: EventKind,
}

impl RawNote {
    fn into_event(self) -> Option<Event> {
        let Some(time_us) = secs_to_us(self.time) else {
            warn!(time = self.time, "Dropping note with non-finite or out-of-range time");
            return None;
        };
        let target = if self.line == 0 {
            LaneTarget::Any
        } else {
            match u8::try_from(self.line).ok().and_then(Lane::new) {
                Some(lane) => LaneTarget::Lane(lane),
                None if self.kind == EventKind::Mute => LaneTarget::Any,
                None => {
                    warn!(line = self.line, time = self.time, "Dropping note with invalid line");
                    return None;
                }
            }
        };
        Some(Event {
            kind: self.kind,
            target,
            time_us,
            end_time_us: self.end_time.and_then(secs_to_us),
        })
    }
}

/// Chart decoder for the JSON chart format.
pub struct ChartDecoder;

impl ChartDecoder {
    /// Decode a chart file from disk.
    pub fn decode(path: &Path) -> Result<Chart, ChartError> {
        let data = std::fs::read_to_string(path).map_err(|source| ChartError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let chart = Self::decode_str(&data)?;
        info!(path = %path.display(), events = chart.len(), "Loaded chart");
        Ok(chart)
    }

    /// Decode a chart from a JSON string.
    pub fn decode_str(data: &str) -> Result<Chart, ChartError> {
        let raw: RawChart = serde_json::from_str(data)?;
        let global_offset_us = secs_to_us(raw.global_offset).unwrap_or_else(|| {
            warn!(offset = raw.global_offset, "Non-finite global offset, using 0");
            0
        });
        let events = raw
            .notes
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<RawNote>(value) {
                Ok(note) => note.into_event(),
                Err(e) => {
                    warn!(index, error = %e, "Dropping malformed note");
                    None
                }
            })
            .collect();
        Ok(Chart::new(raw.song_name, raw.bpm, global_offset_us, events))
    }
}
