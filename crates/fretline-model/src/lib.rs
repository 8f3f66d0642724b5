// Chart data model: events, lanes, chart container and JSON decoding

mod chart;
mod decode;
mod event;
mod lane;

pub use chart::Chart;
pub use decode::{ChartDecoder, ChartError};
pub use event::{Event, EventId, EventKind, MAX_TIME_US, secs_to_us, us_to_secs};
pub use lane::{LANE_COUNT, Lane, LaneTarget};
