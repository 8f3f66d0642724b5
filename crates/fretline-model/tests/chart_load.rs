use std::io::Write;

use fretline_model::{Chart, ChartDecoder, Event, EventKind, Lane, LaneTarget};
use proptest::prelude::*;

#[test]
fn decode_chart_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "songName": "file", "bpm": 90.0, "notes": [
            {{ "time": 0.5, "line": 1 }},
            {{ "time": 0.25, "line": 2, "kind": "tap" }}
        ] }}"#
    )
    .unwrap();

    let chart = ChartDecoder::decode(file.path()).unwrap();
    assert_eq!(chart.song_name(), "file");
    assert_eq!(chart.len(), 2);
    assert_eq!(chart.events()[0].kind, EventKind::Tap);
    assert_eq!(chart.events()[0].time_us, 250_000);
}

fn arb_event() -> impl Strategy<Value = Event> {
    let kind = prop_oneof![
        Just(EventKind::Normal),
        Just(EventKind::Long),
        Just(EventKind::Mute),
        Just(EventKind::Tap),
    ];
    let target = prop_oneof![
        Just(LaneTarget::Any),
        (1u8..=6).prop_map(|n| LaneTarget::Lane(Lane::new(n).unwrap())),
    ];
    (
        kind,
        target,
        -1_000_000i64..10_000_000,
        proptest::option::of(-1_000_000i64..12_000_000),
    )
        .prop_map(|(kind, target, time_us, end_time_us)| Event {
            kind,
            target,
            time_us,
            end_time_us,
        })
}

proptest! {
    #[test]
    fn built_chart_is_sorted_and_sane(events in proptest::collection::vec(arb_event(), 0..64)) {
        let chart = Chart::new("prop", 120.0, 0, events);
        for pair in chart.events().windows(2) {
            let a = (pair[0].time_us, pair[0].kind, pair[0].target);
            let b = (pair[1].time_us, pair[1].kind, pair[1].target);
            prop_assert!(a <= b);
        }
        for ev in chart.events() {
            prop_assert!(ev.time_us >= 0);
            prop_assert_eq!(ev.kind.is_lane_bound(), !ev.target.is_any());
            match ev.end_time_us {
                Some(end) => {
                    prop_assert_eq!(ev.kind, EventKind::Long);
                    prop_assert!(end > ev.time_us);
                }
                None => prop_assert_ne!(ev.kind, EventKind::Long),
            }
        }
    }
}
