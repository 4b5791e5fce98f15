//! Timing record/replay tests.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use relay_ccg::ui::QueuedUiProxy;
use relay_ccg::{
    LoopbackTransport, NetworkUiProxy, PlayerId, Prompt, ReplayController, ReplayError,
    ReplaySync, UiProxy,
};

/// Write end over a shared buffer, so the test can inspect what the
/// recorder produced.
struct SharedSink(Rc<RefCell<Vec<u8>>>);

impl Write for SharedSink {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn stamps(values: &[i64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[test]
fn recording_writes_one_stamp_per_question() {
    let buf = Rc::new(RefCell::new(Vec::new()));
    let mut sync = ReplaySync::record(SharedSink(buf.clone()));

    for _ in 0..4 {
        assert_eq!(sync.before_question().unwrap(), Duration::ZERO);
    }

    let recorded = buf.borrow();
    assert_eq!(recorded.len(), 32);

    // Stamps are non-decreasing millisecond wall-clock times.
    let values: Vec<i64> = recorded
        .chunks_exact(8)
        .map(|c| i64::from_le_bytes(c.try_into().unwrap()))
        .collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert!(values[0] > 0);
}

#[test]
fn replay_paces_by_recorded_deltas() {
    let t0 = 1_700_000_000_000i64;
    let data = stamps(&[t0, t0 + 100, t0 + 250]);
    let mut sync = ReplaySync::replay(data.as_slice(), ReplayController::default());

    assert_eq!(sync.before_question().unwrap(), Duration::ZERO);
    assert_eq!(sync.before_question().unwrap(), Duration::from_millis(100));
    assert_eq!(sync.before_question().unwrap(), Duration::from_millis(150));
}

#[test]
fn replay_speed_scales_deltas() {
    let t0 = 1_700_000_000_000i64;
    let data = stamps(&[t0, t0 + 200]);
    let controller = ReplayController {
        speed: 0.5,
        ..Default::default()
    };
    let mut sync = ReplaySync::replay(data.as_slice(), controller);

    assert_eq!(sync.before_question().unwrap(), Duration::ZERO);
    assert_eq!(sync.before_question().unwrap(), Duration::from_millis(100));
}

#[test]
fn replay_even_pacing_is_constant() {
    let t0 = 1_700_000_000_000i64;
    let data = stamps(&[t0, t0 + 5_000, t0 + 5_010]);
    let controller = ReplayController {
        even_delays: true,
        ..Default::default()
    };
    let mut sync = ReplaySync::replay(data.as_slice(), controller);

    sync.before_question().unwrap();
    assert_eq!(sync.before_question().unwrap(), Duration::from_millis(1));
    assert_eq!(sync.before_question().unwrap(), Duration::from_millis(1));
}

#[test]
fn replay_clock_skew_never_waits_backwards() {
    let t0 = 1_700_000_000_000i64;
    let data = stamps(&[t0, t0 - 500]);
    let mut sync = ReplaySync::replay(data.as_slice(), ReplayController::default());

    sync.before_question().unwrap();
    assert_eq!(sync.before_question().unwrap(), Duration::ZERO);
}

#[test]
fn exhausted_timing_stream_is_an_eof() {
    let t0 = 1_700_000_000_000i64;
    let data = stamps(&[t0]);
    let mut sync = ReplaySync::replay(data.as_slice(), ReplayController::default());

    sync.before_question().unwrap();
    assert!(matches!(
        sync.before_question(),
        Err(ReplayError::UnexpectedEof)
    ));
}

#[test]
fn recorded_session_replays_the_same_answers() {
    let timing = Rc::new(RefCell::new(Vec::new()));

    // Live session, recording.
    let answers = {
        let mut local = QueuedUiProxy::new();
        local.push_multi(Some(1));
        local.push_multi(Some(0));
        let mut proxy = NetworkUiProxy::new(local, LoopbackTransport::new(), PlayerId::new(0))
            .with_sync(ReplaySync::record(SharedSink(timing.clone())));

        vec![
            proxy.ask_multiple_choice(&Prompt::new("q1"), &Prompt::yes_no()),
            proxy.ask_multiple_choice(&Prompt::new("q2"), &Prompt::yes_no()),
        ]
    };
    assert_eq!(answers, vec![Some(1), Some(0)]);
    assert_eq!(timing.borrow().len(), 16);

    // Replayed session: same local answers, recorded timing, no delays.
    let recorded = timing.borrow().clone();
    let controller = ReplayController {
        no_delays: true,
        ..Default::default()
    };
    let mut local = QueuedUiProxy::new();
    local.push_multi(Some(1));
    local.push_multi(Some(0));
    let mut proxy = NetworkUiProxy::new(local, LoopbackTransport::new(), PlayerId::new(0))
        .with_sync(ReplaySync::replay(std::io::Cursor::new(recorded), controller));

    let replayed = vec![
        proxy.ask_multiple_choice(&Prompt::new("q1"), &Prompt::yes_no()),
        proxy.ask_multiple_choice(&Prompt::new("q2"), &Prompt::yes_no()),
    ];
    assert_eq!(replayed, answers);
}

#[test]
fn broken_timing_stream_does_not_break_the_session() {
    // Empty timing source: every question hits EOF, answers still flow.
    let mut local = QueuedUiProxy::new();
    local.push_multi(Some(1));
    let mut proxy = NetworkUiProxy::new(local, LoopbackTransport::new(), PlayerId::new(0))
        .with_sync(ReplaySync::replay(
            std::io::empty(),
            ReplayController::default(),
        ));

    let answer = proxy.ask_multiple_choice(&Prompt::new("q"), &Prompt::yes_no());
    assert_eq!(answer, Some(1));
}
