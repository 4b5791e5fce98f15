//! Timing record and replay.
//!
//! Interactive decisions are the only nondeterminism left once the RNG
//! is seeded, so replaying a session needs exactly the answers plus
//! when they happened. Recording writes one timestamp per question to a
//! sink; replaying reads them back and converts consecutive deltas into
//! pacing sleeps.
//!
//! Timestamps are milliseconds since the Unix epoch, 8 bytes
//! little-endian each.

use std::io::{Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Pacing delay used when even pacing is on.
const EVEN_DELAY_MS: u64 = 1;

/// Fault while recording or replaying timing data.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The timing stream ended mid-timestamp.
    #[error("replay timing stream ended unexpectedly")]
    UnexpectedEof,
    /// Underlying I/O failure.
    #[error("replay I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Playback pacing controls. All default off: replay at recorded speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayController {
    /// Skip all delays.
    pub no_delays: bool,
    /// Collapse every delay to a constant.
    pub even_delays: bool,
    /// Scale delays by this factor when nonzero.
    pub speed: f64,
}

impl ReplayController {
    /// Convert a recorded inter-question delta into a pacing delay.
    ///
    /// Even pacing collapses the delta before the speed factor applies,
    /// so both together give a constant scaled delay.
    #[must_use]
    pub fn pace(&self, delta_ms: i64) -> Duration {
        if self.no_delays {
            return Duration::ZERO;
        }
        // Clock skew in the recording can produce a negative delta.
        let mut delay = Duration::from_millis(delta_ms.max(0) as u64);
        if self.even_delays {
            delay = Duration::from_millis(EVEN_DELAY_MS);
        }
        if self.speed != 0.0 {
            delay = delay.mul_f64(self.speed);
        }
        delay
    }
}

/// Timing mode of a networked seat.
///
/// Recording and replaying are structurally exclusive; a seat is in at
/// most one of them.
pub enum ReplaySync<'a> {
    /// Live play, no timing I/O.
    Off,
    /// Live play, writing one timestamp per question.
    Record {
        /// Where timestamps go.
        sink: Box<dyn Write + 'a>,
    },
    /// Replay, reading timestamps and pacing questions.
    Replay {
        /// Where timestamps come from.
        source: Box<dyn Read + 'a>,
        /// Pacing controls.
        controller: ReplayController,
        /// Timestamp of the previous question, once one was read.
        last: Option<i64>,
    },
}

impl<'a> ReplaySync<'a> {
    /// Record timing to `sink`.
    #[must_use]
    pub fn record(sink: impl Write + 'a) -> Self {
        ReplaySync::Record {
            sink: Box::new(sink),
        }
    }

    /// Replay timing from `source` with the given pacing.
    #[must_use]
    pub fn replay(source: impl Read + 'a, controller: ReplayController) -> Self {
        ReplaySync::Replay {
            source: Box::new(source),
            controller,
            last: None,
        }
    }

    /// Account for one question: record its timestamp, or return how
    /// long to wait before releasing its answer.
    ///
    /// The first replayed question never waits; there is no previous
    /// timestamp to measure from.
    pub fn before_question(&mut self) -> Result<Duration, ReplayError> {
        match self {
            ReplaySync::Off => Ok(Duration::ZERO),
            ReplaySync::Record { sink } => {
                let now_ms = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as i64)
                    .unwrap_or(0);
                sink.write_all(&now_ms.to_le_bytes())?;
                Ok(Duration::ZERO)
            }
            ReplaySync::Replay {
                source,
                controller,
                last,
            } => {
                let mut buf = [0u8; 8];
                source.read_exact(&mut buf).map_err(|err| {
                    if err.kind() == std::io::ErrorKind::UnexpectedEof {
                        ReplayError::UnexpectedEof
                    } else {
                        ReplayError::Io(err)
                    }
                })?;
                let stamp = i64::from_le_bytes(buf);

                let delay = match *last {
                    Some(previous) => controller.pace(stamp - previous),
                    None => Duration::ZERO,
                };
                *last = Some(stamp);
                Ok(delay)
            }
        }
    }

    /// Wait out the pacing delay for one question. Timing faults are
    /// logged and treated as zero delay; a broken timing stream never
    /// breaks the session.
    pub fn pace_question(&mut self) {
        match self.before_question() {
            Ok(delay) => {
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            Err(err) => warn!(%err, "replay timing unavailable"),
        }
    }
}

impl std::fmt::Debug for ReplaySync<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplaySync::Off => f.write_str("ReplaySync::Off"),
            ReplaySync::Record { .. } => f.write_str("ReplaySync::Record"),
            ReplaySync::Replay { controller, last, .. } => f
                .debug_struct("ReplaySync::Replay")
                .field("controller", controller)
                .field("last", last)
                .finish(),
        }
    }
}
