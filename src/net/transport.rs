//! Answer transport.
//!
//! Answers cross the wire as flat sequences of integer items, grouped
//! into frames. `AnswerTransport` abstracts the carrier: an in-process
//! loopback for tests, a channel pair for same-process seats and a
//! bincode-framed byte stream for real connections.
//!
//! The send side batches items between `begin_answer` and `flush`; the
//! receive side consumes items one at a time and signals question
//! boundaries with `advance_question`.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::mpsc::{Receiver, Sender};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// One unit on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    /// A complete answer: the flat integer items of one response.
    Answer(Vec<i64>),
    /// The asker moved on to the next question.
    NextQuestion,
}

/// Carrier for answer items and question boundaries.
pub trait AnswerTransport {
    /// Start a new outgoing answer.
    fn begin_answer(&mut self);

    /// Append one item to the outgoing answer.
    fn push_item(&mut self, item: i64);

    /// Transmit the outgoing answer.
    fn flush(&mut self);

    /// Read the next incoming item; `None` when the peer is gone.
    fn next_item(&mut self) -> Option<i64>;

    /// Announce that the current question is over.
    fn advance_question(&mut self);
}

/// In-process transport: everything sent comes straight back.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    pending: Vec<i64>,
    queue: VecDeque<i64>,
    /// Question boundaries announced so far.
    pub questions_advanced: u32,
}

impl LoopbackTransport {
    /// Create an empty loopback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed incoming items directly, as if a peer had answered.
    pub fn seed(&mut self, items: impl IntoIterator<Item = i64>) {
        self.queue.extend(items);
    }
}

impl AnswerTransport for LoopbackTransport {
    fn begin_answer(&mut self) {
        self.pending.clear();
    }

    fn push_item(&mut self, item: i64) {
        self.pending.push(item);
    }

    fn flush(&mut self) {
        self.queue.extend(self.pending.drain(..));
    }

    fn next_item(&mut self) -> Option<i64> {
        self.queue.pop_front()
    }

    fn advance_question(&mut self) {
        self.questions_advanced += 1;
    }
}

/// Transport over a pair of in-process channels.
///
/// Incoming `NextQuestion` frames are dropped: on the answering side a
/// question boundary carries no items.
pub struct ChannelTransport {
    sender: Sender<Frame>,
    receiver: Receiver<Frame>,
    pending: Vec<i64>,
    incoming: VecDeque<i64>,
}

impl ChannelTransport {
    /// Wrap a send/receive channel pair.
    #[must_use]
    pub fn new(sender: Sender<Frame>, receiver: Receiver<Frame>) -> Self {
        Self {
            sender,
            receiver,
            pending: Vec::new(),
            incoming: VecDeque::new(),
        }
    }

    /// A connected pair of transports, each seeing the other's frames.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = std::sync::mpsc::channel();
        let (tx_b, rx_a) = std::sync::mpsc::channel();
        (Self::new(tx_a, rx_a), Self::new(tx_b, rx_b))
    }

    fn send(&mut self, frame: Frame) {
        // A closed peer is a disconnect, observed later as exhausted
        // items; sending into it is a no-op.
        if self.sender.send(frame).is_err() {
            warn!("answer channel closed, frame dropped");
        }
    }
}

impl AnswerTransport for ChannelTransport {
    fn begin_answer(&mut self) {
        self.pending.clear();
    }

    fn push_item(&mut self, item: i64) {
        self.pending.push(item);
    }

    fn flush(&mut self) {
        let items = std::mem::take(&mut self.pending);
        trace!(len = items.len(), "answer frame out");
        self.send(Frame::Answer(items));
    }

    fn next_item(&mut self) -> Option<i64> {
        loop {
            if let Some(item) = self.incoming.pop_front() {
                return Some(item);
            }
            match self.receiver.recv().ok()? {
                Frame::Answer(items) => self.incoming.extend(items),
                Frame::NextQuestion => {}
            }
        }
    }

    fn advance_question(&mut self) {
        self.send(Frame::NextQuestion);
    }
}

/// Transport over a byte stream, one bincode-encoded [`Frame`] at a
/// time.
pub struct StreamTransport<R, W> {
    reader: R,
    writer: W,
    pending: Vec<i64>,
    incoming: VecDeque<i64>,
}

impl<R: Read, W: Write> StreamTransport<R, W> {
    /// Wrap a reader/writer pair.
    #[must_use]
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: Vec::new(),
            incoming: VecDeque::new(),
        }
    }

    /// Unwrap back into the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn send(&mut self, frame: &Frame) {
        if let Err(err) = bincode::serialize_into(&mut self.writer, frame) {
            warn!(%err, "answer stream write failed, frame dropped");
        }
    }
}

impl<R: Read, W: Write> AnswerTransport for StreamTransport<R, W> {
    fn begin_answer(&mut self) {
        self.pending.clear();
    }

    fn push_item(&mut self, item: i64) {
        self.pending.push(item);
    }

    fn flush(&mut self) {
        let items = std::mem::take(&mut self.pending);
        self.send(&Frame::Answer(items));
    }

    fn next_item(&mut self) -> Option<i64> {
        loop {
            if let Some(item) = self.incoming.pop_front() {
                return Some(item);
            }
            match bincode::deserialize_from(&mut self.reader) {
                Ok(Frame::Answer(items)) => self.incoming.extend(items),
                Ok(Frame::NextQuestion) => {}
                Err(_) => return None,
            }
        }
    }

    fn advance_question(&mut self) {
        self.send(&Frame::NextQuestion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_round_trip() {
        let mut transport = LoopbackTransport::new();

        transport.begin_answer();
        transport.push_item(1);
        transport.push_item(-2);
        transport.flush();

        assert_eq!(transport.next_item(), Some(1));
        assert_eq!(transport.next_item(), Some(-2));
        assert_eq!(transport.next_item(), None);
    }

    #[test]
    fn test_loopback_begin_discards_unflushed() {
        let mut transport = LoopbackTransport::new();

        transport.begin_answer();
        transport.push_item(7);
        transport.begin_answer();
        transport.push_item(9);
        transport.flush();

        assert_eq!(transport.next_item(), Some(9));
        assert_eq!(transport.next_item(), None);
    }

    #[test]
    fn test_channel_pair_round_trip() {
        let (mut a, mut b) = ChannelTransport::pair();

        a.begin_answer();
        a.push_item(42);
        a.flush();

        assert_eq!(b.next_item(), Some(42));
    }

    #[test]
    fn test_channel_skips_question_frames() {
        let (mut a, mut b) = ChannelTransport::pair();

        a.advance_question();
        a.begin_answer();
        a.push_item(5);
        a.flush();

        assert_eq!(b.next_item(), Some(5));
    }

    #[test]
    fn test_channel_disconnect_yields_none() {
        let (a, mut b) = ChannelTransport::pair();
        drop(a);

        assert_eq!(b.next_item(), None);
    }

    #[test]
    fn test_stream_round_trip() {
        let mut buf = Vec::new();
        {
            let mut out = StreamTransport::new(std::io::empty(), &mut buf);
            out.begin_answer();
            out.push_item(1);
            out.push_item(2);
            out.flush();
            out.advance_question();
        }

        let mut inbound = StreamTransport::new(buf.as_slice(), std::io::sink());
        assert_eq!(inbound.next_item(), Some(1));
        assert_eq!(inbound.next_item(), Some(2));
        // Trailing NextQuestion frame is skipped; stream end is None.
        assert_eq!(inbound.next_item(), None);
    }
}
