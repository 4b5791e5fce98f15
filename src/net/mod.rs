//! Networked decisions: transport, wire codec, timing record/replay.

pub mod proxy;
pub mod replay;
pub mod transport;

pub use proxy::{
    decode_choice_answer, decode_multi_answer, decode_usage_answer, encode_choice_answer,
    encode_multi_answer, encode_usage_answer, NetworkUiProxy,
};
pub use replay::{ReplayController, ReplayError, ReplaySync};
pub use transport::{AnswerTransport, ChannelTransport, Frame, LoopbackTransport, StreamTransport};
