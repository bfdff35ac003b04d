pub mod codec;
mod protocol;

pub use codec::{CodecError, EntityRecord, decode_frame, encode_frame};
pub use protocol::{
    ClientMessage, DEFAULT_INPUT_RATE, DEFAULT_PORT, DEFAULT_TICK_RATE, ProtocolError,
    ServerMessage,
};
