// Server-Sent-Events wire format shared by the demo endpoint and the client

pub mod codec;
pub mod event;

pub use codec::{encode_event, parse_line, EventDecoder, LineBuffer, DATA_PREFIX};
pub use event::{EventType, QueryResult, StreamEvent};
