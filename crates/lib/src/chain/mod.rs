//! Zero-address payloads: hex codec, the transaction writer, and the record reader.

mod payload;
mod record;
mod writer;

pub use payload::{decode_payload, encode_payload, DecodeError};
pub use record::{fetch_record, short_address, TxRecord};
pub use writer::ChainWriter;
