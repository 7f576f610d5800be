//! Archive format registry and tar payload sniffing.
//!
//! # Architecture
//!
//! - `descriptor.rs` - Format descriptors, tool groups and argv templates
//! - `registry.rs` - The ordered format table and filename lookup
//! - `codec.rs` - In-process decoders for single-file codecs
//! - `sniff.rs` - Tar-or-plain classification of ambiguous archives

pub use codec::{Codec, Decoder};
pub use descriptor::{FormatDescriptor, FormatKind, OutputConvention, Pipeline, Slot, ToolGroup};
pub use registry::{by_id, find_format, generic_fallback, plain_tar_name, tar_compound_name};
pub use sniff::{ExternalDecoder, NoExternalDecoder, SniffOutcome, is_tar_payload, sniff};

mod codec;
mod descriptor;
pub mod registry;
pub mod sniff;
