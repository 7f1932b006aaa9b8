//! Geometry decoding: path command streams and vector networks.

mod network;
mod path;

pub use path::PathCommand;

pub(crate) use network::VectorNetwork;
pub(crate) use path::{command_bounds, decode_command_blob, has_drawable, parse_command_text};
