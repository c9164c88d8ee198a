//! plauderei-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle Nachrichten die zwischen Client und Server
//! ausgetauscht werden, sowie das Frame-Format auf der TCP-Verbindung.

pub mod control;
pub mod wire;

pub use control::{ControlMessage, ControlPayload, ErrorCode};
pub use wire::FrameCodec;
