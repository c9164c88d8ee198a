//! plauderei-signaling – TCP Control Layer
//!
//! Dieser Crate verbindet Clients mit dem Raum-Kern. Er verwaltet
//! TCP-Verbindungen, uebersetzt Control-Nachrichten in Aufrufe auf den
//! `RoomService`/`FileService` und stellt Raum-Ereignisse ueber
//! Postfaecher an die Verbindungen zu.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SignalingServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task, eigene ConnectionId)
//!     |
//!     v
//! MessageDispatcher
//!     |
//!     +-- RoomHandler       (Host, Join, Wechsel, Schliessen, Passwort)
//!     +-- ChatHandler       (Chat senden)
//!     +-- ModerationHandler (Kick, Ban, Mute, Unmute, Sperre, Chat leeren)
//!     +-- FileHandler       (Upload, Download)
//!
//! EventBroadcaster – Postfach pro Verbindung, `Delivery` des Raum-Kerns
//! ```

pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod server_state;
pub mod tcp;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use broadcast::EventBroadcaster;
pub use connection::ClientConnection;
pub use dispatcher::MessageDispatcher;
pub use error::{SignalingError, SignalingResult};
pub use server_state::{SignalingConfig, SignalingState};
pub use tcp::SignalingServer;
