//! plauderei-rooms – Raum-Registry, Mitgliedschaft und Moderation
//!
//! Dieses Crate ist der zustandsbehaftete Kern von Plauderei. Es kennt
//! weder Sockets noch Frames: eingehende Ereignisse kommen als
//! Methodenaufrufe auf dem [`RoomService`], ausgehende gehen ueber die
//! [`Delivery`]-Schnittstelle an den Transport.
//!
//! ## Architektur
//!
//! ```text
//! Transport (plauderei-signaling)          Datei-Dienst (plauderei-files)
//!     |                                         |
//!     v                                         v
//! RoomService
//!     +-- lifecycle   (Host, Join, Wechsel, Schliessen, Passwort)
//!     +-- membership  (Anmelden, Abmelden, Besitz-Uebergabe)
//!     +-- moderation  (Mute, Kick, Ban, Sperre, Chat leeren)
//!     +-- gateway     (Chat, Datei-Hinweis, Snapshot)
//!     |
//!     v
//! RoomRegistry (DashMap<RoomCode, Arc<RoomCell>>)
//!     |  RoomCell: Zustands-Sperre + Sendefolge-Sperre
//!     v
//! Outbox --> Delivery (nach dem Commit, ohne Zustands-Sperre)
//! ```
//!
//! Besitz geht beim Abmelden des Besitzers an den am laengsten
//! angemeldeten verbleibenden Teilnehmer. Leere Raeume bleiben bestehen
//! bis ihr Besitzer sie schliesst.

pub mod connections;
pub mod error;
pub mod event;
pub mod gateway;
pub mod lifecycle;
pub mod membership;
pub mod moderation;
pub mod observer;
pub mod registry;
pub mod room;
pub mod service;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{FehlerKategorie, RoomError, RoomResult};
pub use event::{
    ChatMessage, Delivery, MessageKind, ParticipantEntry, ParticipantList, RoomEvent,
    SYSTEM_ABSENDER,
};
pub use gateway::STUMM_HINWEIS;
pub use observer::{NoopObserver, RoomObserver};
pub use registry::{RoomCell, RoomRegistry};
pub use room::Room;
pub use service::{RoomHandle, RoomService};
