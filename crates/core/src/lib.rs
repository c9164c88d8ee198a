//! plauderei-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die Bausteine bereit, die von allen anderen
//! Plauderei-Crates gemeinsam genutzt werden: Verbindungs-IDs, bereinigte
//! Raum-Codes, den Identitaets-Anspruch einer Verbindung und den
//! prozessweiten Fehlertyp.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{PlaudereiError, Result};
pub use types::{ConnectionId, IdentityClaim, RoomCode};
