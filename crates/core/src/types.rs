//! Gemeinsame Identifikationstypen fuer Plauderei
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Verbindungen und Raum-Codes zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige ID einer Echtzeit-Verbindung
///
/// Jede TCP-Verbindung bekommt beim Accept eine neue ID. Mitgliedschaft,
/// Mute und Besitz haengen an dieser ID, Bans dagegen am Benutzernamen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Bereinigter Raum-Code
///
/// Enthaelt ausschliesslich `[A-Za-z0-9_-]`. Alle anderen Zeichen werden
/// vor jedem Registry-Zugriff entfernt, zwei unterschiedliche Eingaben
/// mit gleichem bereinigtem Ergebnis bezeichnen also denselben Raum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Bereinigt eine Roh-Eingabe zu einem Raum-Code
    ///
    /// Das Ergebnis kann leer sein; Aufrufer pruefen das mit [`RoomCode::ist_leer`].
    pub fn bereinigen(roh: &str) -> Self {
        Self(
            roh.trim()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect(),
        )
    }

    /// Gibt true zurueck wenn nach der Bereinigung nichts uebrig blieb
    pub fn ist_leer(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identitaets-Anspruch einer Verbindung
///
/// Wird von der Lebenszyklus-Schicht (Host/Join/Switch) festgelegt bevor
/// sich die Verbindung an einen Raum anhaengt. Der Kern behandelt ihn als
/// opakes Tripel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    pub username: String,
    pub room: RoomCode,
    /// Anspruch auf Besitz (nur beim Hosten gesetzt)
    pub is_owner: bool,
}
