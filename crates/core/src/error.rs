//! Fehlertypen fuer Plauderei
//!
//! Prozessweiter Fehler-Enum fuer alles ausserhalb des Raum-Kerns, das
//! keinen eigenen Fehlertyp hat (derzeit Konfiguration). Der Raum-Kern hat
//! seinen eigenen Fehlertyp, weil er dem Aufrufer diskriminierte
//! Ergebnisse liefert.

use thiserror::Error;

/// Globaler Result-Alias fuer Plauderei
pub type Result<T> = std::result::Result<T, PlaudereiError>;

/// Allgemeine Fehler im Plauderei-System
#[derive(Debug, Error)]
pub enum PlaudereiError {
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),
}

impl PlaudereiError {
    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }
}
