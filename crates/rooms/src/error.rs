//! Fehlertypen fuer Raum-Lebenszyklus und Besitzer-Aktionen
//!
//! Alle Fehler sind diskriminierte Ergebnisse fuer den Aufrufer. Der Kern
//! selbst bricht nie ab; Inkonsistenzen (z.B. Abmelden einer unbekannten
//! Verbindung) werden als No-Op behandelt und gar nicht erst zum Fehler.

use thiserror::Error;

/// Grobe Einordnung eines Fehlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FehlerKategorie {
    /// Pflichtfeld fehlt
    Validierung,
    /// Gesperrt, gebannt, falsches Passwort, kein Besitzer, getrennt
    Autorisierung,
    /// Raum-Code bereits vergeben
    Konflikt,
    /// Raum existiert nicht (mehr)
    NichtGefunden,
}

/// Fehlertyp fuer Raum-Operationen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Alle Felder sind erforderlich")]
    FehlendeFelder,

    #[error("Raum-Code bereits vergeben: {0}")]
    RaumCodeVergeben(String),

    #[error("Raum nicht gefunden: {0}")]
    RaumNichtGefunden(String),

    #[error("Raum ist vom Besitzer gesperrt")]
    RaumGesperrt,

    #[error("Benutzer ist in diesem Raum gebannt")]
    Gebannt,

    #[error("Falsches Raum-Passwort")]
    FalschesPasswort,

    #[error("Nur der Besitzer darf diese Aktion ausfuehren")]
    KeinBesitzer,

    #[error("Verbindung wurde zwangsweise getrennt")]
    VerbindungBeendet,
}

impl RoomError {
    /// Ordnet den Fehler einer Kategorie zu
    pub fn kategorie(&self) -> FehlerKategorie {
        match self {
            Self::FehlendeFelder => FehlerKategorie::Validierung,
            Self::RaumCodeVergeben(_) => FehlerKategorie::Konflikt,
            Self::RaumNichtGefunden(_) => FehlerKategorie::NichtGefunden,
            Self::RaumGesperrt
            | Self::Gebannt
            | Self::FalschesPasswort
            | Self::KeinBesitzer
            | Self::VerbindungBeendet => FehlerKategorie::Autorisierung,
        }
    }

    /// Maschinenlesbarer Code fuer Protokoll-Antworten und Metrik-Labels
    pub fn code(&self) -> &'static str {
        match self {
            Self::FehlendeFelder => "MISSING_FIELDS",
            Self::RaumCodeVergeben(_) => "ROOM_CODE_TAKEN",
            Self::RaumNichtGefunden(_) => "ROOM_NOT_FOUND",
            Self::RaumGesperrt => "ROOM_LOCKED",
            Self::Gebannt => "BANNED",
            Self::FalschesPasswort => "WRONG_PASSWORD",
            Self::KeinBesitzer => "NOT_OWNER",
            Self::VerbindungBeendet => "CONNECTION_CLOSED",
        }
    }
}

/// Result-Typ fuer Raum-Operationen
pub type RoomResult<T> = Result<T, RoomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = RoomError::RaumNichtGefunden("r1".into());
        assert_eq!(e.to_string(), "Raum nicht gefunden: r1");
    }

    #[test]
    fn kategorien() {
        assert_eq!(RoomError::FehlendeFelder.kategorie(), FehlerKategorie::Validierung);
        assert_eq!(RoomError::Gebannt.kategorie(), FehlerKategorie::Autorisierung);
        assert_eq!(RoomError::KeinBesitzer.kategorie(), FehlerKategorie::Autorisierung);
        assert_eq!(
            RoomError::RaumCodeVergeben("x".into()).kategorie(),
            FehlerKategorie::Konflikt
        );
    }

    #[test]
    fn codes_sind_stabil() {
        assert_eq!(RoomError::FalschesPasswort.code(), "WRONG_PASSWORD");
        assert_eq!(RoomError::RaumGesperrt.code(), "ROOM_LOCKED");
    }
}
