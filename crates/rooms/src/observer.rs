//! Beobachter-Schnittstelle fuer Metriken
//!
//! Der Kern kennt keinen Metrik-Stack. Der Server haengt hier einen
//! Adapter ein, der die Aufrufe auf Prometheus-Zaehler abbildet.

use crate::error::RoomError;

/// Rueckmeldungen des Kerns ueber Zustandsaenderungen
///
/// Alle Methoden haben leere Standard-Implementierungen und werden
/// ausserhalb jeder Raum-Sperre aufgerufen.
pub trait RoomObserver: Send + Sync {
    fn raum_angelegt(&self) {}
    fn raum_geschlossen(&self) {}
    /// Teilnehmerzahl ueber alle Raeume hat sich um `delta` geaendert
    fn teilnehmer_geaendert(&self, _delta: i64) {}
    fn nachricht_weitergeleitet(&self) {}
    /// Eine Besitzer-Aktion wurde ausgefuehrt (`"kick"`, `"ban"`, ...)
    fn moderation(&self, _aktion: &'static str) {}
    fn beitritt_abgelehnt(&self, _grund: &RoomError) {}
    /// Vom Transport gemeldet: offene Verbindungen haben sich um `delta` geaendert
    fn verbindung_geaendert(&self, _delta: i64) {}
}

/// Beobachter ohne Wirkung
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RoomObserver for NoopObserver {}
