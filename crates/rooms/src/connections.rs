//! Verbindungs-Tabelle
//!
//! Merkt sich pro Verbindung den aktuellen Identitaets-Anspruch und ob
//! sie zwangsweise getrennt wurde. Eine beendete Verbindung bleibt bis
//! zu ihrem Abmelden in der Tabelle, damit spaet eintreffende Ereignisse
//! von ihr verworfen werden koennen.

use dashmap::DashMap;
use plauderei_core::{ConnectionId, IdentityClaim, RoomCode};

#[derive(Debug, Default)]
struct Eintrag {
    anspruch: Option<IdentityClaim>,
    beendet: bool,
}

/// Zuordnung Verbindung → Anspruch
#[derive(Debug, Default)]
pub struct ConnectionTable {
    eintraege: DashMap<ConnectionId, Eintrag>,
}

impl ConnectionTable {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Aktueller Anspruch (falls die Verbindung an einem Raum haengt)
    pub fn anspruch(&self, id: &ConnectionId) -> Option<IdentityClaim> {
        self.eintraege.get(id).and_then(|e| e.anspruch.clone())
    }

    pub fn aktueller_raum(&self, id: &ConnectionId) -> Option<RoomCode> {
        self.eintraege
            .get(id)
            .and_then(|e| e.anspruch.as_ref().map(|a| a.room.clone()))
    }

    /// Gibt true zurueck wenn die Verbindung zwangsweise getrennt wurde
    pub fn ist_beendet(&self, id: &ConnectionId) -> bool {
        self.eintraege.get(id).map(|e| e.beendet).unwrap_or(false)
    }

    /// Setzt den Anspruch; schlaegt fuer beendete Verbindungen fehl
    pub fn raum_setzen(&self, id: ConnectionId, anspruch: IdentityClaim) -> bool {
        let mut eintrag = self.eintraege.entry(id).or_default();
        if eintrag.beendet {
            return false;
        }
        eintrag.anspruch = Some(anspruch);
        true
    }

    /// Loest den Anspruch, aber nur wenn er noch auf diesen Raum zeigt
    pub fn raum_loesen_wenn(&self, id: &ConnectionId, code: &RoomCode) {
        if let Some(mut eintrag) = self.eintraege.get_mut(id) {
            if eintrag.anspruch.as_ref().map(|a| &a.room) == Some(code) {
                eintrag.anspruch = None;
            }
        }
    }

    /// Markiert die Verbindung als terminal getrennt
    pub fn beenden(&self, id: ConnectionId) {
        let mut eintrag = self.eintraege.entry(id).or_default();
        eintrag.beendet = true;
        eintrag.anspruch = None;
    }

    /// Vergisst die Verbindung vollstaendig
    pub fn entfernen(&self, id: &ConnectionId) {
        self.eintraege.remove(id);
    }

    pub fn anzahl(&self) -> usize {
        self.eintraege.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anspruch(raum: &str) -> IdentityClaim {
        IdentityClaim {
            username: "alice".into(),
            room: RoomCode::bereinigen(raum),
            is_owner: false,
        }
    }

    #[test]
    fn setzen_und_loesen() {
        let tabelle = ConnectionTable::neu();
        let id = ConnectionId::new();
        assert!(tabelle.raum_setzen(id, anspruch("r1")));
        assert_eq!(tabelle.aktueller_raum(&id), Some(RoomCode::bereinigen("r1")));

        // Falscher Raum: bleibt bestehen
        tabelle.raum_loesen_wenn(&id, &RoomCode::bereinigen("r2"));
        assert!(tabelle.anspruch(&id).is_some());

        tabelle.raum_loesen_wenn(&id, &RoomCode::bereinigen("r1"));
        assert!(tabelle.anspruch(&id).is_none());
    }

    #[test]
    fn beendete_verbindung_bleibt_beendet() {
        let tabelle = ConnectionTable::neu();
        let id = ConnectionId::new();
        tabelle.raum_setzen(id, anspruch("r1"));
        tabelle.beenden(id);

        assert!(tabelle.ist_beendet(&id));
        assert!(tabelle.anspruch(&id).is_none());
        assert!(!tabelle.raum_setzen(id, anspruch("r2")));

        tabelle.entfernen(&id);
        assert!(!tabelle.ist_beendet(&id));
        assert_eq!(tabelle.anzahl(), 0);
    }
}
