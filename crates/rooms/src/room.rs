//! Raum-Zustand und seine Invarianten
//!
//! Ein `Room` wird ausschliesslich unter der Sperre seiner `RoomCell`
//! veraendert. Alle Methoden hier sind rein synchron und halten die
//! Invarianten selbst ein:
//!
//! - hoechstens ein Besitzer; falls gesetzt ist er Teilnehmer mit `is_owner`
//! - stummgeschaltete Verbindungen sind immer Teilnehmer
//! - Bans haengen am Benutzernamen und ueberleben jede Trennung

use std::collections::{HashMap, HashSet};

use plauderei_core::{ConnectionId, RoomCode};
use subtle::ConstantTimeEq;

use crate::error::{RoomError, RoomResult};
use crate::event::ParticipantEntry;

/// Teilnehmer-Eintrag einer angehaengten Verbindung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub username: String,
    pub is_owner: bool,
    /// Anhaenge-Reihenfolge innerhalb des Raums (fuer Besitz-Uebergabe und Listen)
    folge: u64,
}

/// Ergebnis einer Entfernung aus der Teilnehmerliste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entfernt {
    pub username: String,
    pub war_besitzer: bool,
    pub neuer_besitzer: Option<ConnectionId>,
}

/// Zustand eines Raums
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    password: String,
    locked: bool,
    owner: Option<ConnectionId>,
    banned: HashSet<String>,
    muted: HashSet<ConnectionId>,
    participants: HashMap<ConnectionId, Participant>,
    naechste_folge: u64,
    /// Gesetzt sobald der Besitzer den Raum schliesst; danach ist jede Operation ein No-Op
    geschlossen: bool,
}

impl Room {
    /// Erstellt einen leeren, offenen Raum ohne Besitzer
    pub fn neu(code: RoomCode, password: String) -> Self {
        Self {
            code,
            password,
            locked: false,
            owner: None,
            banned: HashSet::new(),
            muted: HashSet::new(),
            participants: HashMap::new(),
            naechste_folge: 0,
            geschlossen: false,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn ist_gesperrt(&self) -> bool {
        self.locked
    }

    pub fn ist_geschlossen(&self) -> bool {
        self.geschlossen
    }

    pub fn besitzer(&self) -> Option<ConnectionId> {
        self.owner
    }

    pub fn ist_besitzer(&self, verbindung: &ConnectionId) -> bool {
        self.owner.as_ref() == Some(verbindung)
    }

    pub fn ist_gebannt(&self, username: &str) -> bool {
        self.banned.contains(username)
    }

    pub fn ist_stumm(&self, verbindung: &ConnectionId) -> bool {
        self.muted.contains(verbindung)
    }

    pub fn ist_teilnehmer(&self, verbindung: &ConnectionId) -> bool {
        self.participants.contains_key(verbindung)
    }

    pub fn teilnehmer(&self, verbindung: &ConnectionId) -> Option<&Participant> {
        self.participants.get(verbindung)
    }

    pub fn teilnehmer_anzahl(&self) -> usize {
        self.participants.len()
    }

    /// Vergleicht das Raum-Passwort in konstanter Zeit
    pub fn passwort_stimmt(&self, passwort: &str) -> bool {
        self.password.as_bytes().ct_eq(passwort.as_bytes()).into()
    }

    /// Prueft einen Beitritts- oder Wechselversuch
    ///
    /// Reihenfolge: Sperre, Ban, Passwort. Die erste fehlschlagende
    /// Pruefung bricht ab.
    pub fn zutritt_pruefen(&self, username: &str, passwort: &str) -> RoomResult<()> {
        if self.geschlossen {
            return Err(RoomError::RaumNichtGefunden(self.code.to_string()));
        }
        if self.locked {
            return Err(RoomError::RaumGesperrt);
        }
        if self.ist_gebannt(username) {
            return Err(RoomError::Gebannt);
        }
        if !self.passwort_stimmt(passwort) {
            return Err(RoomError::FalschesPasswort);
        }
        Ok(())
    }

    /// Verbindungs-IDs aller Teilnehmer in Anhaenge-Reihenfolge
    pub fn teilnehmer_ids(&self) -> Vec<ConnectionId> {
        let mut eintraege: Vec<_> = self.participants.iter().collect();
        eintraege.sort_by_key(|(_, t)| t.folge);
        eintraege.into_iter().map(|(id, _)| *id).collect()
    }

    /// Fuegt eine Verbindung als Teilnehmer hinzu
    ///
    /// Mit Besitz-Anspruch wird die Verbindung nur dann Besitzer, wenn
    /// der Raum noch keinen hat. Gibt `true` zurueck wenn sie Besitzer wurde.
    pub fn teilnehmer_hinzufuegen(
        &mut self,
        verbindung: ConnectionId,
        username: &str,
        besitz_beansprucht: bool,
    ) -> bool {
        if self.participants.contains_key(&verbindung) {
            return self.ist_besitzer(&verbindung);
        }

        let wird_besitzer = besitz_beansprucht && self.owner.is_none();
        if wird_besitzer {
            self.owner = Some(verbindung);
        }

        let folge = self.naechste_folge;
        self.naechste_folge += 1;
        self.participants.insert(
            verbindung,
            Participant {
                username: username.to_string(),
                is_owner: wird_besitzer,
                folge,
            },
        );
        wird_besitzer
    }

    /// Entfernt eine Verbindung aus Teilnehmern und Mute-Liste
    ///
    /// War sie Besitzer, geht der Besitz an den am laengsten anwesenden
    /// verbleibenden Teilnehmer. Idempotent: `None` wenn nicht vorhanden.
    pub fn teilnehmer_entfernen(&mut self, verbindung: &ConnectionId) -> Option<Entfernt> {
        let teilnehmer = self.participants.remove(verbindung)?;
        self.muted.remove(verbindung);

        let war_besitzer = self.ist_besitzer(verbindung);
        let mut neuer_besitzer = None;
        if war_besitzer {
            self.owner = None;
            let nachfolger = self
                .participants
                .iter_mut()
                .min_by_key(|(_, t)| t.folge)
                .map(|(id, t)| {
                    t.is_owner = true;
                    *id
                });
            self.owner = nachfolger;
            neuer_besitzer = nachfolger;
        }

        Some(Entfernt {
            username: teilnehmer.username,
            war_besitzer,
            neuer_besitzer,
        })
    }

    /// Setzt oder entfernt die Stummschaltung eines Teilnehmers
    ///
    /// Gibt `false` zurueck wenn die Verbindung kein Teilnehmer ist.
    pub fn stumm_setzen(&mut self, verbindung: ConnectionId, stumm: bool) -> bool {
        if !self.participants.contains_key(&verbindung) {
            return false;
        }
        if stumm {
            self.muted.insert(verbindung);
        } else {
            self.muted.remove(&verbindung);
        }
        true
    }

    /// Bannt einen Benutzernamen fuer die Lebensdauer des Raums
    pub fn bannen(&mut self, username: &str) {
        self.banned.insert(username.to_string());
    }

    /// Schaltet die Sperre um und gibt den neuen Zustand zurueck
    pub fn sperre_umschalten(&mut self) -> bool {
        self.locked = !self.locked;
        self.locked
    }

    /// Ersetzt das Raum-Passwort; bestehende Verbindungen bleiben unberuehrt
    pub fn passwort_setzen(&mut self, passwort: String) {
        self.password = passwort;
    }

    /// Schliesst den Raum und gibt alle bisherigen Teilnehmer zurueck
    pub fn schliessen(&mut self) -> Vec<ConnectionId> {
        let betroffene = self.teilnehmer_ids();
        self.participants.clear();
        self.muted.clear();
        self.owner = None;
        self.geschlossen = true;
        betroffene
    }

    /// Berechnet die Teilnehmerliste (identisch fuer alle Empfaenger)
    pub fn ansicht(&self) -> Vec<ParticipantEntry> {
        self.teilnehmer_ids()
            .into_iter()
            .filter_map(|id| {
                self.participants.get(&id).map(|t| ParticipantEntry {
                    connection_id: id,
                    username: t.username.clone(),
                    is_owner: t.is_owner,
                    is_muted: self.muted.contains(&id),
                })
            })
            .collect()
    }

    /// Prueft alle Invarianten (fuer Tests und Debug-Assertions)
    pub fn invarianten_gueltig(&self) -> bool {
        let besitzer_eintraege: Vec<_> = self
            .participants
            .iter()
            .filter(|(_, t)| t.is_owner)
            .map(|(id, _)| *id)
            .collect();

        let besitz_konsistent = match self.owner {
            Some(owner) => besitzer_eintraege == [owner],
            None => besitzer_eintraege.is_empty(),
        };
        let mute_konsistent = self.muted.iter().all(|id| self.participants.contains_key(id));

        besitz_konsistent && mute_konsistent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raum() -> Room {
        Room::neu(RoomCode::bereinigen("r1"), "p1".into())
    }

    #[test]
    fn erster_besitz_anspruch_gewinnt() {
        let mut r = raum();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        assert!(r.teilnehmer_hinzufuegen(a, "alice", true));
        assert!(!r.teilnehmer_hinzufuegen(b, "alice", true));
        assert_eq!(r.besitzer(), Some(a));
        assert!(!r.teilnehmer(&b).unwrap().is_owner);
        assert!(r.invarianten_gueltig());
    }

    #[test]
    fn besitz_geht_an_fruehesten_teilnehmer() {
        let mut r = raum();
        let owner = ConnectionId::new();
        let zweiter = ConnectionId::new();
        let dritter = ConnectionId::new();
        r.teilnehmer_hinzufuegen(owner, "alice", true);
        r.teilnehmer_hinzufuegen(zweiter, "bob", false);
        r.teilnehmer_hinzufuegen(dritter, "carol", false);

        let entfernt = r.teilnehmer_entfernen(&owner).unwrap();
        assert!(entfernt.war_besitzer);
        assert_eq!(entfernt.neuer_besitzer, Some(zweiter));
        assert_eq!(r.besitzer(), Some(zweiter));
        assert!(r.teilnehmer(&zweiter).unwrap().is_owner);
        assert!(r.invarianten_gueltig());
    }

    #[test]
    fn letzter_besitzer_hinterlaesst_leeren_raum() {
        let mut r = raum();
        let owner = ConnectionId::new();
        r.teilnehmer_hinzufuegen(owner, "alice", true);

        let entfernt = r.teilnehmer_entfernen(&owner).unwrap();
        assert_eq!(entfernt.neuer_besitzer, None);
        assert_eq!(r.besitzer(), None);
        assert_eq!(r.teilnehmer_anzahl(), 0);
        assert!(!r.ist_geschlossen(), "Leere Raeume bleiben bestehen");
    }

    #[test]
    fn entfernen_ist_idempotent_und_raeumt_mute() {
        let mut r = raum();
        let a = ConnectionId::new();
        r.teilnehmer_hinzufuegen(a, "bob", false);
        assert!(r.stumm_setzen(a, true));

        assert!(r.teilnehmer_entfernen(&a).is_some());
        assert!(r.teilnehmer_entfernen(&a).is_none());
        assert!(!r.ist_stumm(&a));
        assert!(r.invarianten_gueltig());
    }

    #[test]
    fn stumm_nur_fuer_teilnehmer() {
        let mut r = raum();
        assert!(!r.stumm_setzen(ConnectionId::new(), true));
        assert!(r.invarianten_gueltig());
    }

    #[test]
    fn zutritt_reihenfolge() {
        let mut r = raum();
        r.bannen("mallory");
        r.sperre_umschalten();

        // Sperre wird vor Ban und Passwort geprueft
        assert_eq!(r.zutritt_pruefen("mallory", "falsch"), Err(RoomError::RaumGesperrt));

        r.sperre_umschalten();
        assert_eq!(r.zutritt_pruefen("mallory", "falsch"), Err(RoomError::Gebannt));
        assert_eq!(r.zutritt_pruefen("bob", "falsch"), Err(RoomError::FalschesPasswort));
        assert_eq!(r.zutritt_pruefen("bob", "p1"), Ok(()));
    }

    #[test]
    fn passwort_wechsel_wirkt_nur_auf_neue_versuche() {
        let mut r = raum();
        let a = ConnectionId::new();
        r.teilnehmer_hinzufuegen(a, "alice", true);
        r.passwort_setzen("p2".into());

        assert!(r.ist_teilnehmer(&a));
        assert!(!r.passwort_stimmt("p1"));
        assert!(r.passwort_stimmt("p2"));
    }

    #[test]
    fn ansicht_in_anhaenge_reihenfolge() {
        let mut r = raum();
        let ids: Vec<_> = (0..5).map(|_| ConnectionId::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            r.teilnehmer_hinzufuegen(*id, &format!("u{i}"), i == 0);
        }
        r.stumm_setzen(ids[2], true);

        let ansicht = r.ansicht();
        let reihenfolge: Vec<_> = ansicht.iter().map(|e| e.connection_id).collect();
        assert_eq!(reihenfolge, ids);
        assert!(ansicht[0].is_owner);
        assert!(ansicht[2].is_muted);
        assert!(!ansicht[1].is_muted);
    }

    #[test]
    fn schliessen_leert_alles() {
        let mut r = raum();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        r.teilnehmer_hinzufuegen(a, "alice", true);
        r.teilnehmer_hinzufuegen(b, "bob", false);

        let betroffene = r.schliessen();
        assert_eq!(betroffene, vec![a, b]);
        assert!(r.ist_geschlossen());
        assert_eq!(r.besitzer(), None);
        assert!(matches!(
            r.zutritt_pruefen("bob", "p1"),
            Err(RoomError::RaumNichtGefunden(_))
        ));
    }
}
