//! Ausgehende Raum-Ereignisse und die Zustell-Schnittstelle zum Transport
//!
//! Der Kern schreibt nie selbst auf Sockets. Jede Mutation sammelt ihre
//! Ereignisse in einem [`Outbox`], der erst nach dem Commit (und nach dem
//! Freigeben der Raum-Sperre) an die [`Delivery`] uebergeben wird.

use plauderei_core::{ConnectionId, RoomCode};
use serde::{Deserialize, Serialize};

use crate::room::Room;

/// Absendername fuer Systemnachrichten
pub const SYSTEM_ABSENDER: &str = "system";

// ---------------------------------------------------------------------------
// Ereignis-Typen
// ---------------------------------------------------------------------------

/// Art einer Chat-Nachricht
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    System,
    File,
}

/// Chat-Nachricht wie sie an die Clients geht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    pub room: RoomCode,
    pub text: String,
    pub file_url: Option<String>,
    pub kind: MessageKind,
}

impl ChatMessage {
    /// Systemnachricht an einen Raum
    pub fn system(room: &RoomCode, text: impl Into<String>) -> Self {
        Self {
            username: SYSTEM_ABSENDER.to_string(),
            room: room.clone(),
            text: text.into(),
            file_url: None,
            kind: MessageKind::System,
        }
    }
}

/// Ein Eintrag der Teilnehmerliste
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub connection_id: ConnectionId,
    pub username: String,
    pub is_owner: bool,
    pub is_muted: bool,
}

/// Teilnehmer-Snapshot fuer genau einen Empfaenger
///
/// `list` ist fuer alle Empfaenger identisch, `is_owner` gibt an ob
/// der Empfaenger selbst der Besitzer ist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantList {
    pub list: Vec<ParticipantEntry>,
    pub is_owner: bool,
    pub locked: bool,
}

/// Alle Ereignisse die der Kern an Verbindungen ausliefert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    ChatMessage(ChatMessage),
    Participants(ParticipantList),
    /// Terminale Benachrichtigung vor einer Zwangstrennung
    Kicked,
    ClearChat,
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Ausgehende Schnittstelle zum Echtzeit-Transport
///
/// Implementierungen duerfen nicht blockieren: sie werden gerufen
/// waehrend die Sendefolge eines Raums gehalten wird.
pub trait Delivery: Send + Sync {
    /// Stellt ein Ereignis an genau eine Verbindung zu
    ///
    /// Gibt `false` zurueck wenn die Verbindung unbekannt oder ihre
    /// Queue voll/geschlossen ist.
    fn an_verbindung_senden(&self, verbindung: &ConnectionId, ereignis: RoomEvent) -> bool;

    /// Trennt eine Verbindung zwangsweise (nach allen bereits eingereihten Ereignissen)
    fn trennen(&self, verbindung: &ConnectionId);

    /// Stellt ein Ereignis an alle Verbindungen eines Raums zu
    ///
    /// Gibt die Anzahl der erfolgreichen Zustellungen zurueck.
    fn an_raum_senden(&self, empfaenger: &[ConnectionId], ereignis: &RoomEvent) -> usize {
        empfaenger
            .iter()
            .filter(|id| self.an_verbindung_senden(id, ereignis.clone()))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Auftrag {
    Verbindung(ConnectionId, RoomEvent),
    Raum(Vec<ConnectionId>, RoomEvent),
    Trennen(ConnectionId),
}

/// Gesammelte Zustell-Auftraege einer einzelnen Mutation
///
/// Die Empfaengerlisten werden beim Einreihen aus dem committeten
/// Zustand berechnet, nicht erst bei der Zustellung.
#[derive(Debug, Default)]
pub struct Outbox {
    auftraege: Vec<Auftrag>,
}

impl Outbox {
    /// Ereignis fuer eine einzelne Verbindung einreihen
    pub fn an_verbindung(&mut self, verbindung: ConnectionId, ereignis: RoomEvent) {
        self.auftraege.push(Auftrag::Verbindung(verbindung, ereignis));
    }

    /// Ereignis fuer alle aktuellen Teilnehmer eines Raums einreihen
    pub fn an_raum(&mut self, raum: &Room, ereignis: RoomEvent) {
        let empfaenger = raum.teilnehmer_ids();
        if empfaenger.is_empty() {
            return;
        }
        self.auftraege.push(Auftrag::Raum(empfaenger, ereignis));
    }

    /// Systemnachricht an alle Teilnehmer einreihen
    pub fn system_an_raum(&mut self, raum: &Room, text: impl Into<String>) {
        let nachricht = ChatMessage::system(raum.code(), text);
        self.an_raum(raum, RoomEvent::ChatMessage(nachricht));
    }

    /// Personalisierten Teilnehmer-Snapshot fuer jeden Empfaenger einreihen
    pub fn teilnehmer_ansicht(&mut self, raum: &Room) {
        let liste = raum.ansicht();
        let besitzer = raum.besitzer();
        for id in raum.teilnehmer_ids() {
            self.auftraege.push(Auftrag::Verbindung(
                id,
                RoomEvent::Participants(ParticipantList {
                    list: liste.clone(),
                    is_owner: besitzer == Some(id),
                    locked: raum.ist_gesperrt(),
                }),
            ));
        }
    }

    /// Zwangstrennung einreihen (nach allen vorherigen Auftraegen)
    pub fn trennen(&mut self, verbindung: ConnectionId) {
        self.auftraege.push(Auftrag::Trennen(verbindung));
    }

    pub fn ist_leer(&self) -> bool {
        self.auftraege.is_empty()
    }

    /// Uebergibt alle Auftraege in Einreihungs-Reihenfolge an den Transport
    pub fn zustellen(self, delivery: &dyn Delivery) {
        for auftrag in self.auftraege {
            match auftrag {
                Auftrag::Verbindung(id, ereignis) => {
                    if !delivery.an_verbindung_senden(&id, ereignis) {
                        tracing::debug!(verbindung = %id, "Zustellung an Verbindung fehlgeschlagen");
                    }
                }
                Auftrag::Raum(empfaenger, ereignis) => {
                    let gesendet = delivery.an_raum_senden(&empfaenger, &ereignis);
                    if gesendet < empfaenger.len() {
                        tracing::debug!(
                            gesendet,
                            empfaenger = empfaenger.len(),
                            "Raum-Zustellung unvollstaendig"
                        );
                    }
                }
                Auftrag::Trennen(id) => delivery.trennen(&id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ereignis_tag_im_json() {
        let json = serde_json::to_string(&RoomEvent::Kicked).unwrap();
        assert_eq!(json, r#"{"type":"kicked"}"#);

        let nachricht = RoomEvent::ChatMessage(ChatMessage::system(
            &RoomCode::bereinigen("r1"),
            "hallo",
        ));
        let json = serde_json::to_string(&nachricht).unwrap();
        assert!(json.contains(r#""type":"chat_message""#));
        assert!(json.contains(r#""username":"system""#));
        assert!(json.contains(r#""kind":"system""#));
    }

    #[test]
    fn leerer_raum_erzeugt_keine_auftraege() {
        let raum = Room::neu(RoomCode::bereinigen("leer"), "pw".into());
        let mut outbox = Outbox::default();
        outbox.system_an_raum(&raum, "niemand da");
        outbox.teilnehmer_ansicht(&raum);
        assert!(outbox.ist_leer());
    }
}
