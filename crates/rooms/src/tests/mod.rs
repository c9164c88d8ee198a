//! Tests fuer den Raum-Kern gegen eine aufzeichnende Delivery


use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use plauderei_core::ConnectionId;

use crate::event::{Delivery, MessageKind, ParticipantList, RoomEvent};
use crate::service::RoomService;

/// Eine aufgezeichnete Zustellung
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Zustellung {
    Ereignis(RoomEvent),
    Trennen,
}

/// Delivery die alles mitschreibt
///
/// Nach `trennen` verhaelt sie sich wie ein geschlossener Transport:
/// weitere Ereignisse fuer diese Verbindung werden abgelehnt.
#[derive(Debug, Default)]
pub(crate) struct Aufzeichnung {
    protokoll: Mutex<Vec<(ConnectionId, Zustellung)>>,
    getrennt: Mutex<HashSet<ConnectionId>>,
}

impl Delivery for Aufzeichnung {
    fn an_verbindung_senden(&self, verbindung: &ConnectionId, ereignis: RoomEvent) -> bool {
        if self.getrennt.lock().contains(verbindung) {
            return false;
        }
        self.protokoll
            .lock()
            .push((*verbindung, Zustellung::Ereignis(ereignis)));
        true
    }

    fn trennen(&self, verbindung: &ConnectionId) {
        self.getrennt.lock().insert(*verbindung);
        self.protokoll.lock().push((*verbindung, Zustellung::Trennen));
    }
}

impl Aufzeichnung {
    pub(crate) fn fuer(&self, id: &ConnectionId) -> Vec<Zustellung> {
        self.protokoll
            .lock()
            .iter()
            .filter(|(v, _)| v == id)
            .map(|(_, z)| z.clone())
            .collect()
    }

    pub(crate) fn ereignisse(&self, id: &ConnectionId) -> Vec<RoomEvent> {
        self.fuer(id)
            .into_iter()
            .filter_map(|z| match z {
                Zustellung::Ereignis(e) => Some(e),
                Zustellung::Trennen => None,
            })
            .collect()
    }

    /// Texte aller Chat-Nachrichten (System und Benutzer) in Empfangsreihenfolge
    pub(crate) fn texte(&self, id: &ConnectionId) -> Vec<String> {
        self.ereignisse(id)
            .into_iter()
            .filter_map(|e| match e {
                RoomEvent::ChatMessage(m) => Some(m.text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn system_texte(&self, id: &ConnectionId) -> Vec<String> {
        self.ereignisse(id)
            .into_iter()
            .filter_map(|e| match e {
                RoomEvent::ChatMessage(m) if m.kind == MessageKind::System => Some(m.text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn snapshots(&self, id: &ConnectionId) -> Vec<ParticipantList> {
        self.ereignisse(id)
            .into_iter()
            .filter_map(|e| match e {
                RoomEvent::Participants(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn letzter_snapshot(&self, id: &ConnectionId) -> Option<ParticipantList> {
        self.snapshots(id).pop()
    }

    pub(crate) fn ist_getrennt(&self, id: &ConnectionId) -> bool {
        self.getrennt.lock().contains(id)
    }

    pub(crate) fn leeren(&self) {
        self.protokoll.lock().clear();
    }
}

pub(crate) fn dienst() -> (Arc<RoomService>, Arc<Aufzeichnung>) {
    let aufzeichnung = Arc::new(Aufzeichnung::default());
    let dienst = RoomService::neu(aufzeichnung.clone());
    (dienst, aufzeichnung)
}

/// Hostet einen Raum und meldet die Host-Verbindung an
pub(crate) fn hosten(dienst: &RoomService, username: &str, raum: &str, passwort: &str) -> ConnectionId {
    let handle = dienst
        .raum_hosten(username, raum, passwort)
        .expect("Hosten fehlgeschlagen");
    let id = ConnectionId::new();
    dienst
        .anmelden(id, handle.anspruch())
        .expect("Anmelden des Hosts fehlgeschlagen");
    id
}

/// Tritt einem Raum bei und meldet eine neue Verbindung an
pub(crate) fn beitreten(dienst: &RoomService, username: &str, raum: &str, passwort: &str) -> ConnectionId {
    let handle = dienst
        .raum_beitreten(username, raum, passwort)
        .expect("Beitritt fehlgeschlagen");
    let id = ConnectionId::new();
    dienst
        .anmelden(id, handle.anspruch())
        .expect("Anmelden fehlgeschlagen");
    id
}

/// Prueft die Invarianten aller Raeume der Registry
pub(crate) fn alle_invarianten_gueltig(dienst: &RoomService) -> bool {
    dienst
        .registry()
        .zellen()
        .iter()
        .all(|zelle| zelle.lesen(|raum| raum.invarianten_gueltig()))
}
