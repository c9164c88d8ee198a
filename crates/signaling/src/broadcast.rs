//! Event-Broadcaster – Postfaecher aller verbundenen Clients
//!
//! Jede Verbindung bekommt beim Accept ein begrenztes Postfach. Der
//! Broadcaster implementiert die `Delivery`-Schnittstelle des Raum-Kerns:
//! Ereignisse werden nicht-blockierend eingereiht und vom
//! Verbindungs-Task in FIFO-Reihenfolge auf den Socket geschrieben.
//!
//! ## Zwangstrennung
//! `trennen` reiht ein `Ausgehend::Trennen` hinter die bereits
//! eingereihten Nachrichten ein. Ist das Postfach voll, wird stattdessen
//! das Abbruch-Token ausgeloest; der Task leert dann das Postfach und
//! beendet sich.

use dashmap::DashMap;
use plauderei_core::ConnectionId;
use plauderei_protocol::control::{
    ChatKind, ChatMessagePayload, ControlMessage, ControlPayload, ParticipantInfo,
    ParticipantsPayload,
};
use plauderei_rooms::{ChatMessage, Delivery, MessageKind, ParticipantList, RoomEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Standard-Groesse des Postfachs pro Verbindung
pub const STANDARD_POSTFACH_GROESSE: usize = 256;

// ---------------------------------------------------------------------------
// Postfach
// ---------------------------------------------------------------------------

/// Eintrag im Postfach einer Verbindung
#[derive(Debug, Clone)]
pub enum Ausgehend {
    Nachricht(ControlMessage),
    /// Nach allen vorher eingereihten Nachrichten trennen
    Trennen,
}

/// Empfangsseite eines Postfachs (gehoert dem Verbindungs-Task)
#[derive(Debug)]
pub struct Postfach {
    pub rx: mpsc::Receiver<Ausgehend>,
    pub abbruch: CancellationToken,
}

/// Handle auf das Postfach eines verbundenen Clients
#[derive(Clone, Debug)]
struct ClientSender {
    verbindung: ConnectionId,
    tx: mpsc::Sender<Ausgehend>,
    abbruch: CancellationToken,
}

impl ClientSender {
    /// Reiht nicht-blockierend ein
    ///
    /// Gibt `false` zurueck wenn das Postfach voll oder geschlossen ist.
    fn senden(&self, eintrag: Ausgehend) -> bool {
        match self.tx.try_send(eintrag) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(verbindung = %self.verbindung, "Postfach voll, Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(verbindung = %self.verbindung, "Postfach geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Broadcaster fuer alle verbundenen Clients
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<EventBroadcasterInner>,
}

struct EventBroadcasterInner {
    clients: DashMap<ConnectionId, ClientSender>,
    postfach_groesse: usize,
}

impl EventBroadcaster {
    /// Erstellt einen Broadcaster mit der Standard-Postfachgroesse
    pub fn neu() -> Self {
        Self::mit_postfach_groesse(STANDARD_POSTFACH_GROESSE)
    }

    pub fn mit_postfach_groesse(postfach_groesse: usize) -> Self {
        Self {
            inner: Arc::new(EventBroadcasterInner {
                clients: DashMap::new(),
                postfach_groesse: postfach_groesse.max(1),
            }),
        }
    }

    /// Registriert eine Verbindung und gibt ihr Postfach zurueck
    pub fn client_registrieren(&self, verbindung: ConnectionId) -> Postfach {
        let (tx, rx) = mpsc::channel(self.inner.postfach_groesse);
        let abbruch = CancellationToken::new();
        self.inner.clients.insert(
            verbindung,
            ClientSender {
                verbindung,
                tx,
                abbruch: abbruch.clone(),
            },
        );
        tracing::debug!(verbindung = %verbindung, "Client im Broadcaster registriert");
        Postfach { rx, abbruch }
    }

    pub fn client_entfernen(&self, verbindung: &ConnectionId) {
        if self.inner.clients.remove(verbindung).is_some() {
            tracing::debug!(verbindung = %verbindung, "Client aus Broadcaster entfernt");
        }
    }

    /// Sendet eine fertige Protokoll-Nachricht an eine Verbindung
    pub fn an_verbindung(&self, verbindung: &ConnectionId, nachricht: ControlMessage) -> bool {
        match self.inner.clients.get(verbindung) {
            Some(sender) => sender.senden(Ausgehend::Nachricht(nachricht)),
            None => {
                tracing::debug!(verbindung = %verbindung, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    pub fn client_anzahl(&self) -> usize {
        self.inner.clients.len()
    }

    pub fn ist_registriert(&self, verbindung: &ConnectionId) -> bool {
        self.inner.clients.contains_key(verbindung)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::neu()
    }
}

impl Delivery for EventBroadcaster {
    fn an_verbindung_senden(&self, verbindung: &ConnectionId, ereignis: RoomEvent) -> bool {
        self.an_verbindung(verbindung, ereignis_nachricht(ereignis))
    }

    fn trennen(&self, verbindung: &ConnectionId) {
        // Guard vor dem Abbruch freigeben
        let sender = match self.inner.clients.get(verbindung) {
            Some(s) => s.clone(),
            None => return,
        };
        if !sender.senden(Ausgehend::Trennen) {
            sender.abbruch.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Ereignis -> Protokoll
// ---------------------------------------------------------------------------

/// Wandelt ein Raum-Ereignis in eine Server-Push-Nachricht um
pub fn ereignis_nachricht(ereignis: RoomEvent) -> ControlMessage {
    let payload = match ereignis {
        RoomEvent::ChatMessage(m) => ControlPayload::ChatMessage(chat_payload(m)),
        RoomEvent::Participants(liste) => ControlPayload::Participants(teilnehmer_payload(liste)),
        RoomEvent::Kicked => ControlPayload::Kicked,
        RoomEvent::ClearChat => ControlPayload::ClearChat,
    };
    ControlMessage::push(payload)
}

fn chat_payload(m: ChatMessage) -> ChatMessagePayload {
    ChatMessagePayload {
        username: m.username,
        room: m.room,
        text: m.text,
        file_url: m.file_url,
        kind: match m.kind {
            MessageKind::Text => ChatKind::Text,
            MessageKind::System => ChatKind::System,
            MessageKind::File => ChatKind::File,
        },
    }
}

fn teilnehmer_payload(liste: ParticipantList) -> ParticipantsPayload {
    ParticipantsPayload {
        list: liste
            .list
            .into_iter()
            .map(|e| ParticipantInfo {
                connection_id: e.connection_id,
                username: e.username,
                is_owner: e.is_owner,
                is_muted: e.is_muted,
            })
            .collect(),
        is_owner: liste.is_owner,
        locked: liste.locked,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use plauderei_core::RoomCode;
    use plauderei_rooms::ParticipantEntry;

    fn nachricht(text: &str) -> RoomEvent {
        RoomEvent::ChatMessage(ChatMessage::system(&RoomCode::bereinigen("r1"), text))
    }

    #[tokio::test]
    async fn ereignis_landet_im_postfach() {
        let broadcaster = EventBroadcaster::neu();
        let id = ConnectionId::new();
        let mut postfach = broadcaster.client_registrieren(id);
        assert!(broadcaster.ist_registriert(&id));

        assert!(broadcaster.an_verbindung_senden(&id, nachricht("hallo")));

        match postfach.rx.try_recv().expect("Eintrag erwartet") {
            Ausgehend::Nachricht(m) => {
                assert_eq!(m.request_id, 0);
                match m.payload {
                    ControlPayload::ChatMessage(c) => {
                        assert_eq!(c.text, "hallo");
                        assert_eq!(c.kind, ChatKind::System);
                    }
                    anderes => panic!("ChatMessage erwartet, erhalten: {anderes:?}"),
                }
            }
            Ausgehend::Trennen => panic!("Nachricht erwartet"),
        }
    }

    #[tokio::test]
    async fn trennen_kommt_nach_kicked() {
        let broadcaster = EventBroadcaster::neu();
        let id = ConnectionId::new();
        let mut postfach = broadcaster.client_registrieren(id);

        broadcaster.an_verbindung_senden(&id, RoomEvent::Kicked);
        broadcaster.trennen(&id);

        assert!(matches!(
            postfach.rx.try_recv(),
            Ok(Ausgehend::Nachricht(ControlMessage { payload: ControlPayload::Kicked, .. }))
        ));
        assert!(matches!(postfach.rx.try_recv(), Ok(Ausgehend::Trennen)));
        assert!(!postfach.abbruch.is_cancelled());
    }

    #[tokio::test]
    async fn volles_postfach_verwirft_und_bricht_ab() {
        let broadcaster = EventBroadcaster::mit_postfach_groesse(2);
        let id = ConnectionId::new();
        let postfach = broadcaster.client_registrieren(id);

        assert!(broadcaster.an_verbindung_senden(&id, nachricht("1")));
        assert!(broadcaster.an_verbindung_senden(&id, nachricht("2")));
        assert!(!broadcaster.an_verbindung_senden(&id, nachricht("3")));

        broadcaster.trennen(&id);
        assert!(postfach.abbruch.is_cancelled());
    }

    #[test]
    fn unbekannte_verbindung() {
        let broadcaster = EventBroadcaster::neu();
        let id = ConnectionId::new();
        assert!(!broadcaster.an_verbindung_senden(&id, RoomEvent::ClearChat));
        broadcaster.trennen(&id);

        let _postfach = broadcaster.client_registrieren(id);
        broadcaster.client_entfernen(&id);
        assert!(!broadcaster.ist_registriert(&id));
        assert_eq!(broadcaster.client_anzahl(), 0);
    }

    #[test]
    fn teilnehmer_snapshot_wird_uebersetzt() {
        let a = ConnectionId::new();
        let m = ereignis_nachricht(RoomEvent::Participants(ParticipantList {
            list: vec![ParticipantEntry {
                connection_id: a,
                username: "alice".into(),
                is_owner: true,
                is_muted: false,
            }],
            is_owner: true,
            locked: true,
        }));
        match m.payload {
            ControlPayload::Participants(p) => {
                assert_eq!(p.list.len(), 1);
                assert_eq!(p.list[0].connection_id, a);
                assert!(p.is_owner && p.locked);
            }
            anderes => panic!("Participants erwartet, erhalten: {anderes:?}"),
        }
    }
}
