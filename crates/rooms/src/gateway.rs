//! Broadcast-Gateway – Chat-Weiterleitung, Datei-Hinweise, Snapshots

use plauderei_core::{ConnectionId, RoomCode};

use crate::error::{RoomError, RoomResult};
use crate::event::{ChatMessage, MessageKind, ParticipantEntry, RoomEvent};
use crate::service::RoomService;

/// Hinweis an stummgeschaltete Absender
pub const STUMM_HINWEIS: &str = "You are muted by the owner.";

impl RoomService {
    /// Leitet eine Chat-Nachricht an alle Teilnehmer des Raums weiter
    ///
    /// Leere Nachrichten werden verworfen. Stummgeschaltete Absender
    /// erhalten stattdessen privat [`STUMM_HINWEIS`]. Der Text selbst wird
    /// unveraendert weitergegeben. Gibt true zurueck wenn weitergeleitet.
    pub fn chat_nachricht(&self, id: &ConnectionId, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let Some((_, zelle)) = self.raum_der_verbindung(id) else {
            return false;
        };

        let weitergeleitet = zelle
            .bearbeiten(self.delivery(), |raum, outbox| {
                let Some(username) = raum.teilnehmer(id).map(|t| t.username.clone()) else {
                    return false;
                };
                if raum.ist_stumm(id) {
                    let hinweis = ChatMessage::system(raum.code(), STUMM_HINWEIS);
                    outbox.an_verbindung(*id, RoomEvent::ChatMessage(hinweis));
                    return false;
                }
                let nachricht = ChatMessage {
                    username,
                    room: raum.code().clone(),
                    text: text.to_string(),
                    file_url: None,
                    kind: MessageKind::Text,
                };
                outbox.an_raum(raum, RoomEvent::ChatMessage(nachricht));
                true
            })
            .unwrap_or(false);

        if weitergeleitet {
            self.observer.nachricht_weitergeleitet();
            tracing::trace!(verbindung = %id, "Chat-Nachricht weitergeleitet");
        }
        weitergeleitet
    }

    /// Kuendigt eine bereits gespeicherte Datei im Raum an
    ///
    /// Wird vom Datei-Dienst nach dem Speichern aufgerufen.
    pub fn datei_geteilt(&self, raum: &RoomCode, username: &str, dateiname: &str, url: &str) -> bool {
        let Ok(zelle) = self.registry.holen(raum) else {
            return false;
        };
        let gesendet = zelle
            .bearbeiten(self.delivery(), |raum, outbox| {
                let nachricht = ChatMessage {
                    username: username.to_string(),
                    room: raum.code().clone(),
                    text: format!("uploaded a file: {dateiname}"),
                    file_url: Some(url.to_string()),
                    kind: MessageKind::File,
                };
                outbox.an_raum(raum, RoomEvent::ChatMessage(nachricht));
            })
            .is_some();

        if gesendet {
            tracing::debug!(raum = %raum, %username, %dateiname, "Datei angekuendigt");
        }
        gesendet
    }

    /// Sendet jedem Teilnehmer einen frischen, personalisierten Snapshot
    pub fn teilnehmer_senden(&self, raum: &RoomCode) -> RoomResult<()> {
        let zelle = self.registry.holen(raum)?;
        zelle
            .bearbeiten(self.delivery(), |raum, outbox| outbox.teilnehmer_ansicht(raum))
            .ok_or_else(|| RoomError::RaumNichtGefunden(raum.to_string()))
    }

    /// Aktuelle Teilnehmerliste eines Raums (ohne Zustellung)
    pub fn teilnehmer_liste(&self, raum: &RoomCode) -> RoomResult<Vec<ParticipantEntry>> {
        let zelle = self.registry.holen(raum)?;
        Ok(zelle.lesen(|raum| raum.ansicht()))
    }
}
