//! Mitgliedschaft – Anmelden und Abmelden von Verbindungen
//!
//! Anmelden haengt eine Verbindung mit ihrem Identitaets-Anspruch an einen
//! Raum, Abmelden entfernt sie wieder und uebergibt gegebenenfalls den
//! Besitz. Beide Wege sind idempotent.

use plauderei_core::{ConnectionId, IdentityClaim};

use crate::error::{RoomError, RoomResult};
use crate::event::Outbox;
use crate::room::Room;
use crate::service::{RoomHandle, RoomService};

impl RoomService {
    /// Haengt eine Verbindung an den Raum ihres Anspruchs
    ///
    /// Der Besitz-Anspruch greift nur, wenn der Raum aktuell keinen
    /// Besitzer hat. Der Ban wird hier erneut geprueft; ein wiederholtes
    /// Anmelden am selben Raum ist ein No-Op.
    pub fn anmelden(&self, id: ConnectionId, anspruch: IdentityClaim) -> RoomResult<RoomHandle> {
        if self.verbindungen.ist_beendet(&id) {
            return Err(RoomError::VerbindungBeendet);
        }
        let username = anspruch.username.trim().to_string();
        if username.is_empty() || anspruch.room.ist_leer() {
            return Err(RoomError::FehlendeFelder);
        }
        let anspruch = IdentityClaim { username, ..anspruch };

        if let Some(bisher) = self.verbindungen.aktueller_raum(&id) {
            if bisher == anspruch.room {
                let zelle = self.registry.holen(&bisher)?;
                let vorhanden = zelle.lesen(|raum| {
                    raum.teilnehmer(&id).map(|t| RoomHandle {
                        room: bisher.clone(),
                        username: t.username.clone(),
                        is_owner: t.is_owner,
                    })
                });
                if let Some(handle) = vorhanden {
                    return Ok(handle);
                }
            } else {
                self.abmelden_intern(&id);
            }
        }

        let zelle = self.registry.holen(&anspruch.room)?;
        let ergebnis = zelle
            .bearbeiten(self.delivery(), |raum, outbox| {
                if raum.ist_gebannt(&anspruch.username) {
                    return Err(RoomError::Gebannt);
                }
                self.beitreten_intern(raum, outbox, id, &anspruch)
            })
            .ok_or_else(|| RoomError::RaumNichtGefunden(anspruch.room.to_string()))?;

        match ergebnis {
            Ok(is_owner) => {
                self.observer.teilnehmer_geaendert(1);
                tracing::info!(
                    raum = %anspruch.room,
                    verbindung = %id,
                    username = %anspruch.username,
                    is_owner,
                    "Verbindung angemeldet"
                );
                Ok(RoomHandle {
                    room: anspruch.room,
                    username: anspruch.username,
                    is_owner,
                })
            }
            Err(e) => {
                self.observer.beitritt_abgelehnt(&e);
                Err(e)
            }
        }
    }

    /// Meldet eine Verbindung ab und vergisst sie (Verbindungsende)
    pub fn abmelden(&self, id: &ConnectionId) {
        self.abmelden_intern(id);
        self.verbindungen.entfernen(id);
    }

    /// Loest die Verbindung aus ihrem aktuellen Raum
    ///
    /// Gibt true zurueck wenn tatsaechlich ein Teilnehmer entfernt wurde.
    pub(crate) fn abmelden_intern(&self, id: &ConnectionId) -> bool {
        let Some(code) = self.verbindungen.aktueller_raum(id) else {
            return false;
        };

        let entfernt = match self.registry.holen(&code) {
            Ok(zelle) => zelle
                .bearbeiten(self.delivery(), |raum, outbox| {
                    self.verlassen_intern(raum, outbox, id)
                })
                .unwrap_or(false),
            Err(_) => false,
        };
        self.verbindungen.raum_loesen_wenn(id, &code);

        if entfernt {
            self.observer.teilnehmer_geaendert(-1);
            tracing::info!(raum = %code, verbindung = %id, "Verbindung abgemeldet");
        }
        entfernt
    }

    /// Fuegt die Verbindung unter der Raum-Sperre hinzu
    ///
    /// Gibt zurueck, ob sie Besitzer wurde.
    pub(crate) fn beitreten_intern(
        &self,
        raum: &mut Room,
        outbox: &mut Outbox,
        id: ConnectionId,
        anspruch: &IdentityClaim,
    ) -> RoomResult<bool> {
        if !self.verbindungen.raum_setzen(id, anspruch.clone()) {
            return Err(RoomError::VerbindungBeendet);
        }
        let is_owner = raum.teilnehmer_hinzufuegen(id, &anspruch.username, anspruch.is_owner);
        outbox.system_an_raum(raum, format!("{} joined the room.", anspruch.username));
        outbox.teilnehmer_ansicht(raum);
        Ok(is_owner)
    }

    /// Entfernt die Verbindung unter der Raum-Sperre
    pub(crate) fn verlassen_intern(
        &self,
        raum: &mut Room,
        outbox: &mut Outbox,
        id: &ConnectionId,
    ) -> bool {
        let Some(entfernt) = raum.teilnehmer_entfernen(id) else {
            return false;
        };
        if entfernt.war_besitzer {
            match entfernt.neuer_besitzer {
                Some(neu) => {
                    tracing::info!(raum = %raum.code(), neuer_besitzer = %neu, "Besitz uebergeben")
                }
                None => tracing::info!(raum = %raum.code(), "Raum hat keinen Besitzer mehr"),
            }
        }
        outbox.system_an_raum(raum, format!("{} left the room.", entfernt.username));
        outbox.teilnehmer_ansicht(raum);
        true
    }
}
