//! Moderation – Besitzer-Aktionen gegen Teilnehmer und Raum
//!
//! Alle Aktionen verlangen, dass die ausloesende Verbindung der aktuelle
//! Besitzer ihres Raums ist. Andernfalls passiert nichts: kein Fehler,
//! keine Nachricht, kein Snapshot.

use plauderei_core::ConnectionId;

use crate::event::{Outbox, RoomEvent};
use crate::room::Room;
use crate::service::RoomService;

impl RoomService {
    /// Fuehrt `f` unter der Raum-Sperre aus, falls `id` Besitzer ist
    fn als_besitzer<R>(
        &self,
        id: &ConnectionId,
        f: impl FnOnce(&mut Room, &mut Outbox) -> R,
    ) -> Option<R> {
        let (_, zelle) = self.raum_der_verbindung(id)?;
        zelle
            .bearbeiten(self.delivery(), |raum, outbox| {
                if !raum.ist_besitzer(id) {
                    tracing::debug!(raum = %raum.code(), verbindung = %id, "Moderation ohne Besitz ignoriert");
                    return None;
                }
                Some(f(raum, outbox))
            })
            .flatten()
    }

    fn stumm_setzen(&self, id: &ConnectionId, ziel: ConnectionId, stumm: bool) -> bool {
        let erfolgt = self
            .als_besitzer(id, |raum, outbox| {
                if !raum.stumm_setzen(ziel, stumm) {
                    return false;
                }
                let name = raum
                    .teilnehmer(&ziel)
                    .map(|t| t.username.clone())
                    .unwrap_or_default();
                let text = if stumm {
                    format!("{name} was muted.")
                } else {
                    format!("{name} was unmuted.")
                };
                outbox.system_an_raum(raum, text);
                outbox.teilnehmer_ansicht(raum);
                true
            })
            .unwrap_or(false);

        if erfolgt {
            self.observer.moderation(if stumm { "mute" } else { "unmute" });
        }
        erfolgt
    }

    /// Schaltet einen Teilnehmer stumm
    pub fn stummschalten(&self, id: &ConnectionId, ziel: ConnectionId) -> bool {
        self.stumm_setzen(id, ziel, true)
    }

    /// Hebt die Stummschaltung eines Teilnehmers auf
    pub fn stummschaltung_aufheben(&self, id: &ConnectionId, ziel: ConnectionId) -> bool {
        self.stumm_setzen(id, ziel, false)
    }

    /// Wirft einen Teilnehmer aus dem Raum
    ///
    /// Das Ziel erhaelt `kicked`, wird terminal getrennt und aus dem Raum
    /// entfernt (inklusive Besitz-Uebergabe falls es sich selbst trifft).
    pub fn kicken(&self, id: &ConnectionId, ziel: ConnectionId) -> bool {
        let erfolgt = self
            .als_besitzer(id, |raum, outbox| {
                self.zwangsweise_entfernen(raum, outbox, ziel, false)
            })
            .unwrap_or(false);

        if erfolgt {
            self.observer.moderation("kick");
            self.observer.teilnehmer_geaendert(-1);
        }
        erfolgt
    }

    /// Bannt den Benutzernamen eines Teilnehmers und wirft ihn hinaus
    ///
    /// Der Ban gilt fuer jede kuenftige Verbindung mit diesem Namen.
    pub fn bannen(&self, id: &ConnectionId, ziel: ConnectionId) -> bool {
        let erfolgt = self
            .als_besitzer(id, |raum, outbox| {
                self.zwangsweise_entfernen(raum, outbox, ziel, true)
            })
            .unwrap_or(false);

        if erfolgt {
            self.observer.moderation("ban");
            self.observer.teilnehmer_geaendert(-1);
        }
        erfolgt
    }

    fn zwangsweise_entfernen(
        &self,
        raum: &mut Room,
        outbox: &mut Outbox,
        ziel: ConnectionId,
        bannen: bool,
    ) -> bool {
        let Some(username) = raum.teilnehmer(&ziel).map(|t| t.username.clone()) else {
            return false;
        };
        if bannen {
            raum.bannen(&username);
        }
        raum.teilnehmer_entfernen(&ziel);
        self.verbindungen.beenden(ziel);

        outbox.an_verbindung(ziel, RoomEvent::Kicked);
        outbox.trennen(ziel);
        outbox.system_an_raum(raum, format!("{username} left the room."));
        let text = if bannen {
            format!("{username} was banned.")
        } else {
            format!("{username} was kicked by the owner.")
        };
        outbox.system_an_raum(raum, text);
        outbox.teilnehmer_ansicht(raum);

        tracing::debug!(raum = %raum.code(), verbindung = %ziel, %username, bannen, "Teilnehmer entfernt");
        true
    }

    /// Schaltet die Raum-Sperre um
    pub fn sperre_umschalten(&self, id: &ConnectionId) -> Option<bool> {
        let gesperrt = self.als_besitzer(id, |raum, outbox| {
            let gesperrt = raum.sperre_umschalten();
            let text = if gesperrt {
                "Room is now locked."
            } else {
                "Room is now open."
            };
            outbox.system_an_raum(raum, text);
            outbox.teilnehmer_ansicht(raum);
            gesperrt
        })?;

        self.observer.moderation("lock");
        Some(gesperrt)
    }

    /// Sendet `clear_chat` an alle Teilnehmer; es gibt keinen Verlauf zu loeschen
    pub fn chat_leeren(&self, id: &ConnectionId) -> bool {
        let erfolgt = self
            .als_besitzer(id, |raum, outbox| outbox.an_raum(raum, RoomEvent::ClearChat))
            .is_some();
        if erfolgt {
            self.observer.moderation("clear");
        }
        erfolgt
    }
}
