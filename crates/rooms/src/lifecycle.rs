//! Raum-Lebenszyklus – Hosten, Beitreten, Wechseln, Schliessen
//!
//! Host und Join pruefen nur und liefern einen [`RoomHandle`]; die
//! eigentliche Mitgliedschaft entsteht erst mit `anmelden`. Der Wechsel
//! dagegen loest und haengt in einem Schritt unter beiden Raum-Sperren.

use std::sync::Arc;

use plauderei_core::{ConnectionId, IdentityClaim, RoomCode};

use crate::error::{RoomError, RoomResult};
use crate::event::RoomEvent;
use crate::registry::RoomCell;
use crate::service::{RoomHandle, RoomService};

/// Bereinigte Pflichtfelder eines Host-, Join- oder Wechsel-Versuchs
struct Eingabe {
    username: String,
    code: RoomCode,
    passwort: String,
}

impl Eingabe {
    fn pruefen(username: &str, raum: &str, passwort: &str) -> RoomResult<Self> {
        let eingabe = Self {
            username: username.trim().to_string(),
            code: RoomCode::bereinigen(raum),
            passwort: passwort.trim().to_string(),
        };
        if eingabe.username.is_empty() || eingabe.code.ist_leer() || eingabe.passwort.is_empty() {
            return Err(RoomError::FehlendeFelder);
        }
        Ok(eingabe)
    }
}

impl RoomService {
    /// Legt einen neuen Raum an
    ///
    /// Der Raum startet ohne Besitzer; der zurueckgegebene Anspruch traegt
    /// `is_owner = true`, so dass die erste anmeldende Verbindung des
    /// Hosts Besitzer wird.
    pub fn raum_hosten(&self, username: &str, raum: &str, passwort: &str) -> RoomResult<RoomHandle> {
        let eingabe = Eingabe::pruefen(username, raum, passwort)?;
        self.registry.anlegen(eingabe.code.clone(), eingabe.passwort)?;
        self.observer.raum_angelegt();

        tracing::info!(raum = %eingabe.code, username = %eingabe.username, "Raum angelegt");
        Ok(RoomHandle {
            room: eingabe.code,
            username: eingabe.username,
            is_owner: true,
        })
    }

    /// Prueft einen Beitrittsversuch
    ///
    /// Reihenfolge: Existenz, Sperre, Ban, Passwort.
    pub fn raum_beitreten(
        &self,
        username: &str,
        raum: &str,
        passwort: &str,
    ) -> RoomResult<RoomHandle> {
        let eingabe = Eingabe::pruefen(username, raum, passwort)?;
        let ergebnis = self
            .registry
            .holen(&eingabe.code)
            .and_then(|zelle| zelle.lesen(|r| r.zutritt_pruefen(&eingabe.username, &eingabe.passwort)));

        if let Err(e) = ergebnis {
            tracing::debug!(raum = %eingabe.code, username = %eingabe.username, fehler = %e, "Beitritt abgelehnt");
            self.observer.beitritt_abgelehnt(&e);
            return Err(e);
        }

        Ok(RoomHandle {
            room: eingabe.code,
            username: eingabe.username,
            is_owner: false,
        })
    }

    /// Wechselt eine angemeldete Verbindung in einen anderen Raum
    ///
    /// Gleiche Pruefungen wie beim Beitritt. Bei Erfolg wird die Verbindung
    /// im alten Raum abgemeldet und im neuen (ohne Besitz-Anspruch)
    /// angemeldet; bei einem Fehler bleibt die alte Mitgliedschaft unberuehrt.
    pub fn raum_wechseln(
        &self,
        id: ConnectionId,
        raum: &str,
        passwort: &str,
    ) -> RoomResult<RoomHandle> {
        if self.verbindungen.ist_beendet(&id) {
            return Err(RoomError::VerbindungBeendet);
        }
        let username = self
            .verbindungen
            .anspruch(&id)
            .map(|a| a.username)
            .unwrap_or_default();
        let eingabe = Eingabe::pruefen(&username, raum, passwort)?;

        let ergebnis = self.wechsel_ausfuehren(id, &eingabe);
        match &ergebnis {
            Ok(handle) => {
                tracing::info!(raum = %handle.room, verbindung = %id, "Raum gewechselt");
            }
            Err(e) => {
                tracing::debug!(raum = %eingabe.code, verbindung = %id, fehler = %e, "Wechsel abgelehnt");
                self.observer.beitritt_abgelehnt(e);
            }
        }
        ergebnis
    }

    fn wechsel_ausfuehren(&self, id: ConnectionId, eingabe: &Eingabe) -> RoomResult<RoomHandle> {
        let ziel = self.registry.holen(&eingabe.code)?;
        let alt = self
            .verbindungen
            .aktueller_raum(&id)
            .and_then(|code| self.registry.holen(&code).ok());

        let anspruch = IdentityClaim {
            username: eingabe.username.clone(),
            room: eingabe.code.clone(),
            is_owner: false,
        };
        let nicht_gefunden = || RoomError::RaumNichtGefunden(eingabe.code.to_string());

        let (is_owner, verlassen) = match alt {
            Some(alt) if !Arc::ptr_eq(&alt, &ziel) => RoomCell::zwei_bearbeiten(
                &alt,
                &ziel,
                self.delivery(),
                |alt_raum, ziel_raum, outbox| {
                    if ziel_raum.ist_geschlossen() {
                        return Err(nicht_gefunden());
                    }
                    if self.verbindungen.ist_beendet(&id) {
                        return Err(RoomError::VerbindungBeendet);
                    }
                    ziel_raum.zutritt_pruefen(&eingabe.username, &eingabe.passwort)?;
                    let verlassen = !alt_raum.ist_geschlossen()
                        && self.verlassen_intern(alt_raum, outbox, &id);
                    let is_owner = self.beitreten_intern(ziel_raum, outbox, id, &anspruch)?;
                    Ok((is_owner, verlassen))
                },
            )?,
            // Gleicher Raum oder bisher kein (existierender) Raum
            _ => ziel
                .bearbeiten(self.delivery(), |raum, outbox| {
                    if self.verbindungen.ist_beendet(&id) {
                        return Err(RoomError::VerbindungBeendet);
                    }
                    raum.zutritt_pruefen(&eingabe.username, &eingabe.passwort)?;
                    let verlassen = self.verlassen_intern(raum, outbox, &id);
                    let is_owner = self.beitreten_intern(raum, outbox, id, &anspruch)?;
                    Ok((is_owner, verlassen))
                })
                .ok_or_else(nicht_gefunden)??,
        };

        if !verlassen {
            self.observer.teilnehmer_geaendert(1);
        }
        Ok(RoomHandle {
            room: anspruch.room,
            username: anspruch.username,
            is_owner,
        })
    }

    /// Schliesst einen Raum (nur Besitzer)
    ///
    /// Jeder Teilnehmer erhaelt `kicked` und wird getrennt, bevor der Raum
    /// aus der Registry verschwindet.
    pub fn raum_schliessen(&self, id: ConnectionId, raum: &str) -> RoomResult<()> {
        let code = RoomCode::bereinigen(raum);
        let zelle = self.registry.holen(&code)?;

        let getrennt = zelle
            .bearbeiten(self.delivery(), |raum, outbox| {
                if !raum.ist_besitzer(&id) {
                    return Err(RoomError::KeinBesitzer);
                }
                let betroffene = raum.schliessen();
                for verbindung in &betroffene {
                    self.verbindungen.beenden(*verbindung);
                    outbox.an_verbindung(*verbindung, RoomEvent::Kicked);
                    outbox.trennen(*verbindung);
                }
                Ok(betroffene.len())
            })
            .ok_or_else(|| RoomError::RaumNichtGefunden(code.to_string()))??;

        self.registry.entfernen(&zelle);
        self.observer.raum_geschlossen();
        self.observer.teilnehmer_geaendert(-(getrennt as i64));

        tracing::info!(raum = %code, getrennt, "Raum geschlossen");
        Ok(())
    }

    /// Setzt ein neues Raum-Passwort (nur Besitzer)
    ///
    /// Bestehende Verbindungen bleiben unberuehrt, nur kuenftige Beitritte
    /// und Wechsel sehen das neue Passwort.
    pub fn passwort_aendern(&self, id: ConnectionId, neues_passwort: &str) -> RoomResult<()> {
        let code = self
            .anspruch(&id)
            .map(|a| a.room)
            .ok_or_else(|| RoomError::RaumNichtGefunden(String::new()))?;
        let zelle = self.registry.holen(&code)?;

        zelle
            .bearbeiten(self.delivery(), |raum, _| {
                if !raum.ist_besitzer(&id) {
                    return Err(RoomError::KeinBesitzer);
                }
                let neu = neues_passwort.trim();
                if neu.is_empty() {
                    return Err(RoomError::FehlendeFelder);
                }
                raum.passwort_setzen(neu.to_string());
                Ok(())
            })
            .ok_or_else(|| RoomError::RaumNichtGefunden(code.to_string()))??;

        self.observer.moderation("password");
        tracing::debug!(raum = %code, "Raum-Passwort geaendert");
        Ok(())
    }
}
