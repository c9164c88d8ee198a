//! RoomService – Einstiegspunkt fuer alle Raum-Operationen
//!
//! Die Operationen selbst sind nach Zustaendigkeit auf die Module
//! `lifecycle`, `membership`, `moderation` und `gateway` verteilt; hier
//! liegen nur der gemeinsame Zustand und kleine Hilfsfunktionen.

use std::sync::Arc;

use plauderei_core::{ConnectionId, IdentityClaim, RoomCode};
use serde::{Deserialize, Serialize};

use crate::connections::ConnectionTable;
use crate::event::Delivery;
use crate::observer::{NoopObserver, RoomObserver};
use crate::registry::{RoomCell, RoomRegistry};

/// Ergebnis eines erfolgreichen Host-, Join- oder Wechsel-Vorgangs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomHandle {
    pub room: RoomCode,
    pub username: String,
    pub is_owner: bool,
}

impl RoomHandle {
    /// Identitaets-Anspruch, mit dem sich die Verbindung anschliessend anmeldet
    pub fn anspruch(&self) -> IdentityClaim {
        IdentityClaim {
            username: self.username.clone(),
            room: self.room.clone(),
            is_owner: self.is_owner,
        }
    }
}

/// Prozessweiter Raum-Dienst
///
/// Wird einmal beim Start erzeugt und per `Arc` an Transport und
/// Datei-Dienst weitergereicht.
pub struct RoomService {
    pub(crate) registry: RoomRegistry,
    pub(crate) verbindungen: ConnectionTable,
    pub(crate) delivery: Arc<dyn Delivery>,
    pub(crate) observer: Arc<dyn RoomObserver>,
}

impl RoomService {
    /// Erstellt einen RoomService ohne Metrik-Beobachter
    pub fn neu(delivery: Arc<dyn Delivery>) -> Arc<Self> {
        Self::mit_observer(delivery, Arc::new(NoopObserver))
    }

    /// Erstellt einen RoomService mit Beobachter
    pub fn mit_observer(delivery: Arc<dyn Delivery>, observer: Arc<dyn RoomObserver>) -> Arc<Self> {
        Arc::new(Self {
            registry: RoomRegistry::neu(),
            verbindungen: ConnectionTable::neu(),
            delivery,
            observer,
        })
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn raum_anzahl(&self) -> usize {
        self.registry.anzahl()
    }

    /// Anspruch einer aktiven (nicht zwangsgetrennten) Verbindung
    pub fn anspruch(&self, id: &ConnectionId) -> Option<IdentityClaim> {
        if self.verbindungen.ist_beendet(id) {
            return None;
        }
        self.verbindungen.anspruch(id)
    }

    /// Gibt true zurueck wenn die Verbindung zwangsweise getrennt wurde
    pub fn ist_beendet(&self, id: &ConnectionId) -> bool {
        self.verbindungen.ist_beendet(id)
    }

    /// Raum der Verbindung, sofern sie aktiv ist und der Raum noch existiert
    pub(crate) fn raum_der_verbindung(
        &self,
        id: &ConnectionId,
    ) -> Option<(IdentityClaim, Arc<RoomCell>)> {
        let anspruch = self.anspruch(id)?;
        let zelle = self.registry.holen(&anspruch.room).ok()?;
        Some((anspruch, zelle))
    }

    pub(crate) fn delivery(&self) -> &dyn Delivery {
        self.delivery.as_ref()
    }
}

impl std::fmt::Debug for RoomService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomService")
            .field("raeume", &self.registry.anzahl())
            .field("verbindungen", &self.verbindungen.anzahl())
            .finish()
    }
}
