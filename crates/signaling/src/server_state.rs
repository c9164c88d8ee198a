//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt alle geteilten Services als Arc-Referenzen, die sicher zwischen
//! tokio-Tasks geteilt werden koennen.

use plauderei_files::{DateiConfig, DiskStorage, FileService};
use plauderei_protocol::wire::DEFAULT_MAX_FRAME_SIZE;
use plauderei_rooms::{NoopObserver, RoomObserver, RoomService};
use std::sync::Arc;

use crate::broadcast::{EventBroadcaster, STANDARD_POSTFACH_GROESSE};

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Maximale gleichzeitige Verbindungen
    pub max_connections: u32,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// Groesse des Postfachs pro Verbindung
    pub postfach_groesse: usize,
    pub max_frame_size: usize,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            max_connections: 512,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
            postfach_groesse: STANDARD_POSTFACH_GROESSE,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState {
    pub config: Arc<SignalingConfig>,
    /// Raum-Kern (Registry, Mitgliedschaft, Moderation)
    pub raeume: Arc<RoomService>,
    /// Datei-Uploads und -Downloads
    pub dateien: Arc<FileService<DiskStorage>>,
    /// Postfaecher aller Verbindungen; zugleich `Delivery` des Raum-Kerns
    pub broadcaster: EventBroadcaster,
    pub observer: Arc<dyn RoomObserver>,
}

impl SignalingState {
    /// Erstellt einen SignalingState
    ///
    /// `raeume` muss mit `broadcaster` als Delivery erzeugt worden sein.
    pub fn neu(
        config: SignalingConfig,
        broadcaster: EventBroadcaster,
        raeume: Arc<RoomService>,
        dateien: Arc<FileService<DiskStorage>>,
        observer: Arc<dyn RoomObserver>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            raeume,
            dateien,
            broadcaster,
            observer,
        })
    }

    /// Baut den kompletten Zustand ohne Metrik-Beobachter (Tests, Werkzeuge)
    pub fn ohne_metriken(
        config: SignalingConfig,
        storage: DiskStorage,
        datei_config: DateiConfig,
    ) -> Arc<Self> {
        let broadcaster = EventBroadcaster::mit_postfach_groesse(config.postfach_groesse);
        let raeume = RoomService::neu(Arc::new(broadcaster.clone()));
        let dateien = FileService::neu(Arc::new(storage), Arc::clone(&raeume), datei_config);
        Self::neu(config, broadcaster, raeume, dateien, Arc::new(NoopObserver))
    }
}
