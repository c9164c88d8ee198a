//! plauderei-server – Bibliotheks-Root
//!
//! Verdrahtet Raum-Kern, Datei-Dienst, TCP-Transport und Observability
//! und stellt den oeffentlichen Einstiegspunkt fuer Integrationstests bereit.

pub mod config;
pub mod metriken;

use anyhow::{Context, Result};
use config::ServerConfig;
use metriken::MetrikBeobachter;
use plauderei_files::{DiskStorage, FileService};
use plauderei_observability::{observability_server_starten, HealthState, PlaudereiMetrics};
use plauderei_rooms::{RoomObserver, RoomService};
use plauderei_signaling::{EventBroadcaster, SignalingServer, SignalingState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
    pub metriken: PlaudereiMetrics,
    pub state: Arc<SignalingState>,
    health: HealthState,
    signaling: SignalingServer,
}

impl Server {
    /// Baut alle Dienste auf und bindet den TCP-Listener
    ///
    /// Reihenfolge:
    /// 1. Metriken und Postfaecher anlegen
    /// 2. Raum-Kern mit Metrik-Beobachter erzeugen
    /// 3. Datei-Dienst auf dem Upload-Verzeichnis
    /// 4. TCP-Listener binden
    pub async fn binden(config: ServerConfig) -> Result<Self> {
        config.validieren()?;
        let metriken = PlaudereiMetrics::neu().context("Metriken konnten nicht registriert werden")?;
        let beobachter: Arc<dyn RoomObserver> = Arc::new(MetrikBeobachter::neu(metriken.clone()));

        let signaling_config = config.signaling_config();
        let broadcaster = EventBroadcaster::mit_postfach_groesse(signaling_config.postfach_groesse);
        let raeume = RoomService::mit_observer(Arc::new(broadcaster.clone()), Arc::clone(&beobachter));
        let dateien = FileService::neu(
            Arc::new(DiskStorage::new(&config.dateien.verzeichnis)),
            Arc::clone(&raeume),
            config.datei_config(),
        );
        let state = SignalingState::neu(
            signaling_config,
            broadcaster,
            Arc::clone(&raeume),
            dateien,
            beobachter,
        );

        let health = HealthState::neu(move || raeume.raum_anzahl());

        let tcp_addr = config.tcp_bind_adresse()?;
        let signaling = SignalingServer::binden(Arc::clone(&state), tcp_addr)
            .await
            .with_context(|| format!("TCP-Listener auf {tcp_addr} nicht verfuegbar"))?;

        Ok(Self {
            config,
            metriken,
            state,
            health,
            signaling,
        })
    }

    /// Tatsaechlich gebundene Adresse der Control-Verbindung
    pub fn tcp_addr(&self) -> Result<SocketAddr> {
        Ok(self.signaling.lokale_addr()?)
    }

    /// Laeuft bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let health = self.health.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
                return;
            }
            tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
            health.herunterfahren_melden();
            let _ = shutdown_tx.send(true);
        });
        self.laufen(shutdown_rx).await
    }

    /// Startet Observability und Accept-Schleife und laeuft bis
    /// `shutdown_rx` ein `true`-Signal empfaengt
    pub async fn laufen(self, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %self.tcp_addr()?,
            uploads = %self.config.dateien.verzeichnis,
            "Server startet"
        );

        let observability = if self.config.observability.aktiviert {
            let addr = self.config.observability_bind_adresse()?;
            let metriken = self.metriken.clone();
            let health = self.health.clone();
            let rx = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = observability_server_starten(addr, metriken, health, rx).await {
                    tracing::error!(fehler = %e, "Observability-Server beendet");
                }
            }))
        } else {
            tracing::info!("Observability deaktiviert");
            None
        };

        self.signaling.starten(shutdown_rx).await?;

        if let Some(handle) = observability {
            let _ = handle.await;
        }
        tracing::info!("Server gestoppt");
        Ok(())
    }
}
