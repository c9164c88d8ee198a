//! FileService – Upload und Download von Raum-Dateien
//!
//! Nach dem Speichern kuendigt der Dienst die Datei ueber den Raum-Kern
//! an (`datei_geteilt`). Dateien bleiben liegen wenn ein Raum schliesst.

use std::sync::Arc;

use plauderei_core::{ConnectionId, RoomCode};
use plauderei_rooms::RoomService;
use sha2::{Digest, Sha256};

use crate::error::{FileError, FileResult};
use crate::storage::StorageBackend;
use crate::types::{dateiname_bereinigen, DateiConfig, HochgeladeneDatei};

/// FileService verwaltet Uploads und Downloads
pub struct FileService<S: StorageBackend> {
    storage: Arc<S>,
    raeume: Arc<RoomService>,
    config: DateiConfig,
}

impl<S: StorageBackend> FileService<S> {
    /// Neuen FileService erstellen
    pub fn neu(storage: Arc<S>, raeume: Arc<RoomService>, config: DateiConfig) -> Arc<Self> {
        Arc::new(Self {
            storage,
            raeume,
            config,
        })
    }

    pub fn config(&self) -> &DateiConfig {
        &self.config
    }

    /// Datei in den aktuellen Raum der Verbindung hochladen
    ///
    /// Prueft Anmeldung, Dateiname und Groesse, berechnet SHA-256,
    /// speichert und kuendigt die Datei im Raum an.
    pub async fn hochladen(
        &self,
        verbindung: &ConnectionId,
        dateiname: &str,
        daten: &[u8],
    ) -> FileResult<HochgeladeneDatei> {
        let anspruch = self
            .raeume
            .anspruch(verbindung)
            .ok_or(FileError::KeineBerechtigung)?;
        let name = dateiname_bereinigen(dateiname)
            .ok_or_else(|| FileError::UngueltigerName(dateiname.to_string()))?;

        let size = daten.len() as u64;
        if size > self.config.max_upload_bytes {
            return Err(FileError::DateiZuGross {
                size,
                max: self.config.max_upload_bytes,
            });
        }

        let mut hasher = Sha256::new();
        hasher.update(daten);
        let checksum = format!("{:x}", hasher.finalize());

        self.storage.store(&anspruch.room, &name, daten).await?;

        let url = format!(
            "{}/{}/{}",
            self.config.url_praefix.trim_end_matches('/'),
            anspruch.room,
            name
        );
        if !self
            .raeume
            .datei_geteilt(&anspruch.room, &anspruch.username, &name, &url)
        {
            tracing::warn!(raum = %anspruch.room, %name, "Raum verschwunden, Datei nicht angekuendigt");
        }

        tracing::info!(
            raum = %anspruch.room,
            username = %anspruch.username,
            filename = %name,
            size,
            "Datei hochgeladen"
        );

        Ok(HochgeladeneDatei {
            filename: name,
            url,
            checksum,
            size_bytes: size,
        })
    }

    /// Datei herunterladen
    ///
    /// Raum-Code und Dateiname werden wie beim Upload bereinigt.
    pub async fn herunterladen(&self, raum: &str, dateiname: &str) -> FileResult<(String, Vec<u8>)> {
        let code = RoomCode::bereinigen(raum);
        let name = dateiname_bereinigen(dateiname)
            .ok_or_else(|| FileError::DateiNichtGefunden(dateiname.to_string()))?;
        if code.ist_leer() {
            return Err(FileError::DateiNichtGefunden(name));
        }

        let daten = self.storage.retrieve(&code, &name).await?;
        Ok((name, daten))
    }
}
