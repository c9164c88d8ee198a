//! Storage-Backend fuer Datei-Uploads
//!
//! Das `StorageBackend`-Trait abstrahiert den konkreten Speicher. Dateien
//! sind pro Raum abgelegt und ueber `(raum, dateiname)` adressiert.

use std::path::PathBuf;

use plauderei_core::RoomCode;

use crate::error::{FileError, FileResult};

/// Abstraktes Speicher-Backend fuer Dateien
#[allow(async_fn_in_trait)]
pub trait StorageBackend: Send + Sync {
    /// Datei im Raum speichern (vorhandene wird ueberschrieben)
    async fn store(&self, raum: &RoomCode, dateiname: &str, data: &[u8]) -> FileResult<()>;

    /// Datei laden
    async fn retrieve(&self, raum: &RoomCode, dateiname: &str) -> FileResult<Vec<u8>>;
}

/// Disk-basiertes Storage-Backend
///
/// Speichert Dateien unter `base_dir/<raum>/<dateiname>`.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    base_dir: PathBuf,
}

impl DiskStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Vollstaendiger Pfad; lehnt alles ab was aus dem Raum-Verzeichnis fuehrt
    fn full_path(&self, raum: &RoomCode, dateiname: &str) -> FileResult<PathBuf> {
        if raum.ist_leer()
            || dateiname.is_empty()
            || dateiname == "."
            || dateiname == ".."
            || dateiname.contains(['/', '\\'])
        {
            return Err(FileError::UngueltigerName(dateiname.to_string()));
        }
        Ok(self.base_dir.join(raum.as_str()).join(dateiname))
    }
}

impl StorageBackend for DiskStorage {
    async fn store(&self, raum: &RoomCode, dateiname: &str, data: &[u8]) -> FileResult<()> {
        let full = self.full_path(raum, dateiname)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full, data).await?;
        tracing::debug!(path = %full.display(), bytes = data.len(), "Datei gespeichert");
        Ok(())
    }

    async fn retrieve(&self, raum: &RoomCode, dateiname: &str) -> FileResult<Vec<u8>> {
        let full = self.full_path(raum, dateiname)?;
        match tokio::fs::read(&full).await {
            Ok(data) => {
                tracing::debug!(path = %full.display(), bytes = data.len(), "Datei gelesen");
                Ok(data)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FileError::DateiNichtGefunden(format!("{raum}/{dateiname}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
