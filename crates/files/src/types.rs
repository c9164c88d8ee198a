//! Typen fuer Datei-Uploads

use serde::{Deserialize, Serialize};

/// Konfiguration des Datei-Dienstes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateiConfig {
    /// Maximale Upload-Groesse in Bytes
    pub max_upload_bytes: u64,
    /// Oeffentliches URL-Praefix, z.B. `/files`
    pub url_praefix: String,
}

impl Default for DateiConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 20 * 1024 * 1024,
            url_praefix: "/files".to_string(),
        }
    }
}

/// Ergebnis eines erfolgreichen Uploads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HochgeladeneDatei {
    pub filename: String,
    pub url: String,
    /// SHA-256 als Hex-String
    pub checksum: String,
    pub size_bytes: u64,
}

/// Reduziert einen Client-Dateinamen auf seinen letzten Pfadbestandteil
///
/// Gibt `None` zurueck wenn danach nichts Brauchbares uebrig bleibt.
pub fn dateiname_bereinigen(roh: &str) -> Option<String> {
    let name = roh.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}
