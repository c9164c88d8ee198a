//! Fehlertypen fuer das Datei-Crate

use thiserror::Error;

/// Datei-Fehlertypen
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Nicht berechtigt: Verbindung ist in keinem Raum")]
    KeineBerechtigung,

    #[error("Ungueltiger Dateiname: {0}")]
    UngueltigerName(String),

    #[error("Datei zu gross: {size} Bytes (Maximum: {max} Bytes)")]
    DateiZuGross { size: u64, max: u64 },

    #[error("Datei nicht gefunden: {0}")]
    DateiNichtGefunden(String),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

impl FileError {
    /// Maschinenlesbarer Code fuer Protokoll-Antworten
    pub fn code(&self) -> &'static str {
        match self {
            Self::KeineBerechtigung => "NOT_AUTHORIZED",
            Self::UngueltigerName(_) => "INVALID_REQUEST",
            Self::DateiZuGross { .. } => "FILE_TOO_LARGE",
            Self::DateiNichtGefunden(_) => "FILE_NOT_FOUND",
            Self::Io(_) => "INTERNAL_ERROR",
        }
    }
}

pub type FileResult<T> = Result<T, FileError>;
