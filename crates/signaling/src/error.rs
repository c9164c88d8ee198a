//! Fehlertypen fuer den Signaling-Service

use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
///
/// Fehler einzelner Anfragen werden als `error`-Frame beantwortet und
/// tauchen hier nicht auf; dieser Typ beendet eine Verbindung.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// IO-Fehler (TCP, Socket, Frame-Codec)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Verbindung wurde getrennt
    #[error("Verbindung getrennt")]
    VerbindungGetrennt,

    /// Kein Frame innerhalb des Idle-Timeouts
    #[error("Timeout")]
    Timeout,
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;
