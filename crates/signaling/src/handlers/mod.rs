//! Handler fuer alle Control-Nachrichten
//!
//! Jeder Handler ist fuer eine Gruppe von Nachrichtentypen zustaendig
//! und hat Zugriff auf den gemeinsamen SignalingState.

pub mod chat_handler;
pub mod file_handler;
pub mod moderation_handler;
pub mod room_handler;

use plauderei_protocol::control::{ControlMessage, ErrorCode};
use plauderei_rooms::RoomError;

/// Bildet einen Raum-Fehler auf den Protokoll-Fehlercode ab
pub fn raum_fehler_code(fehler: &RoomError) -> ErrorCode {
    match fehler {
        RoomError::FehlendeFelder => ErrorCode::MissingFields,
        RoomError::RaumCodeVergeben(_) => ErrorCode::RoomCodeTaken,
        RoomError::RaumNichtGefunden(_) => ErrorCode::RoomNotFound,
        RoomError::RaumGesperrt => ErrorCode::RoomLocked,
        RoomError::Gebannt => ErrorCode::Banned,
        RoomError::FalschesPasswort => ErrorCode::WrongPassword,
        RoomError::KeinBesitzer => ErrorCode::NotOwner,
        RoomError::VerbindungBeendet => ErrorCode::ConnectionClosed,
    }
}

/// Fehler-Antwort fuer einen Raum-Fehler
pub(crate) fn raum_fehler(request_id: u32, fehler: &RoomError) -> ControlMessage {
    tracing::debug!(
        code = fehler.code(),
        kategorie = ?fehler.kategorie(),
        "Anfrage abgelehnt"
    );
    ControlMessage::error(request_id, raum_fehler_code(fehler), fehler.to_string())
}
