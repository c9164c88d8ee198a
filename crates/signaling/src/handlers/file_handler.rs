//! File-Handler – Upload und Download ueber die Control-Verbindung
//!
//! Dateiinhalte reisen Base64-kodiert im JSON-Frame.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use plauderei_core::ConnectionId;
use plauderei_files::FileError;
use plauderei_protocol::control::{
    ControlMessage, ControlPayload, ErrorCode, FileDownloadRequest, FileDownloadResponse,
    FileUploadRequest, FileUploadResponse,
};
use std::sync::Arc;

use crate::server_state::SignalingState;

fn datei_fehler_code(fehler: &FileError) -> ErrorCode {
    match fehler {
        FileError::KeineBerechtigung => ErrorCode::NotAuthorized,
        FileError::UngueltigerName(_) => ErrorCode::InvalidRequest,
        FileError::DateiZuGross { .. } => ErrorCode::FileTooLarge,
        FileError::DateiNichtGefunden(_) => ErrorCode::FileNotFound,
        FileError::Io(_) => ErrorCode::InternalError,
    }
}

fn datei_fehler(request_id: u32, fehler: &FileError) -> ControlMessage {
    if let FileError::Io(e) = fehler {
        tracing::error!(fehler = %e, "Datei-IO fehlgeschlagen");
        return ControlMessage::error(request_id, ErrorCode::InternalError, "Interner Fehler");
    }
    ControlMessage::error(request_id, datei_fehler_code(fehler), fehler.to_string())
}

/// Nimmt einen Upload entgegen und kuendigt ihn im Raum an
pub async fn handle_file_upload(
    request: FileUploadRequest,
    request_id: u32,
    verbindung: ConnectionId,
    state: &Arc<SignalingState>,
) -> ControlMessage {
    let daten = match STANDARD.decode(request.data_base64.as_bytes()) {
        Ok(d) => d,
        Err(e) => {
            return ControlMessage::error(
                request_id,
                ErrorCode::InvalidRequest,
                format!("Ungueltiges Base64: {e}"),
            );
        }
    };

    match state.dateien.hochladen(&verbindung, &request.filename, &daten).await {
        Ok(datei) => ControlMessage::new(
            request_id,
            ControlPayload::FileUploadResponse(FileUploadResponse {
                filename: datei.filename,
                url: datei.url,
                checksum: datei.checksum,
                size_bytes: datei.size_bytes,
            }),
        ),
        Err(e) => datei_fehler(request_id, &e),
    }
}

/// Liefert eine Datei aus einem Raum
pub async fn handle_file_download(
    request: FileDownloadRequest,
    request_id: u32,
    state: &Arc<SignalingState>,
) -> ControlMessage {
    match state.dateien.herunterladen(&request.room, &request.filename).await {
        Ok((filename, daten)) => ControlMessage::new(
            request_id,
            ControlPayload::FileDownloadResponse(FileDownloadResponse {
                filename,
                data_base64: STANDARD.encode(daten),
            }),
        ),
        Err(e) => datei_fehler(request_id, &e),
    }
}
