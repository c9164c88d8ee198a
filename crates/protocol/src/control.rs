//! Control-Protokoll (TCP)
//!
//! Definiert alle Nachrichten die ueber die TCP-Verbindung zwischen
//! Client und Server ausgetauscht werden.
//!
//! ## Design
//! - Request/Response Pattern: jede Nachricht hat eine `request_id: u32`
//! - Server-Pushes (Chat, Teilnehmer, Kick) tragen `request_id = 0`
//! - JSON-Serialisierung via serde, Tagged Enum fuer typsichere Nachrichten

use plauderei_core::{ConnectionId, RoomCode};
use serde::{Deserialize, Serialize};

/// request_id fuer unaufgeforderte Server-Nachrichten
pub const PUSH_REQUEST_ID: u32 = 0;

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer Error-Responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Allgemein
    InternalError,
    InvalidRequest,
    ServerFull,
    // Raum
    MissingFields,
    RoomCodeTaken,
    RoomNotFound,
    RoomLocked,
    Banned,
    WrongPassword,
    NotOwner,
    ConnectionClosed,
    // Dateien
    NotAuthorized,
    FileTooLarge,
    FileNotFound,
}

// ---------------------------------------------------------------------------
// Raum-Nachrichten
// ---------------------------------------------------------------------------

/// Zugangsdaten fuer Host und Join
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCredentials {
    pub username: String,
    /// Roh-Eingabe; der Server bereinigt den Code
    pub room: String,
    pub password: String,
}

/// Raumwechsel einer bereits angemeldeten Verbindung
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSwitchRequest {
    pub room: String,
    pub password: String,
}

/// Neues Raum-Passwort (nur Besitzer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPasswordChangeRequest {
    pub new_password: String,
}

/// Bestaetigung von Host, Join und Wechsel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomResponse {
    pub room: RoomCode,
    pub username: String,
    pub is_owner: bool,
    /// Eigene Verbindungs-ID (zum Wiederfinden in der Teilnehmerliste)
    pub connection_id: ConnectionId,
}

// ---------------------------------------------------------------------------
// Chat und Moderation
// ---------------------------------------------------------------------------

/// Chat-Nachricht senden
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSendRequest {
    pub text: String,
}

/// Ziel einer Besitzer-Aktion (Kick, Mute, Unmute, Ban)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetRequest {
    pub target: ConnectionId,
}

/// Art einer Chat-Nachricht auf dem Draht
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Text,
    System,
    File,
}

/// Chat-Nachricht an Clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    pub username: String,
    pub room: RoomCode,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub kind: ChatKind,
}

/// Ein Eintrag der Teilnehmerliste
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub connection_id: ConnectionId,
    pub username: String,
    pub is_owner: bool,
    pub is_muted: bool,
}

/// Teilnehmer-Snapshot; `is_owner` bezieht sich auf den Empfaenger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantsPayload {
    pub list: Vec<ParticipantInfo>,
    pub is_owner: bool,
    pub locked: bool,
}

// ---------------------------------------------------------------------------
// Datei-Nachrichten
// ---------------------------------------------------------------------------

/// Datei in den aktuellen Raum hochladen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUploadRequest {
    pub filename: String,
    /// Dateiinhalt, Base64-kodiert
    pub data_base64: String,
}

/// Bestaetigung eines Uploads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub filename: String,
    pub url: String,
    /// SHA-256 als Hex-String
    pub checksum: String,
    pub size_bytes: u64,
}

/// Datei aus einem Raum abrufen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDownloadRequest {
    pub room: String,
    pub filename: String,
}

/// Dateiinhalt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDownloadResponse {
    pub filename: String,
    pub data_base64: String,
}

// ---------------------------------------------------------------------------
// Keepalive
// ---------------------------------------------------------------------------

/// Ping (Client -> Server oder Server -> Client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingMessage {
    /// Unix-Timestamp in Millisekunden fuer RTT-Messung
    pub timestamp_ms: u64,
}

/// Pong-Antwort (spiegelt Timestamp zurueck)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongMessage {
    pub echo_timestamp_ms: u64,
    pub server_timestamp_ms: u64,
}

// ---------------------------------------------------------------------------
// Haupt-Enum
// ---------------------------------------------------------------------------

/// Alle moeglichen Control-Nachrichten (typsicher via Tagged Enum)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlPayload {
    // Raum-Lebenszyklus
    RoomHost(RoomCredentials),
    RoomJoin(RoomCredentials),
    RoomSwitch(RoomSwitchRequest),
    RoomClose,
    RoomPasswordChange(RoomPasswordChangeRequest),
    RoomResponse(RoomResponse),

    // Chat
    ChatSend(ChatSendRequest),
    ChatMessage(ChatMessagePayload),
    Participants(ParticipantsPayload),

    // Moderation
    KickUser(TargetRequest),
    MuteUser(TargetRequest),
    UnmuteUser(TargetRequest),
    BanUser(TargetRequest),
    ToggleLock,
    /// Client -> Server: Auftrag; Server -> Client: Verlauf leeren
    ClearChat,
    /// Terminal: die Verbindung wird anschliessend getrennt
    Kicked,

    // Dateien
    FileUpload(FileUploadRequest),
    FileUploadResponse(FileUploadResponse),
    FileDownload(FileDownloadRequest),
    FileDownloadResponse(FileDownloadResponse),

    // Keepalive
    Ping(PingMessage),
    Pong(PongMessage),

    // Allgemein
    Ack,
    Error(ErrorResponse),
}

/// Standardisierte Fehler-Antwort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Control-Frame
// ---------------------------------------------------------------------------

/// Control-Protokoll-Nachricht mit Request/Response-Zuordnung
///
/// Der Server kopiert die `request_id` des Clients in die Antwort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    pub request_id: u32,
    pub payload: ControlPayload,
}

impl ControlMessage {
    /// Erstellt eine neue Control-Nachricht
    pub fn new(request_id: u32, payload: ControlPayload) -> Self {
        Self {
            request_id,
            payload,
        }
    }

    /// Unaufgeforderte Server-Nachricht
    pub fn push(payload: ControlPayload) -> Self {
        Self::new(PUSH_REQUEST_ID, payload)
    }

    pub fn ping(request_id: u32, timestamp_ms: u64) -> Self {
        Self::new(request_id, ControlPayload::Ping(PingMessage { timestamp_ms }))
    }

    pub fn pong(request_id: u32, echo_timestamp_ms: u64, server_timestamp_ms: u64) -> Self {
        Self::new(
            request_id,
            ControlPayload::Pong(PongMessage {
                echo_timestamp_ms,
                server_timestamp_ms,
            }),
        )
    }

    pub fn ack(request_id: u32) -> Self {
        Self::new(request_id, ControlPayload::Ack)
    }

    /// Erstellt eine Fehler-Antwort
    pub fn error(request_id: u32, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(
            request_id,
            ControlPayload::Error(ErrorResponse {
                code,
                message: message.into(),
            }),
        )
    }

    /// Serialisiert die Nachricht als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert eine Nachricht aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
