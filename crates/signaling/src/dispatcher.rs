//! Message-Dispatcher – Routet ControlMessages an die richtigen Handler
//!
//! Der Dispatcher empfaengt ControlMessages von einer ClientConnection,
//! bestimmt den richtigen Handler und gibt die Antwort zurueck.
//!
//! ## Zustandspruefung
//! Eine zwangsweise getrennte Verbindung (Kick, Ban, Raum geschlossen)
//! ist terminal: alles was danach noch eintrifft wird verworfen.

use plauderei_core::ConnectionId;
use plauderei_protocol::control::{ControlMessage, ControlPayload, ErrorCode};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::handlers::{chat_handler, file_handler, moderation_handler, room_handler};
use crate::server_state::SignalingState;

/// Dispatcher-Kontext – Informationen ueber die aktuelle Verbindung
#[derive(Debug, Clone, Copy)]
pub struct DispatcherContext {
    pub verbindung: ConnectionId,
    pub peer_addr: SocketAddr,
}

/// Zentraler Message-Dispatcher
pub struct MessageDispatcher {
    state: Arc<SignalingState>,
}

impl MessageDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Verarbeitet eine eingehende ControlMessage und gibt die Antwort zurueck
    ///
    /// Gibt `None` zurueck wenn keine Antwort gesendet werden soll
    /// (Chat, Moderation, Pong, terminale Verbindung).
    pub async fn dispatch(
        &self,
        message: ControlMessage,
        ctx: &DispatcherContext,
    ) -> Option<ControlMessage> {
        let request_id = message.request_id;
        let verbindung = ctx.verbindung;
        let state = &self.state;

        if state.raeume.ist_beendet(&verbindung) {
            tracing::debug!(verbindung = %verbindung, "Nachricht einer getrennten Verbindung verworfen");
            return None;
        }

        match message.payload {
            // -------------------------------------------------------------------
            // Raum-Lebenszyklus
            // -------------------------------------------------------------------
            ControlPayload::RoomHost(req) => Some(room_handler::handle_room_host(
                req, request_id, verbindung, state,
            )),
            ControlPayload::RoomJoin(req) => Some(room_handler::handle_room_join(
                req, request_id, verbindung, state,
            )),
            ControlPayload::RoomSwitch(req) => Some(room_handler::handle_room_switch(
                req, request_id, verbindung, state,
            )),
            ControlPayload::RoomClose => Some(room_handler::handle_room_close(
                request_id, verbindung, state,
            )),
            ControlPayload::RoomPasswordChange(req) => Some(
                room_handler::handle_room_password_change(req, request_id, verbindung, state),
            ),

            // -------------------------------------------------------------------
            // Chat und Moderation (keine direkte Antwort)
            // -------------------------------------------------------------------
            ControlPayload::ChatSend(req) => {
                chat_handler::handle_chat_send(req, verbindung, state);
                None
            }
            ControlPayload::KickUser(req) => {
                moderation_handler::handle_kick(req, verbindung, state);
                None
            }
            ControlPayload::BanUser(req) => {
                moderation_handler::handle_ban(req, verbindung, state);
                None
            }
            ControlPayload::MuteUser(req) => {
                moderation_handler::handle_mute(req, verbindung, state);
                None
            }
            ControlPayload::UnmuteUser(req) => {
                moderation_handler::handle_unmute(req, verbindung, state);
                None
            }
            ControlPayload::ToggleLock => {
                moderation_handler::handle_toggle_lock(verbindung, state);
                None
            }
            ControlPayload::ClearChat => {
                moderation_handler::handle_clear_chat(verbindung, state);
                None
            }

            // -------------------------------------------------------------------
            // Dateien
            // -------------------------------------------------------------------
            ControlPayload::FileUpload(req) => Some(
                file_handler::handle_file_upload(req, request_id, verbindung, state).await,
            ),
            ControlPayload::FileDownload(req) => {
                Some(file_handler::handle_file_download(req, request_id, state).await)
            }

            // -------------------------------------------------------------------
            // Keepalive
            // -------------------------------------------------------------------
            ControlPayload::Ping(ping) => Some(ControlMessage::pong(
                request_id,
                ping.timestamp_ms,
                jetzt_ms(),
            )),
            ControlPayload::Pong(_) => {
                tracing::trace!(verbindung = %verbindung, "Pong empfangen");
                None
            }

            // -------------------------------------------------------------------
            // Server -> Client Nachrichten vom Client
            // -------------------------------------------------------------------
            ControlPayload::RoomResponse(_)
            | ControlPayload::ChatMessage(_)
            | ControlPayload::Participants(_)
            | ControlPayload::Kicked
            | ControlPayload::FileUploadResponse(_)
            | ControlPayload::FileDownloadResponse(_)
            | ControlPayload::Ack
            | ControlPayload::Error(_) => {
                tracing::warn!(
                    peer = %ctx.peer_addr,
                    request_id,
                    "Unerwartete Server->Client Nachricht vom Client empfangen"
                );
                Some(ControlMessage::error(
                    request_id,
                    ErrorCode::InvalidRequest,
                    "Unerwartete Nachricht",
                ))
            }
        }
    }

    /// Bereinigt alle Ressourcen einer Verbindung beim Trennen
    pub fn client_cleanup(&self, verbindung: &ConnectionId) {
        self.state.raeume.abmelden(verbindung);
        self.state.broadcaster.client_entfernen(verbindung);
        tracing::debug!(verbindung = %verbindung, "Verbindungs-Ressourcen bereinigt");
    }
}

/// Unix-Zeit in Millisekunden
pub(crate) fn jetzt_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
