//! Chat-Handler – Nachricht an den eigenen Raum
//!
//! Der Absender bekommt seine Nachricht wie alle anderen als
//! `chat_message`-Push zurueck; eine direkte Antwort gibt es nicht.

use plauderei_core::ConnectionId;
use plauderei_protocol::control::ChatSendRequest;
use std::sync::Arc;

use crate::server_state::SignalingState;

pub fn handle_chat_send(request: ChatSendRequest, verbindung: ConnectionId, state: &Arc<SignalingState>) {
    if !state.raeume.chat_nachricht(&verbindung, &request.text) {
        tracing::trace!(verbindung = %verbindung, "Chat-Nachricht nicht weitergeleitet");
    }
}
