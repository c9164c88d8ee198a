//! Moderation-Handler – Besitzer-Aktionen
//!
//! Keine dieser Nachrichten wird beantwortet: die Wirkung kommt als
//! Broadcast an, unberechtigte Versuche verpuffen still.

use plauderei_core::ConnectionId;
use plauderei_protocol::control::TargetRequest;
use std::sync::Arc;

use crate::server_state::SignalingState;

pub fn handle_kick(request: TargetRequest, verbindung: ConnectionId, state: &Arc<SignalingState>) {
    if !state.raeume.kicken(&verbindung, request.target) {
        tracing::debug!(verbindung = %verbindung, ziel = %request.target, "Kick ignoriert");
    }
}

pub fn handle_ban(request: TargetRequest, verbindung: ConnectionId, state: &Arc<SignalingState>) {
    if !state.raeume.bannen(&verbindung, request.target) {
        tracing::debug!(verbindung = %verbindung, ziel = %request.target, "Ban ignoriert");
    }
}

pub fn handle_mute(request: TargetRequest, verbindung: ConnectionId, state: &Arc<SignalingState>) {
    state.raeume.stummschalten(&verbindung, request.target);
}

pub fn handle_unmute(request: TargetRequest, verbindung: ConnectionId, state: &Arc<SignalingState>) {
    state.raeume.stummschaltung_aufheben(&verbindung, request.target);
}

pub fn handle_toggle_lock(verbindung: ConnectionId, state: &Arc<SignalingState>) {
    state.raeume.sperre_umschalten(&verbindung);
}

pub fn handle_clear_chat(verbindung: ConnectionId, state: &Arc<SignalingState>) {
    state.raeume.chat_leeren(&verbindung);
}
