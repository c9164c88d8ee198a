//! Room-Handler – Host, Join, Wechsel, Schliessen, Passwort
//!
//! Host und Join legen den Identitaets-Anspruch der Verbindung fest und
//! melden sie sofort im Raum an.

use plauderei_core::ConnectionId;
use plauderei_protocol::control::{
    ControlMessage, ControlPayload, RoomCredentials, RoomPasswordChangeRequest, RoomResponse,
    RoomSwitchRequest,
};
use plauderei_rooms::{RoomHandle, RoomResult};
use std::sync::Arc;

use crate::handlers::raum_fehler;
use crate::server_state::SignalingState;

fn antwort(request_id: u32, verbindung: ConnectionId, ergebnis: RoomResult<RoomHandle>) -> ControlMessage {
    match ergebnis {
        Ok(handle) => ControlMessage::new(
            request_id,
            ControlPayload::RoomResponse(RoomResponse {
                room: handle.room,
                username: handle.username,
                is_owner: handle.is_owner,
                connection_id: verbindung,
            }),
        ),
        Err(e) => raum_fehler(request_id, &e),
    }
}

/// Legt einen Raum an und meldet die Verbindung als Besitzer an
pub fn handle_room_host(
    request: RoomCredentials,
    request_id: u32,
    verbindung: ConnectionId,
    state: &Arc<SignalingState>,
) -> ControlMessage {
    let ergebnis = state
        .raeume
        .raum_hosten(&request.username, &request.room, &request.password)
        .and_then(|handle| state.raeume.anmelden(verbindung, handle.anspruch()));
    antwort(request_id, verbindung, ergebnis)
}

/// Tritt einem bestehenden Raum bei
pub fn handle_room_join(
    request: RoomCredentials,
    request_id: u32,
    verbindung: ConnectionId,
    state: &Arc<SignalingState>,
) -> ControlMessage {
    let ergebnis = state
        .raeume
        .raum_beitreten(&request.username, &request.room, &request.password)
        .and_then(|handle| state.raeume.anmelden(verbindung, handle.anspruch()));
    antwort(request_id, verbindung, ergebnis)
}

/// Wechselt in einen anderen Raum
pub fn handle_room_switch(
    request: RoomSwitchRequest,
    request_id: u32,
    verbindung: ConnectionId,
    state: &Arc<SignalingState>,
) -> ControlMessage {
    let ergebnis = state
        .raeume
        .raum_wechseln(verbindung, &request.room, &request.password);
    antwort(request_id, verbindung, ergebnis)
}

/// Schliesst den aktuellen Raum der Verbindung (nur Besitzer)
pub fn handle_room_close(
    request_id: u32,
    verbindung: ConnectionId,
    state: &Arc<SignalingState>,
) -> ControlMessage {
    let raum = state
        .raeume
        .anspruch(&verbindung)
        .map(|a| a.room.to_string())
        .unwrap_or_default();
    match state.raeume.raum_schliessen(verbindung, &raum) {
        Ok(()) => ControlMessage::ack(request_id),
        Err(e) => raum_fehler(request_id, &e),
    }
}

/// Setzt ein neues Raum-Passwort (nur Besitzer)
pub fn handle_room_password_change(
    request: RoomPasswordChangeRequest,
    request_id: u32,
    verbindung: ConnectionId,
    state: &Arc<SignalingState>,
) -> ControlMessage {
    match state.raeume.passwort_aendern(verbindung, &request.new_password) {
        Ok(()) => ControlMessage::ack(request_id),
        Err(e) => raum_fehler(request_id, &e),
    }
}
