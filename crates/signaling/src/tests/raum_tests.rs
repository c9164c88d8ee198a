//! Raum-Lebenszyklus, Chat und Moderation ueber TCP

use plauderei_protocol::control::{
    ChatKind, ChatSendRequest, ControlPayload, ErrorCode, RoomPasswordChangeRequest,
    RoomSwitchRequest, TargetRequest,
};

use super::{zugang, TestServer};

fn fehler_code(payload: ControlPayload) -> ErrorCode {
    match payload {
        ControlPayload::Error(e) => e.code,
        anderes => panic!("Fehler erwartet, erhalten: {anderes:?}"),
    }
}

#[tokio::test]
async fn test_hosten_beitreten_und_chatten() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut bob = server.client().await;

    let a = alice.hosten("alice", "r1", "p1").await;
    assert!(a.is_owner);
    assert_eq!(a.room.as_str(), "r1");

    let b = bob.beitreten("bob", "r 1", "p1").await;
    assert!(!b.is_owner);
    assert_ne!(a.connection_id, b.connection_id);

    alice.warten_auf_text("bob joined the room.").await;

    bob.senden(ControlPayload::ChatSend(ChatSendRequest { text: "hallo".into() }))
        .await;
    match alice.warten_auf_text("hallo").await {
        ControlPayload::ChatMessage(m) => {
            assert_eq!(m.username, "bob");
            assert_eq!(m.kind, ChatKind::Text);
            assert!(m.file_url.is_none());
        }
        _ => unreachable!(),
    }
    // Der Absender bekommt seine eigene Nachricht ebenfalls
    bob.warten_auf_text("hallo").await;
}

#[tokio::test]
async fn test_fehler_werden_als_code_beantwortet() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut bob = server.client().await;
    alice.hosten("alice", "r1", "p1").await;

    let id = bob.senden(ControlPayload::RoomJoin(zugang("bob", "r1", "falsch"))).await;
    assert_eq!(fehler_code(bob.antwort(id).await), ErrorCode::WrongPassword);

    let id = bob.senden(ControlPayload::RoomHost(zugang("bob", "r1", "x"))).await;
    assert_eq!(fehler_code(bob.antwort(id).await), ErrorCode::RoomCodeTaken);

    let id = bob.senden(ControlPayload::RoomJoin(zugang("", "r1", "p1"))).await;
    assert_eq!(fehler_code(bob.antwort(id).await), ErrorCode::MissingFields);

    let id = bob.senden(ControlPayload::RoomJoin(zugang("bob", "r9", "p1"))).await;
    assert_eq!(fehler_code(bob.antwort(id).await), ErrorCode::RoomNotFound);

    // Nicht-Besitzer darf das Passwort nicht aendern
    bob.beitreten("bob", "r1", "p1").await;
    let id = bob
        .senden(ControlPayload::RoomPasswordChange(RoomPasswordChangeRequest {
            new_password: "neu".into(),
        }))
        .await;
    assert_eq!(fehler_code(bob.antwort(id).await), ErrorCode::NotOwner);
}

#[tokio::test]
async fn test_sperre_blockiert_beitritt() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut bob = server.client().await;
    alice.hosten("alice", "r1", "p1").await;

    alice.senden(ControlPayload::ToggleLock).await;
    alice.warten_auf_text("Room is now locked.").await;

    let id = bob.senden(ControlPayload::RoomJoin(zugang("bob", "r1", "p1"))).await;
    assert_eq!(fehler_code(bob.antwort(id).await), ErrorCode::RoomLocked);
}

#[tokio::test]
async fn test_kick_trennt_die_verbindung() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut bob = server.client().await;
    alice.hosten("alice", "r1", "p1").await;
    let b = bob.beitreten("bob", "r1", "p1").await;

    alice
        .senden(ControlPayload::KickUser(TargetRequest { target: b.connection_id }))
        .await;

    let rest = bob.warten_auf_ende().await;
    assert!(
        matches!(rest.last(), Some(ControlPayload::Kicked)),
        "kicked ist die letzte Nachricht: {rest:?}"
    );

    alice.warten_auf_text("bob left the room.").await;
    alice.warten_auf_text("bob was kicked by the owner.").await;
}

#[tokio::test]
async fn test_ban_verhindert_neuen_beitritt() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut carol = server.client().await;
    alice.hosten("alice", "r1", "p1").await;
    let c = carol.beitreten("carol", "r1", "p1").await;

    alice
        .senden(ControlPayload::BanUser(TargetRequest { target: c.connection_id }))
        .await;
    carol.warten_auf_ende().await;
    alice.warten_auf_text("carol was banned.").await;

    let mut carol = server.client().await;
    let id = carol.senden(ControlPayload::RoomJoin(zugang("carol", "r1", "p1"))).await;
    match carol.antwort(id).await {
        ControlPayload::Error(e) => assert_eq!(e.code, ErrorCode::Banned),
        anderes => panic!("Fehler erwartet, erhalten: {anderes:?}"),
    }
}

#[tokio::test]
async fn test_unberechtigte_moderation_bleibt_unbeantwortet() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut bob = server.client().await;
    let a = alice.hosten("alice", "r1", "p1").await;
    bob.beitreten("bob", "r1", "p1").await;

    bob.senden(ControlPayload::ToggleLock).await;
    bob.senden(ControlPayload::KickUser(TargetRequest { target: a.connection_id }))
        .await;
    // Die naechste Antwort ist der Pong, keine Fehlermeldung
    bob.synchronisieren().await;

    let r1 = server
        .state
        .raeume
        .teilnehmer_liste(&plauderei_core::RoomCode::bereinigen("r1"))
        .unwrap();
    assert_eq!(r1.len(), 2);
}

#[tokio::test]
async fn test_stumm_geschaltet() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut bob = server.client().await;
    alice.hosten("alice", "r1", "p1").await;
    let b = bob.beitreten("bob", "r1", "p1").await;

    alice
        .senden(ControlPayload::MuteUser(TargetRequest { target: b.connection_id }))
        .await;
    bob.warten_auf_text("bob was muted.").await;

    bob.senden(ControlPayload::ChatSend(ChatSendRequest { text: "psst".into() }))
        .await;
    bob.warten_auf_text("You are muted by the owner.").await;

    alice
        .senden(ControlPayload::UnmuteUser(TargetRequest { target: b.connection_id }))
        .await;
    bob.warten_auf_text("bob was unmuted.").await;
    bob.senden(ControlPayload::ChatSend(ChatSendRequest { text: "wieder da".into() }))
        .await;

    // alice sieht "psst" nie, "wieder da" dagegen schon
    match alice
        .warten_auf(|p| {
            matches!(p, ControlPayload::ChatMessage(c) if c.text == "psst" || c.text == "wieder da")
        })
        .await
    {
        ControlPayload::ChatMessage(m) => assert_eq!(m.text, "wieder da"),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_raum_schliessen() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut bob = server.client().await;
    alice.hosten("alice", "r1", "p1").await;
    bob.beitreten("bob", "r1", "p1").await;

    let id = alice.senden(ControlPayload::RoomClose).await;
    assert!(matches!(alice.antwort(id).await, ControlPayload::Ack));

    let rest = alice.warten_auf_ende().await;
    assert!(matches!(rest.last(), Some(ControlPayload::Kicked)));
    let rest = bob.warten_auf_ende().await;
    assert!(matches!(rest.last(), Some(ControlPayload::Kicked)));

    assert_eq!(server.state.raeume.raum_anzahl(), 0);

    // Der Code ist wieder frei
    let mut neu = server.client().await;
    assert!(neu.hosten("dave", "r1", "p2").await.is_owner);
}

#[tokio::test]
async fn test_raum_wechseln() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut dave = server.client().await;
    let mut bob = server.client().await;
    alice.hosten("alice", "r1", "p1").await;
    dave.hosten("dave", "r2", "p2").await;
    bob.beitreten("bob", "r1", "p1").await;

    let id = bob
        .senden(ControlPayload::RoomSwitch(RoomSwitchRequest {
            room: "r2".into(),
            password: "p2".into(),
        }))
        .await;
    match bob.antwort(id).await {
        ControlPayload::RoomResponse(r) => {
            assert_eq!(r.room.as_str(), "r2");
            assert_eq!(r.username, "bob");
            assert!(!r.is_owner);
        }
        anderes => panic!("RoomResponse erwartet, erhalten: {anderes:?}"),
    }

    alice.warten_auf_text("bob left the room.").await;
    dave.warten_auf_text("bob joined the room.").await;

    let id = bob
        .senden(ControlPayload::RoomSwitch(RoomSwitchRequest {
            room: "r1".into(),
            password: "falsch".into(),
        }))
        .await;
    assert_eq!(fehler_code(bob.antwort(id).await), ErrorCode::WrongPassword);
}

#[tokio::test]
async fn test_teilnehmerliste_nach_beitritt() {
    let server = TestServer::starten().await;
    let mut alice = server.client().await;
    let mut bob = server.client().await;
    let a = alice.hosten("alice", "r1", "p1").await;
    let b = bob.beitreten("bob", "r1", "p1").await;

    match bob
        .warten_auf(|p| matches!(p, ControlPayload::Participants(l) if l.list.len() == 2))
        .await
    {
        ControlPayload::Participants(liste) => {
            assert!(!liste.is_owner);
            assert!(!liste.locked);
            assert_eq!(liste.list[0].connection_id, a.connection_id);
            assert!(liste.list[0].is_owner);
            assert_eq!(liste.list[1].connection_id, b.connection_id);
        }
        _ => unreachable!(),
    }
}
