//! End-to-End-Tests ueber echte TCP-Verbindungen
//!
//! Jeder Test startet einen eigenen Server auf Port 0 mit einem
//! temporaeren Upload-Verzeichnis.

mod raum_tests;

use futures_util::{SinkExt, StreamExt};
use plauderei_files::{DateiConfig, DiskStorage};
use plauderei_protocol::control::{
    ControlMessage, ControlPayload, RoomCredentials, RoomResponse, PUSH_REQUEST_ID,
};
use plauderei_protocol::wire::FrameCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_util::codec::Framed;

use crate::server_state::{SignalingConfig, SignalingState};
use crate::tcp::SignalingServer;

const WARTEZEIT: Duration = Duration::from_secs(5);

pub(crate) struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<SignalingState>,
    shutdown_tx: watch::Sender<bool>,
    _dir: tempfile::TempDir,
}

impl TestServer {
    pub async fn starten() -> Self {
        Self::mit_config(SignalingConfig::default()).await
    }

    pub async fn mit_config(config: SignalingConfig) -> Self {
        let dir = tempfile::tempdir().expect("Temp-Verzeichnis");
        let state = SignalingState::ohne_metriken(
            config,
            DiskStorage::new(dir.path()),
            DateiConfig::default(),
        );
        let server = SignalingServer::binden(Arc::clone(&state), "127.0.0.1:0".parse().unwrap())
            .await
            .expect("Binden fehlgeschlagen");
        let addr = server.lokale_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(server.starten(shutdown_rx));
        Self {
            addr,
            state,
            shutdown_tx,
            _dir: dir,
        }
    }

    pub fn herunterfahren(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn client(&self) -> TestClient {
        TestClient::verbinden(self.addr).await
    }
}

pub(crate) struct TestClient {
    leitung: Framed<TcpStream, FrameCodec>,
    naechste_id: u32,
}

impl TestClient {
    pub async fn verbinden(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("Verbinden fehlgeschlagen");
        Self {
            leitung: Framed::new(stream, FrameCodec::new()),
            naechste_id: 1,
        }
    }

    /// Sendet eine Anfrage und gibt ihre request_id zurueck
    pub async fn senden(&mut self, payload: ControlPayload) -> u32 {
        let id = self.naechste_id;
        self.naechste_id += 1;
        self.leitung
            .send(ControlMessage::new(id, payload))
            .await
            .expect("Senden fehlgeschlagen");
        id
    }

    /// Naechster Frame; `None` wenn der Server die Verbindung geschlossen hat
    pub async fn naechster(&mut self) -> Option<ControlMessage> {
        match tokio::time::timeout(WARTEZEIT, self.leitung.next()).await {
            Ok(Some(Ok(m))) => Some(m),
            Ok(Some(Err(_))) | Ok(None) => None,
            Err(_) => panic!("Zeitueberschreitung beim Warten auf einen Frame"),
        }
    }

    /// Wartet auf die Antwort zu `request_id`, Pushes werden uebersprungen
    pub async fn antwort(&mut self, request_id: u32) -> ControlPayload {
        loop {
            let m = self.naechster().await.expect("Verbindung unerwartet geschlossen");
            if m.request_id == PUSH_REQUEST_ID || matches!(m.payload, ControlPayload::Ping(_)) {
                continue;
            }
            assert_eq!(m.request_id, request_id, "Antwort auf falsche Anfrage: {m:?}");
            return m.payload;
        }
    }

    /// Wartet auf den ersten Push der `bedingung` erfuellt
    pub async fn warten_auf(&mut self, bedingung: impl Fn(&ControlPayload) -> bool) -> ControlPayload {
        loop {
            let m = self.naechster().await.expect("Verbindung unerwartet geschlossen");
            if bedingung(&m.payload) {
                return m.payload;
            }
        }
    }

    /// Wartet auf eine Chat-Nachricht mit genau diesem Text
    pub async fn warten_auf_text(&mut self, text: &str) -> ControlPayload {
        self.warten_auf(|p| matches!(p, ControlPayload::ChatMessage(c) if c.text == text))
            .await
    }

    /// Liest bis der Server die Verbindung schliesst
    pub async fn warten_auf_ende(&mut self) -> Vec<ControlPayload> {
        let mut rest = Vec::new();
        while let Some(m) = self.naechster().await {
            rest.push(m.payload);
        }
        rest
    }

    pub async fn hosten(&mut self, username: &str, raum: &str, passwort: &str) -> RoomResponse {
        let id = self.senden(ControlPayload::RoomHost(zugang(username, raum, passwort))).await;
        raum_antwort(self.antwort(id).await)
    }

    pub async fn beitreten(&mut self, username: &str, raum: &str, passwort: &str) -> RoomResponse {
        let id = self.senden(ControlPayload::RoomJoin(zugang(username, raum, passwort))).await;
        raum_antwort(self.antwort(id).await)
    }

    /// Ping-Rundlauf; stellt sicher dass alles Vorherige verarbeitet wurde
    pub async fn synchronisieren(&mut self) {
        let id = self.senden(ControlPayload::Ping(plauderei_protocol::control::PingMessage {
            timestamp_ms: 1,
        }))
        .await;
        assert!(matches!(self.antwort(id).await, ControlPayload::Pong(_)));
    }
}

pub(crate) fn zugang(username: &str, raum: &str, passwort: &str) -> RoomCredentials {
    RoomCredentials {
        username: username.into(),
        room: raum.into(),
        password: passwort.into(),
    }
}

fn raum_antwort(payload: ControlPayload) -> RoomResponse {
    match payload {
        ControlPayload::RoomResponse(r) => r,
        anderes => panic!("RoomResponse erwartet, erhalten: {anderes:?}"),
    }
}
