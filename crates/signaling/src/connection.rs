//! Client-Connection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task, eine frische `ConnectionId` und ein Postfach im
//! `EventBroadcaster`.
//!
//! ## Ablauf
//! ```text
//! Accept -> Postfach registrieren -> Schleife -> Abmelden -> Postfach entfernen
//!                                      |
//!             Frames lesen / Postfach schreiben / Keepalive / Shutdown
//! ```
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen Ping
//! - Ohne eingehenden Frame innerhalb von `verbindungs_timeout_sek`
//!   wird die Verbindung getrennt

use futures_util::{SinkExt, StreamExt};
use plauderei_core::ConnectionId;
use plauderei_protocol::{
    control::{ControlMessage, ErrorCode},
    wire::FrameCodec,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

use crate::broadcast::{Ausgehend, Postfach};
use crate::dispatcher::{jetzt_ms, DispatcherContext, MessageDispatcher};
use crate::error::{SignalingError, SignalingResult};
use crate::server_state::SignalingState;

type Leitung = Framed<TcpStream, FrameCodec>;

/// Verarbeitet eine einzelne TCP-Verbindung
pub struct ClientConnection {
    state: Arc<SignalingState>,
    peer_addr: SocketAddr,
    verbindung: ConnectionId,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection mit frischer ID
    pub fn neu(state: Arc<SignalingState>, peer_addr: SocketAddr) -> Self {
        Self {
            state,
            peer_addr,
            verbindung: ConnectionId::new(),
        }
    }

    pub fn verbindung(&self) -> ConnectionId {
        self.verbindung
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis der Client trennt, der Kern die Verbindung zwangsweise
    /// trennt, das Idle-Timeout greift oder ein Shutdown-Signal eingeht.
    pub async fn verarbeiten(self, stream: TcpStream, mut shutdown_rx: watch::Receiver<bool>) {
        let peer_addr = self.peer_addr;
        let verbindung = self.verbindung;
        tracing::info!(peer = %peer_addr, verbindung = %verbindung, "Neue Verbindung");

        let Postfach { mut rx, abbruch } = self.state.broadcaster.client_registrieren(verbindung);
        self.state.observer.verbindung_geaendert(1);

        let mut leitung = Framed::new(
            stream,
            FrameCodec::with_max_size(self.state.config.max_frame_size),
        );
        let dispatcher = MessageDispatcher::neu(Arc::clone(&self.state));
        let ctx = DispatcherContext {
            verbindung,
            peer_addr,
        };

        let ergebnis = self
            .schleife(&mut leitung, &mut rx, &abbruch, &dispatcher, &ctx, &mut shutdown_rx)
            .await;
        match &ergebnis {
            Ok(()) => tracing::debug!(verbindung = %verbindung, "Verbindung regulaer beendet"),
            Err(SignalingError::VerbindungGetrennt) => {
                tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
            }
            Err(e) => tracing::warn!(peer = %peer_addr, fehler = %e, "Verbindung abgebrochen"),
        }

        let _ = leitung.close().await;
        dispatcher.client_cleanup(&verbindung);
        self.state.observer.verbindung_geaendert(-1);

        tracing::info!(peer = %peer_addr, verbindung = %verbindung, "Verbindungs-Task beendet");
    }

    async fn schleife(
        &self,
        leitung: &mut Leitung,
        rx: &mut mpsc::Receiver<Ausgehend>,
        abbruch: &CancellationToken,
        dispatcher: &MessageDispatcher,
        ctx: &DispatcherContext,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> SignalingResult<()> {
        let keepalive_intervall = Duration::from_secs(self.state.config.keepalive_sek.max(1));
        let timeout_dauer = Duration::from_secs(self.state.config.verbindungs_timeout_sek.max(1));

        let mut letzter_empfang = Instant::now();
        let mut naechster_ping = Instant::now() + keepalive_intervall;
        let mut ping_request_id: u32 = 0;

        loop {
            let frist = naechster_ping.min(letzter_empfang + timeout_dauer);

            tokio::select! {
                // Eingehende Nachricht vom Client
                frame = leitung.next() => {
                    let nachricht = match frame {
                        Some(Ok(n)) => n,
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(SignalingError::VerbindungGetrennt),
                    };
                    letzter_empfang = Instant::now();
                    tracing::trace!(
                        verbindung = %ctx.verbindung,
                        request_id = nachricht.request_id,
                        "Nachricht empfangen"
                    );

                    if let Some(antwort) = dispatcher.dispatch(nachricht, ctx).await {
                        leitung.send(antwort).await?;
                    }
                }

                // Ausgehende Ereignisse aus dem Raum-Kern
                eintrag = rx.recv() => {
                    match eintrag {
                        Some(Ausgehend::Nachricht(n)) => leitung.send(n).await?,
                        Some(Ausgehend::Trennen) => {
                            tracing::debug!(verbindung = %ctx.verbindung, "Zwangstrennung");
                            return Ok(());
                        }
                        None => return Ok(()),
                    }
                }

                // Zwangstrennung bei vollem Postfach
                _ = abbruch.cancelled() => {
                    while let Ok(eintrag) = rx.try_recv() {
                        match eintrag {
                            Ausgehend::Nachricht(n) => leitung.feed(n).await?,
                            Ausgehend::Trennen => break,
                        }
                    }
                    leitung.flush().await?;
                    return Ok(());
                }

                // Keepalive-Ping und Idle-Timeout
                _ = tokio::time::sleep_until(frist) => {
                    let jetzt = Instant::now();
                    if jetzt.duration_since(letzter_empfang) >= timeout_dauer {
                        return Err(SignalingError::Timeout);
                    }
                    if jetzt >= naechster_ping {
                        ping_request_id = ping_request_id.wrapping_add(1);
                        leitung.send(ControlMessage::ping(ping_request_id, jetzt_ms())).await?;
                        naechster_ping = jetzt + keepalive_intervall;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(verbindung = %ctx.verbindung, "Shutdown-Signal, Verbindung wird getrennt");
                        let abschied = ControlMessage::error(
                            0,
                            ErrorCode::InternalError,
                            "Server wird heruntergefahren",
                        );
                        let _ = leitung.send(abschied).await;
                        return Ok(());
                    }
                }
            }
        }
    }
}
