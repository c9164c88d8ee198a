//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `SignalingServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task mit einer
//! `ClientConnection`. Der Raum-Kern ist synchron und haelt keine Sperre
//! ueber ein `.await`, daher laufen die Tasks auf dem normalen
//! Multi-Thread-Executor.

use plauderei_protocol::control::{ControlMessage, ErrorCode, PUSH_REQUEST_ID};
use plauderei_protocol::wire::write_frame;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::connection::ClientConnection;
use crate::error::SignalingResult;
use crate::server_state::SignalingState;

/// TCP-Signaling-Server
pub struct SignalingServer {
    state: Arc<SignalingState>,
    listener: TcpListener,
}

impl SignalingServer {
    /// Bindet den Listener
    pub async fn binden(state: Arc<SignalingState>, bind_addr: SocketAddr) -> SignalingResult<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        Ok(Self { state, listener })
    }

    /// Tatsaechlich gebundene Adresse (bei Port 0 relevant)
    pub fn lokale_addr(&self) -> SignalingResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Akzeptiert Verbindungen bis `shutdown_rx` ein `true`-Signal empfaengt
    pub async fn starten(self, mut shutdown_rx: watch::Receiver<bool>) -> SignalingResult<()> {
        tracing::info!(adresse = %self.lokale_addr()?, "TCP Signaling-Server gestartet");

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let online = self.state.broadcaster.client_anzahl() as u32;
                            if online >= self.state.config.max_connections {
                                tracing::warn!(
                                    peer = %peer_addr,
                                    max = self.state.config.max_connections,
                                    "Server voll, Verbindung abgelehnt"
                                );
                                let max_frame_size = self.state.config.max_frame_size;
                                tokio::spawn(async move {
                                    let mut stream = stream;
                                    let absage = ControlMessage::error(
                                        PUSH_REQUEST_ID,
                                        ErrorCode::ServerFull,
                                        "Server ist voll",
                                    );
                                    let _ = write_frame(&mut stream, &absage, max_frame_size).await;
                                });
                                continue;
                            }

                            if let Err(e) = stream.set_nodelay(true) {
                                tracing::debug!(peer = %peer_addr, fehler = %e, "TCP_NODELAY nicht gesetzt");
                            }

                            let verbindung = ClientConnection::neu(Arc::clone(&self.state), peer_addr);
                            let shutdown_rx_clone = shutdown_rx.clone();
                            tokio::spawn(async move {
                                verbindung.verarbeiten(stream, shutdown_rx_clone).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Signaling-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("TCP Signaling-Server gestoppt");
        Ok(())
    }
}
