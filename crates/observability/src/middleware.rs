//! Anfrage-Protokollierung fuer den Observability-Server
//!
//! Erfolgreiche Anfragen loggen auf `debug`, Serverfehler auf `warn`.

use axum::{extract::Request, middleware::Next, response::Response};
use tokio::time::Instant;

/// Loggt Methode, Pfad, Status und Dauer jeder Anfrage
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let methode = req.method().clone();
    let pfad = req.uri().path().to_owned();
    let beginn = Instant::now();

    let antwort = next.run(req).await;
    let dauer_ms = beginn.elapsed().as_millis() as u64;
    let status = antwort.status();

    if status.is_server_error() {
        tracing::warn!(method = %methode, path = %pfad, status = status.as_u16(), dauer_ms, "Observability-Anfrage fehlgeschlagen");
    } else {
        tracing::debug!(method = %methode, path = %pfad, status = status.as_u16(), dauer_ms, "Observability-Anfrage");
    }
    antwort
}
