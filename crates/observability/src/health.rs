//! Health-Check-Endpunkt fuer Plauderei
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime und Anzahl aktiver Raeume

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    /// Shutdown laeuft, keine neuen Verbindungen
    ShuttingDown,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_rooms: usize,
}

type RaumZaehler = Arc<dyn Fn() -> usize + Send + Sync>;

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    start_time: Instant,
    faehrt_herunter: Arc<AtomicBool>,
    aktive_raeume: RaumZaehler,
}

impl HealthState {
    /// `aktive_raeume` wird bei jeder Anfrage neu abgefragt
    pub fn neu(aktive_raeume: impl Fn() -> usize + Send + Sync + 'static) -> Self {
        Self {
            start_time: Instant::now(),
            faehrt_herunter: Arc::new(AtomicBool::new(false)),
            aktive_raeume: Arc::new(aktive_raeume),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn herunterfahren_melden(&self) {
        self.faehrt_herunter.store(true, Ordering::Relaxed);
    }

    /// Aktueller Zustand als Antwort-Objekt
    pub fn bericht(&self) -> HealthResponse {
        let status = if self.faehrt_herunter.load(Ordering::Relaxed) {
            HealthStatus::ShuttingDown
        } else {
            HealthStatus::Healthy
        };
        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            active_rooms: (self.aktive_raeume)(),
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let bericht = state.bericht();
    let http_status = match bericht.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
    };
    (http_status, Json(bericht))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn bericht_fragt_raeume_live_ab() {
        let zaehler = Arc::new(AtomicUsize::new(0));
        let quelle = Arc::clone(&zaehler);
        let state = HealthState::neu(move || quelle.load(Ordering::Relaxed));

        assert_eq!(state.bericht().active_rooms, 0);
        zaehler.store(3, Ordering::Relaxed);
        assert_eq!(state.bericht().active_rooms, 3);
        assert!(state.uptime_seconds() < 5);
    }

    #[test]
    fn health_response_serialisierung() {
        let state = HealthState::neu(|| 2);
        let json = serde_json::to_string(&state.bericht()).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"active_rooms\":2"));
        assert!(json.contains(&format!("\"version\":\"{}\"", env!("CARGO_PKG_VERSION"))));
    }

    #[tokio::test]
    async fn shutdown_liefert_503() {
        let state = HealthState::neu(|| 0);
        let antwort = health_handler(State(state.clone())).await.into_response();
        assert_eq!(antwort.status(), StatusCode::OK);

        state.herunterfahren_melden();
        assert_eq!(state.bericht().status, HealthStatus::ShuttingDown);
        let antwort = health_handler(State(state)).await.into_response();
        assert_eq!(antwort.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
