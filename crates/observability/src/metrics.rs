//! Prometheus-kompatible Metriken fuer Plauderei
//!
//! Registrierte Metriken:
//! - `plauderei_rooms_active` – Gauge: Raeume in der Registry
//! - `plauderei_participants` – Gauge: Angemeldete Teilnehmer ueber alle Raeume
//! - `plauderei_connections` – Gauge: Offene TCP-Verbindungen
//! - `plauderei_chat_messages_total` – Counter: Weitergeleitete Chat-Nachrichten
//! - `plauderei_moderation_actions_total` – Counter (action): Besitzer-Aktionen
//! - `plauderei_join_rejections_total` – Counter (reason): Abgelehnte Beitritte

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Alle Plauderei-Prometheus-Metriken
#[derive(Clone)]
pub struct PlaudereiMetrics {
    pub registry: Arc<Registry>,

    pub rooms_active: IntGauge,
    pub participants: IntGauge,
    pub connections: IntGauge,
    pub chat_messages_total: IntCounter,
    pub moderation_actions_total: IntCounterVec,
    pub join_rejections_total: IntCounterVec,
}

impl PlaudereiMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let rooms_active = IntGauge::with_opts(Opts::new(
            "plauderei_rooms_active",
            "Anzahl der Raeume in der Registry",
        ))?;
        registry.register(Box::new(rooms_active.clone()))?;

        let participants = IntGauge::with_opts(Opts::new(
            "plauderei_participants",
            "Angemeldete Teilnehmer ueber alle Raeume",
        ))?;
        registry.register(Box::new(participants.clone()))?;

        let connections = IntGauge::with_opts(Opts::new(
            "plauderei_connections",
            "Offene TCP-Verbindungen",
        ))?;
        registry.register(Box::new(connections.clone()))?;

        let chat_messages_total = IntCounter::with_opts(Opts::new(
            "plauderei_chat_messages_total",
            "Weitergeleitete Chat-Nachrichten",
        ))?;
        registry.register(Box::new(chat_messages_total.clone()))?;

        let moderation_actions_total = IntCounterVec::new(
            Opts::new(
                "plauderei_moderation_actions_total",
                "Ausgefuehrte Besitzer-Aktionen",
            ),
            &["action"],
        )?;
        registry.register(Box::new(moderation_actions_total.clone()))?;

        let join_rejections_total = IntCounterVec::new(
            Opts::new(
                "plauderei_join_rejections_total",
                "Abgelehnte Beitritts- und Wechselversuche",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(join_rejections_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            rooms_active,
            participants,
            connections,
            chat_messages_total,
            moderation_actions_total,
            join_rejections_total,
        })
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: PlaudereiMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<PlaudereiMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
