//! Bildet Rueckmeldungen des Raum-Kerns auf Prometheus-Metriken ab

use plauderei_observability::PlaudereiMetrics;
use plauderei_rooms::{RoomError, RoomObserver};

/// `RoomObserver`, der in die Prometheus-Registry schreibt
#[derive(Clone)]
pub struct MetrikBeobachter {
    metriken: PlaudereiMetrics,
}

impl MetrikBeobachter {
    pub fn neu(metriken: PlaudereiMetrics) -> Self {
        Self { metriken }
    }
}

impl RoomObserver for MetrikBeobachter {
    fn raum_angelegt(&self) {
        self.metriken.rooms_active.inc();
    }

    fn raum_geschlossen(&self) {
        self.metriken.rooms_active.dec();
    }

    fn teilnehmer_geaendert(&self, delta: i64) {
        self.metriken.participants.add(delta);
    }

    fn nachricht_weitergeleitet(&self) {
        self.metriken.chat_messages_total.inc();
    }

    fn moderation(&self, aktion: &'static str) {
        self.metriken
            .moderation_actions_total
            .with_label_values(&[aktion])
            .inc();
    }

    fn beitritt_abgelehnt(&self, grund: &RoomError) {
        self.metriken
            .join_rejections_total
            .with_label_values(&[grund.code()])
            .inc();
    }

    fn verbindung_geaendert(&self, delta: i64) {
        self.metriken.connections.add(delta);
    }
}
