//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use anyhow::{anyhow, Context, Result};
use plauderei_core::PlaudereiError;
use plauderei_files::DateiConfig;
use plauderei_signaling::SignalingConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Umgebungsvariable fuer den Pfad der Konfigurationsdatei
pub const CONFIG_ENV: &str = "PLAUDEREI_CONFIG";

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Datei-Uploads
    pub dateien: DateiEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken, Health)
    pub observability: ObservabilityEinstellungen,
    /// Keepalive und Postfaecher pro Verbindung
    pub verbindung: VerbindungsEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen
    pub max_connections: u32,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Plauderei".into(),
            max_connections: 512,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer TCP und Observability
    pub bind_adresse: String,
    /// Port fuer die Control-Verbindung
    pub tcp_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "127.0.0.1".into(),
            tcp_port: 5000,
        }
    }
}

/// Datei-Uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateiEinstellungen {
    /// Ablage-Verzeichnis (pro Raum ein Unterverzeichnis)
    pub verzeichnis: String,
    /// Maximale Upload-Groesse in Bytes
    pub max_upload_bytes: u64,
    /// Oeffentliches URL-Praefix
    pub url_praefix: String,
}

impl Default for DateiEinstellungen {
    fn default() -> Self {
        let standard = DateiConfig::default();
        Self {
            verzeichnis: "uploads".into(),
            max_upload_bytes: standard.max_upload_bytes,
            url_praefix: standard.url_praefix,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Filter-Ausdruck, z.B. "info" oder "plauderei_rooms=debug,info"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen (Metriken + Health-Check)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Aktiviert den Observability-Server
    pub aktiviert: bool,
    /// Port fuer Metriken und Health
    pub port: u16,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: true,
            port: 9300,
        }
    }
}

/// Keepalive und Postfaecher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerbindungsEinstellungen {
    /// Ping-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Verbindung wird nach so vielen Sekunden ohne Frame getrennt
    pub timeout_sek: u64,
    /// Ausgehende Nachrichten, die pro Verbindung gepuffert werden
    pub postfach_groesse: usize,
}

impl Default for VerbindungsEinstellungen {
    fn default() -> Self {
        let standard = SignalingConfig::default();
        Self {
            keepalive_sek: standard.keepalive_sek,
            timeout_sek: standard.verbindungs_timeout_sek,
            postfach_groesse: standard.postfach_groesse,
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config.validieren()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow!("Konfigurationsdatei '{pfad}' nicht lesbar: {e}")),
        }
    }

    /// Prueft Werte, die zwar parsen aber keinen lauffaehigen Server ergeben
    pub fn validieren(&self) -> plauderei_core::Result<()> {
        if self.server.max_connections == 0 {
            return Err(PlaudereiError::konfiguration("server.max_connections ist 0"));
        }
        if self.verbindung.postfach_groesse == 0 {
            return Err(PlaudereiError::konfiguration("verbindung.postfach_groesse ist 0"));
        }
        if self.verbindung.timeout_sek <= self.verbindung.keepalive_sek {
            return Err(PlaudereiError::konfiguration(format!(
                "verbindung.timeout_sek ({}) muss groesser als keepalive_sek ({}) sein",
                self.verbindung.timeout_sek, self.verbindung.keepalive_sek
            )));
        }
        if self.dateien.verzeichnis.trim().is_empty() {
            return Err(PlaudereiError::konfiguration("dateien.verzeichnis ist leer"));
        }
        Ok(())
    }

    /// Pfad aus `PLAUDEREI_CONFIG`, sonst `config.toml`
    pub fn pfad_aus_env() -> String {
        std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".into())
    }

    /// Gibt die Bind-Adresse fuer die Control-Verbindung zurueck
    pub fn tcp_bind_adresse(&self) -> Result<SocketAddr> {
        let roh = format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.tcp_port);
        roh.parse()
            .with_context(|| format!("Ungueltige TCP-Bind-Adresse: {roh}"))
    }

    /// Gibt die Bind-Adresse fuer den Observability-Server zurueck
    pub fn observability_bind_adresse(&self) -> Result<SocketAddr> {
        let roh = format!("{}:{}", self.netzwerk.bind_adresse, self.observability.port);
        roh.parse()
            .with_context(|| format!("Ungueltige Observability-Bind-Adresse: {roh}"))
    }

    /// Konfiguration fuer den Signaling-Service
    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            max_connections: self.server.max_connections,
            keepalive_sek: self.verbindung.keepalive_sek,
            verbindungs_timeout_sek: self.verbindung.timeout_sek,
            postfach_groesse: self.verbindung.postfach_groesse,
            ..SignalingConfig::default()
        }
    }

    /// Konfiguration fuer den Datei-Dienst
    pub fn datei_config(&self) -> DateiConfig {
        DateiConfig {
            max_upload_bytes: self.dateien.max_upload_bytes,
            url_praefix: self.dateien.url_praefix.clone(),
        }
    }
}
