//! plauderei-files – Dateiversand in Raeumen
//!
//! Dieses Crate implementiert:
//! - FileService: Upload mit Groessen-Limit und SHA-256, Download
//! - StorageBackend-Trait + DiskStorage-Implementierung
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use plauderei_files::{DateiConfig, DiskStorage, FileService};
//! # fn beispiel(raeume: Arc<plauderei_rooms::RoomService>) {
//! let storage = Arc::new(DiskStorage::new("uploads"));
//! let files = FileService::neu(storage, raeume, DateiConfig::default());
//! # }
//! ```

pub mod error;
pub mod service;
pub mod storage;
pub mod types;


// Bequeme Re-Exporte
pub use error::{FileError, FileResult};
pub use service::FileService;
pub use storage::{DiskStorage, StorageBackend};
pub use types::{dateiname_bereinigen, DateiConfig, HochgeladeneDatei};
