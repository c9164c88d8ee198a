//! Raum-Registry – die einzige geteilte veraenderliche Struktur des Kerns
//!
//! Die Registry selbst (DashMap) wird nur fuer kurze Abschnitte beim
//! Anlegen, Nachschlagen und Entfernen beruehrt. Jede Mutation eines Raums
//! laeuft unter dessen eigener Sperre in der [`RoomCell`].
//!
//! Sperr-Reihenfolge: erst Raum, dann DashMap. Ein DashMap-Eintrag wird nie
//! gehalten waehrend eine Raum-Sperre genommen wird (`holen` klont den Arc
//! und gibt die Referenz sofort frei).
//!
//! ## Zustell-Reihenfolge
//!
//! Nach dem Commit wird vor dem Freigeben der Zustands-Sperre die
//! Sendefolge-Sperre des Raums uebernommen. Die Zustellung laeuft damit
//! ohne Zustands-Sperre, aber zwei Mutationen desselben Raums stellen
//! ihre Ereignisse trotzdem in Commit-Reihenfolge zu.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use plauderei_core::RoomCode;

use crate::error::{RoomError, RoomResult};
use crate::event::{Delivery, Outbox};
use crate::room::Room;

/// Ein Raum samt Sperren
#[derive(Debug)]
pub struct RoomCell {
    code: RoomCode,
    zustand: Mutex<Room>,
    sendefolge: Mutex<()>,
}

impl RoomCell {
    fn neu(code: RoomCode, passwort: String) -> Self {
        Self {
            zustand: Mutex::new(Room::neu(code.clone(), passwort)),
            code,
            sendefolge: Mutex::new(()),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Liest den Zustand unter der Raum-Sperre
    pub fn lesen<R>(&self, f: impl FnOnce(&Room) -> R) -> R {
        let raum = self.zustand.lock();
        f(&raum)
    }

    /// Fuehrt eine Mutation aus und stellt die gesammelten Ereignisse zu
    ///
    /// Gibt `None` zurueck (ohne `f` auszufuehren) wenn der Raum bereits
    /// geschlossen wurde.
    pub fn bearbeiten<R>(
        &self,
        delivery: &dyn Delivery,
        f: impl FnOnce(&mut Room, &mut Outbox) -> R,
    ) -> Option<R> {
        let mut raum = self.zustand.lock();
        if raum.ist_geschlossen() {
            return None;
        }

        let mut outbox = Outbox::default();
        let ergebnis = f(&mut raum, &mut outbox);
        debug_assert!(raum.invarianten_gueltig(), "Raum-Invarianten verletzt");

        // Uebergabe: Sendefolge nehmen bevor der Zustand freigegeben wird
        let _folge = self.sendefolge.lock();
        drop(raum);
        outbox.zustellen(delivery);
        Some(ergebnis)
    }

    /// Mutiert zwei verschiedene Raeume atomar (Raumwechsel)
    ///
    /// Beide Sperren werden in fester Reihenfolge genommen, damit zwei
    /// gegenlaeufige Wechsel sich nicht verklemmen. `f` erhaelt die Raeume
    /// in Aufruf-Reihenfolge und muss den Schliess-Zustand selbst pruefen.
    pub fn zwei_bearbeiten<R>(
        a: &RoomCell,
        b: &RoomCell,
        delivery: &dyn Delivery,
        f: impl FnOnce(&mut Room, &mut Room, &mut Outbox) -> R,
    ) -> R {
        debug_assert!(!std::ptr::eq(a, b), "zwei_bearbeiten braucht zwei Raeume");

        let a_zuerst = Self::ordnung(a) <= Self::ordnung(b);
        let (erste, zweite) = if a_zuerst { (a, b) } else { (b, a) };

        let mut zustand_1 = erste.zustand.lock();
        let mut zustand_2 = zweite.zustand.lock();

        let mut outbox = Outbox::default();
        let ergebnis = if a_zuerst {
            f(&mut zustand_1, &mut zustand_2, &mut outbox)
        } else {
            f(&mut zustand_2, &mut zustand_1, &mut outbox)
        };

        let _folge_1 = erste.sendefolge.lock();
        let _folge_2 = zweite.sendefolge.lock();
        drop(zustand_2);
        drop(zustand_1);
        outbox.zustellen(delivery);
        ergebnis
    }

    fn ordnung(zelle: &RoomCell) -> (&RoomCode, usize) {
        (&zelle.code, zelle as *const RoomCell as usize)
    }
}

/// Zuordnung Raum-Code → Raum
#[derive(Debug, Default)]
pub struct RoomRegistry {
    raeume: DashMap<RoomCode, Arc<RoomCell>>,
}

impl RoomRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Legt einen Raum atomar an
    ///
    /// Von zwei gleichzeitigen Versuchen mit demselben Code gewinnt genau einer.
    pub fn anlegen(&self, code: RoomCode, passwort: String) -> RoomResult<Arc<RoomCell>> {
        match self.raeume.entry(code) {
            Entry::Occupied(belegt) => Err(RoomError::RaumCodeVergeben(belegt.key().to_string())),
            Entry::Vacant(frei) => {
                let zelle = Arc::new(RoomCell::neu(frei.key().clone(), passwort));
                frei.insert(Arc::clone(&zelle));
                Ok(zelle)
            }
        }
    }

    /// Schlaegt einen Raum nach
    pub fn holen(&self, code: &RoomCode) -> RoomResult<Arc<RoomCell>> {
        self.raeume
            .get(code)
            .map(|eintrag| Arc::clone(eintrag.value()))
            .ok_or_else(|| RoomError::RaumNichtGefunden(code.to_string()))
    }

    /// Entfernt genau diese Zelle (nicht einen spaeter angelegten Nachfolger)
    pub fn entfernen(&self, zelle: &Arc<RoomCell>) -> bool {
        self.raeume
            .remove_if(zelle.code(), |_, vorhanden| Arc::ptr_eq(vorhanden, zelle))
            .is_some()
    }

    pub fn existiert(&self, code: &RoomCode) -> bool {
        self.raeume.contains_key(code)
    }

    pub fn anzahl(&self) -> usize {
        self.raeume.len()
    }

    /// Momentaufnahme aller Zellen (ohne gehaltene DashMap-Referenzen)
    pub fn zellen(&self) -> Vec<Arc<RoomCell>> {
        self.raeume.iter().map(|e| Arc::clone(e.value())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RoomEvent;
    use plauderei_core::ConnectionId;

    struct Stumm;

    impl Delivery for Stumm {
        fn an_verbindung_senden(&self, _: &ConnectionId, _: RoomEvent) -> bool {
            true
        }
        fn trennen(&self, _: &ConnectionId) {}
    }

    #[test]
    fn anlegen_und_holen() {
        let registry = RoomRegistry::neu();
        let code = RoomCode::bereinigen("r1");
        registry.anlegen(code.clone(), "p1".into()).unwrap();

        assert!(registry.holen(&code).is_ok());
        assert_eq!(registry.anzahl(), 1);
        assert!(matches!(
            registry.holen(&RoomCode::bereinigen("r2")),
            Err(RoomError::RaumNichtGefunden(_))
        ));
    }

    #[test]
    fn doppelter_code_schlaegt_fehl() {
        let registry = RoomRegistry::neu();
        registry.anlegen(RoomCode::bereinigen("r1"), "a".into()).unwrap();
        let e = registry.anlegen(RoomCode::bereinigen("r 1"), "b".into()).unwrap_err();
        assert_eq!(e, RoomError::RaumCodeVergeben("r1".into()));
    }

    #[test]
    fn entfernen_nur_eigene_zelle() {
        let registry = RoomRegistry::neu();
        let code = RoomCode::bereinigen("r1");
        let alt = registry.anlegen(code.clone(), "a".into()).unwrap();
        assert!(registry.entfernen(&alt));

        let neu = registry.anlegen(code.clone(), "b".into()).unwrap();
        // Die alte Zelle darf den Nachfolger nicht entfernen
        assert!(!registry.entfernen(&alt));
        assert!(registry.existiert(&code));
        assert!(registry.entfernen(&neu));
        assert_eq!(registry.anzahl(), 0);
    }

    #[test]
    fn geschlossener_raum_wird_nicht_bearbeitet() {
        let registry = RoomRegistry::neu();
        let zelle = registry.anlegen(RoomCode::bereinigen("r1"), "a".into()).unwrap();

        assert_eq!(zelle.bearbeiten(&Stumm, |raum, _| raum.schliessen().len()), Some(0));
        assert_eq!(zelle.bearbeiten(&Stumm, |_, _| 1), None);
    }

    #[test]
    fn zwei_bearbeiten_liefert_aufruf_reihenfolge() {
        let registry = RoomRegistry::neu();
        let b = registry.anlegen(RoomCode::bereinigen("b"), "x".into()).unwrap();
        let a = registry.anlegen(RoomCode::bereinigen("a"), "x".into()).unwrap();

        let codes = RoomCell::zwei_bearbeiten(&b, &a, &Stumm, |erster, zweiter, _| {
            (erster.code().to_string(), zweiter.code().to_string())
        });
        assert_eq!(codes, ("b".to_string(), "a".to_string()));
    }

    #[test]
    fn gleichzeitiges_anlegen_genau_ein_gewinner() {
        let registry = Arc::new(RoomRegistry::neu());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .anlegen(RoomCode::bereinigen("rennen"), format!("pw{i}"))
                        .is_ok()
                })
            })
            .collect();

        let gewinner = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(gewinner, 1);
    }
}
