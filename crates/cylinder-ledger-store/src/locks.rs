//! Per-cylinder write locks.
//!
//! Stores that cannot check-and-append atomically take one of these locks
//! around the check and the write. Cylinders are hashed onto a fixed set of
//! stripes, so two cylinders may share a stripe but one cylinder always maps
//! to the same stripe.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

use cylinder_ledger_core::CylinderKey;

/// Default number of lock stripes.
pub const DEFAULT_STRIPES: usize = 64;

/// A striped lock table keyed by cylinder.
pub struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyLocks {
    /// Create a table with `stripes` locks (at least one).
    #[must_use]
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Lock the stripe owning `cylinder`. Released when the guard drops.
    pub fn lock(&self, cylinder: &CylinderKey) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned stripe carries no broken state.
        self.stripes[self.stripe_of(cylinder)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn stripe_of(&self, cylinder: &CylinderKey) -> usize {
        let mut hasher = DefaultHasher::new();
        cylinder.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}

impl std::fmt::Debug for KeyLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLocks")
            .field("stripes", &self.stripes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cylinder_ledger_core::{CylinderCode, GasType};

    fn cylinder(serial: u32) -> CylinderKey {
        let gas = GasType::new("Oxygen");
        CylinderKey::new(gas.clone(), CylinderCode::for_serial(&gas, serial))
    }

    #[test]
    fn same_cylinder_same_stripe() {
        let locks = KeyLocks::default();
        assert_eq!(locks.stripe_of(&cylinder(7)), locks.stripe_of(&cylinder(7)));
    }

    #[test]
    fn zero_stripes_is_clamped() {
        let locks = KeyLocks::new(0);
        drop(locks.lock(&cylinder(1)));
    }

    #[test]
    fn lock_excludes_concurrent_holders() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let locks = Arc::new(KeyLocks::new(4));
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let _guard = locks.lock(&cylinder(3));
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
