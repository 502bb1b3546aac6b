use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::GameError;
use crate::game::GameState;

/// Owner of the live game snapshot.
///
/// Readers get an `Arc` to an immutable snapshot. Writers go through
/// [`GameStore::transition`], which serialises every read-modify-write
/// behind one lock and swaps in a fresh snapshot only on success.
#[derive(Clone)]
pub struct GameStore {
    current: Arc<Mutex<Arc<GameState>>>,
}

impl GameStore {
    pub fn new(state: GameState) -> Self {
        Self {
            current: Arc::new(Mutex::new(Arc::new(state))),
        }
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<GameState> {
        Arc::clone(&self.lock())
    }

    /// Applies `f` to a copy of the current snapshot. The copy replaces the
    /// current snapshot only if `f` returns `Ok`; on `Err` nothing changes.
    pub fn transition<T, F>(&self, f: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut GameState) -> Result<T, GameError>,
    {
        let mut guard = self.lock();
        let mut next = GameState::clone(&guard);
        let out = f(&mut next)?;
        *guard = Arc::new(next);
        Ok(out)
    }

    /// A transition that cannot fail.
    pub fn update<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut GameState) -> T,
    {
        let mut guard = self.lock();
        let mut next = GameState::clone(&guard);
        let out = f(&mut next);
        *guard = Arc::new(next);
        out
    }

    fn lock(&self) -> MutexGuard<'_, Arc<GameState>> {
        // A panic inside a transition never publishes its copy, so the
        // stored snapshot is still whole.
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
