use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use rand::Rng;

use super::interaction::{Board, CellRef, Gesture};
use super::render::Grid;
use crate::errors::AppError;

struct Entry {
    board: Board,
    touched_at: Instant,
}

/// Boards kept when `MAX_OPEN_BOARDS` is not set.
pub const DEFAULT_CAPACITY: usize = 500;

/// Boards of all open page sessions, keyed by an opaque id kept in the
/// cookie session. Each board is reachable from exactly one browser session.
/// At most `capacity` boards are held; opening one more drops the board
/// untouched for the longest time.
#[derive(Clone)]
pub struct BoardStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    capacity: usize,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

fn poisoned() -> AppError {
    AppError::Session("board store lock poisoned".to_string())
}

fn generate_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn open(&self, board: Board) -> Result<String, AppError> {
        let id = generate_id();
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        while map.len() >= self.capacity {
            let oldest = map
                .iter()
                .min_by_key(|(_, e)| e.touched_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    map.remove(&k);
                    log::warn!("Board store full ({} boards), dropped the least recently used", self.capacity);
                }
                None => break,
            }
        }
        map.insert(id.clone(), Entry { board, touched_at: Instant::now() });
        Ok(id)
    }

    pub fn close(&self, id: &str) -> Result<bool, AppError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(id).is_some())
    }

    /// Mutate and re-render under one write lock.
    pub fn apply(&self, id: &str, gesture: Gesture, cell: CellRef) -> Result<Grid, AppError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let entry = map.get_mut(id).ok_or(AppError::NotFound)?;
        entry.touched_at = Instant::now();
        entry.board.apply(gesture, cell).map_err(AppError::InvalidGesture)
    }

    /// Copy of the board as it is right now.
    pub fn snapshot(&self, id: &str) -> Result<Option<Board>, AppError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.get_mut(id).map(|e| {
            e.touched_at = Instant::now();
            e.board.clone()
        }))
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop boards untouched for longer than `max_idle`. Returns how many.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut map = match self.inner.write() {
            Ok(m) => m,
            Err(_) => return 0,
        };
        let before = map.len();
        map.retain(|_, e| e.touched_at.elapsed() < max_idle);
        before - map.len()
    }
}

/// Periodically evict idle boards.
pub fn spawn_sweeper(store: BoardStore, max_idle: Duration) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let evicted = store.evict_idle(max_idle);
            if evicted > 0 {
                log::info!("Evicted {} idle attendance boards ({} open)", evicted, store.len());
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::schedule::Schedule;
    use crate::models::student::Student;

    fn board() -> Board {
        Board::new(
            "R209".into(),
            "2025-06-02".into(),
            vec![Student { id: 1, nom: "Dupont".into(), prenom: "Jean".into() }],
            Schedule::default(),
        )
    }

    #[test]
    fn boards_are_isolated_by_id() {
        let store = BoardStore::new();
        let a = store.open(board()).unwrap();
        let b = store.open(board()).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);

        store.apply(&a, Gesture::Primary, CellRef { student_id: 1, slot: 0 }).unwrap();
        let ga = store.snapshot(&a).unwrap().unwrap().render();
        let gb = store.snapshot(&b).unwrap().unwrap().render();
        assert_eq!(ga.rows[0].cells[0].text, "ABI");
        assert_eq!(gb.rows[0].cells[0].text, "");
    }

    #[test]
    fn unknown_board_and_cell() {
        let store = BoardStore::new();
        let id = store.open(board()).unwrap();
        let missing = store.apply("nope", Gesture::Primary, CellRef { student_id: 1, slot: 0 });
        assert!(matches!(missing, Err(AppError::NotFound)));
        let invalid = store.apply(&id, Gesture::Primary, CellRef { student_id: 1, slot: 9 });
        assert!(matches!(invalid, Err(AppError::InvalidGesture(_))));
    }

    #[test]
    fn snapshot_is_detached_from_later_gestures() {
        let store = BoardStore::new();
        let id = store.open(board()).unwrap();
        store.apply(&id, Gesture::Primary, CellRef { student_id: 1, slot: 0 }).unwrap();
        let snap = store.snapshot(&id).unwrap().unwrap();
        store.apply(&id, Gesture::Primary, CellRef { student_id: 1, slot: 0 }).unwrap();
        assert_eq!(snap.flatten(0)[0].status, "abi");
        assert_eq!(store.snapshot(&id).unwrap().unwrap().flatten(0)[0].status, "abj");
    }

    #[test]
    fn full_store_drops_least_recently_used() {
        let store = BoardStore::with_capacity(2);
        let a = store.open(board()).unwrap();
        let b = store.open(board()).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        // touching `a` leaves `b` as the oldest
        store.apply(&a, Gesture::Primary, CellRef { student_id: 1, slot: 0 }).unwrap();

        let c = store.open(board()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.snapshot(&a).unwrap().is_some());
        assert!(store.snapshot(&b).unwrap().is_none());
        assert!(store.snapshot(&c).unwrap().is_some());
    }

    #[test]
    fn evict_and_close() {
        let store = BoardStore::new();
        let id = store.open(board()).unwrap();
        assert_eq!(store.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.evict_idle(Duration::ZERO), 1);
        assert!(store.is_empty());
        assert!(!store.close(&id).unwrap());
    }
}
