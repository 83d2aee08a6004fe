//! Leaderboard
//!
//! A ranked-score store is reached through `RankedScoreStore`, whose
//! operations complete through callbacks (possibly much later, possibly
//! never). `LeaderboardClient` wraps one with in-flight guards, a cache of the
//! last fetched entries and a client-side fetch cooldown. Gameplay never waits
//! on it.
//!
//! `LocalBoard` is an in-process store keeping the top N scores, persisted
//! through the key-value store.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_KEY;
use crate::persistence::KeyValueStore;
use crate::tuning::GameTuning;

/// Default number of scores a `LocalBoard` keeps
pub const MAX_LOCAL_ENTRIES: usize = 20;

/// A single ranked score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u64,
    /// Unix timestamp (ms) when submitted
    pub created_at: f64,
}

/// Completion for a submission: true when the store accepted it
pub type SubmitCallback = Box<dyn FnOnce(bool)>;

/// Completion for a fetch: entries sorted by descending score, or an error
pub type FetchCallback = Box<dyn FnOnce(Result<Vec<LeaderboardEntry>, String>)>;

/// Remote (or local) ranked-score service
pub trait RankedScoreStore {
    fn submit(&mut self, player_name: &str, score: u64, on_done: SubmitCallback);
    fn fetch_top(&mut self, limit: usize, on_done: FetchCallback);
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

// === Local board ===

/// Top-N scores kept in process, sorted descending
pub struct LocalBoard {
    entries: Vec<LeaderboardEntry>,
    capacity: usize,
    store: Option<Box<dyn KeyValueStore>>,
}

impl LocalBoard {
    /// Empty, unpersisted board
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            store: None,
        }
    }

    /// Board backed by a store, reading any entries already saved there
    pub fn load(store: Box<dyn KeyValueStore>, capacity: usize) -> Self {
        let json = store.get_string(LEADERBOARD_KEY, "");
        let mut entries: Vec<LeaderboardEntry> = if json.is_empty() {
            Vec::new()
        } else {
            match serde_json::from_str(&json) {
                Ok(entries) => entries,
                Err(err) => {
                    log::warn!("Discarding unreadable leaderboard: {}", err);
                    Vec::new()
                }
            }
        };
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        let capacity = capacity.max(1);
        entries.truncate(capacity);
        log::info!("Loaded {} leaderboard entries", entries.len());

        Self {
            entries,
            capacity,
            store: Some(store),
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < self.capacity {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score; returns the rank achieved or None if it didn't qualify
    pub fn add_score(&mut self, player_name: &str, score: u64, created_at: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = LeaderboardEntry {
            player_name: player_name.to_string(),
            score,
            created_at,
        };

        // Equal scores rank below the ones already there
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(self.capacity);
        self.persist();

        Some(rank)
    }

    fn persist(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match serde_json::to_string(&self.entries) {
            Ok(json) => {
                store.set_string(LEADERBOARD_KEY, &json);
                store.save();
                log::debug!("Leaderboard saved ({} entries)", self.entries.len());
            }
            Err(err) => log::warn!("Leaderboard serialize failed: {}", err),
        }
    }
}

impl RankedScoreStore for LocalBoard {
    fn submit(&mut self, player_name: &str, score: u64, on_done: SubmitCallback) {
        let rank = self.add_score(player_name, score, now_ms());
        on_done(rank.is_some());
    }

    fn fetch_top(&mut self, limit: usize, on_done: FetchCallback) {
        on_done(Ok(self.entries.iter().take(limit).cloned().collect()));
    }
}

// === Client ===

#[derive(Debug, Default)]
struct ClientState {
    fetching: bool,
    submitting: bool,
    cache: Vec<LeaderboardEntry>,
    /// Seconds until the next fetch is allowed
    cooldown: f32,
    last_error: Option<String>,
}

/// Rate-limited front end for a ranked-score store
pub struct LeaderboardClient {
    backend: Option<Box<dyn RankedScoreStore>>,
    state: Rc<RefCell<ClientState>>,
    fetch_cooldown: f32,
    fetch_limit: usize,
}

impl LeaderboardClient {
    pub fn new(backend: Option<Box<dyn RankedScoreStore>>, fetch_cooldown: f32, fetch_limit: usize) -> Self {
        Self {
            backend,
            state: Rc::new(RefCell::new(ClientState::default())),
            fetch_cooldown: fetch_cooldown.max(0.0),
            fetch_limit: fetch_limit.max(1),
        }
    }

    pub fn from_tuning(backend: Option<Box<dyn RankedScoreStore>>, tuning: &GameTuning) -> Self {
        Self::new(backend, tuning.fetch_cooldown, tuning.fetch_limit)
    }

    /// Client with no store behind it
    pub fn unconfigured() -> Self {
        Self::new(None, 0.0, MAX_LOCAL_ENTRIES)
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn is_fetching(&self) -> bool {
        self.state.borrow().fetching
    }

    pub fn is_submitting(&self) -> bool {
        self.state.borrow().submitting
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.state.borrow().cooldown.max(0.0)
    }

    /// A fetch issued now would reach the store
    pub fn can_fetch(&self) -> bool {
        let state = self.state.borrow();
        self.backend.is_some() && !state.fetching && state.cooldown <= 0.0
    }

    /// Entries from the last successful fetch
    pub fn cached_entries(&self) -> Vec<LeaderboardEntry> {
        self.state.borrow().cache.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    /// Count down the fetch cooldown
    pub fn update(&mut self, dt: f32) {
        let mut state = self.state.borrow_mut();
        if state.cooldown > 0.0 {
            state.cooldown = (state.cooldown - dt).max(0.0);
        }
    }

    /// Submit a score; returns false (and reports failure) when rejected
    pub fn submit(&mut self, player_name: &str, score: u64, on_done: impl FnOnce(bool) + 'static) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            log::debug!("Leaderboard not configured, dropping submission");
            on_done(false);
            return false;
        };
        if self.state.borrow().submitting {
            log::debug!("Submission already in flight");
            on_done(false);
            return false;
        }

        self.state.borrow_mut().submitting = true;
        log::info!("Submitting score {} for {}", score, player_name);

        let state = Rc::clone(&self.state);
        backend.submit(
            player_name,
            score,
            Box::new(move |ok| {
                {
                    let mut state = state.borrow_mut();
                    state.submitting = false;
                    if !ok {
                        state.last_error = Some("submission rejected".to_string());
                    }
                }
                on_done(ok);
            }),
        );
        true
    }

    /// Fetch the top entries
    ///
    /// Answers from the cache when unconfigured, already fetching or cooling
    /// down; returns true only when a request went out.
    pub fn fetch_top(&mut self, on_done: impl FnOnce(&[LeaderboardEntry]) + 'static) -> bool {
        if !self.can_fetch() {
            let cache = self.cached_entries();
            on_done(&cache);
            return false;
        }
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };

        {
            let mut state = self.state.borrow_mut();
            state.fetching = true;
            state.cooldown = self.fetch_cooldown;
        }

        let state = Rc::clone(&self.state);
        backend.fetch_top(
            self.fetch_limit,
            Box::new(move |result| {
                let cache = {
                    let mut state = state.borrow_mut();
                    state.fetching = false;
                    match result {
                        Ok(entries) => {
                            state.cache = entries;
                            state.last_error = None;
                        }
                        Err(err) => {
                            log::warn!("Leaderboard fetch failed: {}", err);
                            state.last_error = Some(err);
                        }
                    }
                    state.cache.clone()
                };
                on_done(&cache);
            }),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{JsonFileStore, MemoryStore};

    /// Store that parks callbacks until told to complete them
    #[derive(Default)]
    struct Deferred {
        submits: Rc<RefCell<Vec<SubmitCallback>>>,
        fetches: Rc<RefCell<Vec<FetchCallback>>>,
    }

    impl RankedScoreStore for Deferred {
        fn submit(&mut self, _player_name: &str, _score: u64, on_done: SubmitCallback) {
            self.submits.borrow_mut().push(on_done);
        }

        fn fetch_top(&mut self, _limit: usize, on_done: FetchCallback) {
            self.fetches.borrow_mut().push(on_done);
        }
    }

    fn entry(name: &str, score: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            player_name: name.to_string(),
            score,
            created_at: 0.0,
        }
    }

    #[test]
    fn test_local_board_sorted_and_trimmed() {
        let mut board = LocalBoard::new(3);
        assert_eq!(board.add_score("a", 100, 0.0), Some(1));
        assert_eq!(board.add_score("b", 300, 0.0), Some(1));
        assert_eq!(board.add_score("c", 200, 0.0), Some(2));
        assert_eq!(board.add_score("d", 50, 0.0), None);
        assert_eq!(board.add_score("e", 250, 0.0), Some(2));

        let scores: Vec<u64> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 250, 200]);
        assert_eq!(board.top_score(), Some(300));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let board = LocalBoard::new(5);
        assert!(!board.qualifies(0));
        assert_eq!(board.potential_rank(0), None);
        assert_eq!(board.potential_rank(10), Some(1));
    }

    #[test]
    fn test_tie_ranks_below_existing() {
        let mut board = LocalBoard::new(5);
        board.add_score("first", 100, 0.0);
        assert_eq!(board.add_score("second", 100, 0.0), Some(2));
        assert_eq!(board.entries()[0].player_name, "first");
    }

    #[test]
    fn test_local_board_persists_through_store() {
        let mut store = MemoryStore::new();
        let json = serde_json::to_string(&vec![entry("x", 10), entry("y", 90)]).unwrap();
        store.set_string(LEADERBOARD_KEY, &json);

        let mut board = LocalBoard::load(Box::new(store), 5);
        assert_eq!(board.top_score(), Some(90));
        board.add_score("z", 50, 0.0);
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn test_local_board_survives_file_reopen() {
        let dir = std::env::temp_dir().join(format!("merge-drop-board-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("board.json");
        {
            let mut board = LocalBoard::load(Box::new(JsonFileStore::open_or_fresh(&path)), 5);
            board.add_score("kit", 320, 0.0);
            board.add_score("ash", 410, 0.0);
        }

        let board = LocalBoard::load(Box::new(JsonFileStore::open_or_fresh(&path)), 5);
        assert_eq!(board.len(), 2);
        assert_eq!(board.top_score(), Some(410));
        assert_eq!(board.entries()[1].player_name, "kit");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_board_starts_empty() {
        let mut store = MemoryStore::new();
        store.set_string(LEADERBOARD_KEY, "{not json");
        let board = LocalBoard::load(Box::new(store), 5);
        assert!(board.is_empty());
    }

    #[test]
    fn test_unconfigured_client_answers_empty() {
        let mut client = LeaderboardClient::unconfigured();
        let got = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&got);
        assert!(!client.fetch_top(move |entries| *sink.borrow_mut() = Some(entries.len())));
        assert_eq!(*got.borrow(), Some(0));

        let ok = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&ok);
        assert!(!client.submit("me", 10, move |r| *sink.borrow_mut() = Some(r)));
        assert_eq!(*ok.borrow(), Some(false));
    }

    #[test]
    fn test_fetch_cooldown_serves_cache() {
        let mut board = LocalBoard::new(10);
        board.add_score("a", 40, 0.0);
        let mut client = LeaderboardClient::new(Some(Box::new(board)), 15.0, 20);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        assert!(client.fetch_top(move |e| sink.borrow_mut().push(e.len())));
        assert!(!client.can_fetch());
        assert!((client.cooldown_remaining() - 15.0).abs() < 1e-6);

        let sink = Rc::clone(&seen);
        assert!(!client.fetch_top(move |e| sink.borrow_mut().push(e.len())));
        assert_eq!(*seen.borrow(), vec![1, 1]);

        client.update(15.0);
        assert!(client.can_fetch());
    }

    #[test]
    fn test_in_flight_guards() {
        let deferred = Deferred::default();
        let submits = Rc::clone(&deferred.submits);
        let fetches = Rc::clone(&deferred.fetches);
        let mut client = LeaderboardClient::new(Some(Box::new(deferred)), 0.0, 20);

        assert!(client.submit("a", 10, |_| {}));
        assert!(client.is_submitting());
        let rejected = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&rejected);
        assert!(!client.submit("a", 20, move |ok| *sink.borrow_mut() = Some(ok)));
        assert_eq!(*rejected.borrow(), Some(false));

        assert!(client.fetch_top(|_| {}));
        assert!(client.is_fetching());
        assert!(!client.can_fetch());

        let done = submits.borrow_mut().pop().unwrap();
        done(true);
        assert!(!client.is_submitting());

        let done = fetches.borrow_mut().pop().unwrap();
        done(Ok(vec![entry("a", 10)]));
        assert!(!client.is_fetching());
        assert_eq!(client.cached_entries().len(), 1);
    }

    #[test]
    fn test_failed_fetch_keeps_cache() {
        let deferred = Deferred::default();
        let fetches = Rc::clone(&deferred.fetches);
        let mut client = LeaderboardClient::new(Some(Box::new(deferred)), 0.0, 20);

        client.fetch_top(|_| {});
        let done = fetches.borrow_mut().pop().unwrap();
        done(Ok(vec![entry("a", 10), entry("b", 5)]));

        client.fetch_top(|_| {});
        let done = fetches.borrow_mut().pop().unwrap();
        done(Err("offline".to_string()));
        assert_eq!(client.cached_entries().len(), 2);
        assert_eq!(client.last_error().as_deref(), Some("offline"));
    }
}
