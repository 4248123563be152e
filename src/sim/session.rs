//! Run lifecycle and score
//!
//! The session outlives individual runs. It owns the score total, the
//! StartGame/InProgress/GameOver state, and the listener registry through
//! which UI hosts hear about changes.

use std::task::Poll;

use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, CUE_START};
use crate::consts::RELOAD_TICKS;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Fresh launch, first run playable
    #[default]
    StartGame,
    /// A (re)started run is in progress
    InProgress,
    /// Run ended; input is gated until restart
    GameOver,
}

/// Outward notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    ScoreChanged(u64),
    StateChanged(SessionState),
}

/// Score total and the latest reward multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub total: u64,
    pub multiplier: u32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            total: 0,
            multiplier: 1,
        }
    }
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u32);

type Listener = Box<dyn FnMut(&SessionEvent)>;

/// Pending restart: the world reload that must finish before the next run
/// starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadTask {
    remaining_ticks: u32,
}

impl ReloadTask {
    pub fn new(ticks: u32) -> Self {
        Self {
            remaining_ticks: ticks,
        }
    }

    /// Advance the reload by one tick
    pub fn poll(&mut self) -> Poll<()> {
        if self.remaining_ticks == 0 {
            Poll::Ready(())
        } else {
            self.remaining_ticks -= 1;
            Poll::Pending
        }
    }
}

/// Session state shared across runs
pub struct GameSession {
    state: SessionState,
    score: ScoreState,
    listeners: Vec<(Subscription, Listener)>,
    next_subscription: u32,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::StartGame,
            score: ScoreState::default(),
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    /// Register a listener for score and state changes
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + 'static) -> Subscription {
        let handle = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((handle, Box::new(listener)));
        handle
    }

    /// Remove a listener; it is never called again
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.listeners.retain(|(s, _)| *s != subscription);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Begin a new run (no-op while one is already in progress)
    pub fn start_game(&mut self, audio: &mut dyn AudioSink) {
        if self.state == SessionState::InProgress {
            return;
        }
        self.set_state(SessionState::InProgress);
        self.score.multiplier = 1;
        self.set_score(0);
        audio.play(CUE_START);
        log::info!("Game started");
    }

    /// End the current run
    pub fn end_game(&mut self) {
        if self.state != SessionState::GameOver {
            log::info!("Game over with score {}", self.score.total);
        }
        self.set_state(SessionState::GameOver);
    }

    /// Add a landing reward
    pub fn add_score(&mut self, amount: u32) {
        self.score.multiplier = amount;
        self.set_score(self.score.total + amount as u64);
    }

    /// Rewarded-ad bonus: double the total
    pub fn double_score(&mut self) {
        self.set_score(self.score.total.saturating_mul(2));
    }

    /// Request a restart (only honored once the run is over)
    ///
    /// The caller tears down the old run, polls the returned task and calls
    /// `start_game` only once it is ready.
    pub fn restart(&self) -> Option<ReloadTask> {
        if !self.is_game_over() {
            log::debug!("Restart ignored in {:?}", self.state);
            return None;
        }
        log::info!("Restart requested");
        Some(ReloadTask::new(RELOAD_TICKS))
    }

    fn set_score(&mut self, total: u64) {
        self.score.total = total;
        self.notify(SessionEvent::ScoreChanged(total));
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.notify(SessionEvent::StateChanged(state));
    }

    fn notify(&mut self, event: SessionEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        // Listeners go before the session does
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct NullAudio;

    impl AudioSink for NullAudio {
        fn play(&mut self, _name: &str) {}
        fn stop(&mut self, _name: &str) {}
    }

    fn recorder(session: &mut GameSession) -> (Subscription, Rc<RefCell<Vec<SessionEvent>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let sub = session.subscribe(move |e| sink.borrow_mut().push(*e));
        (sub, log)
    }

    #[test]
    fn test_add_score_notifies() {
        let mut session = GameSession::new();
        let (_, log) = recorder(&mut session);
        session.add_score(2);
        session.add_score(4);
        assert_eq!(session.score(), ScoreState { total: 6, multiplier: 4 });
        assert_eq!(
            *log.borrow(),
            vec![SessionEvent::ScoreChanged(2), SessionEvent::ScoreChanged(6)]
        );
    }

    #[test]
    fn test_state_changes_notify_once() {
        let mut session = GameSession::new();
        let (_, log) = recorder(&mut session);
        session.end_game();
        session.end_game();
        assert!(session.is_game_over());
        assert_eq!(
            *log.borrow(),
            vec![SessionEvent::StateChanged(SessionState::GameOver)]
        );
    }

    #[test]
    fn test_start_game_resets_score() {
        let mut session = GameSession::new();
        session.add_score(8);
        session.end_game();
        session.start_game(&mut NullAudio);
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.score(), ScoreState::default());
        assert!(!session.is_game_over());

        // Already in progress: no reset
        session.add_score(1);
        session.start_game(&mut NullAudio);
        assert_eq!(session.score().total, 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut session = GameSession::new();
        let (sub, log) = recorder(&mut session);
        session.add_score(1);
        session.unsubscribe(sub);
        session.add_score(1);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(session.listener_count(), 0);
    }

    #[test]
    fn test_double_score() {
        let mut session = GameSession::new();
        session.add_score(3);
        session.double_score();
        assert_eq!(session.score().total, 6);
    }

    #[test]
    fn test_restart_only_after_game_over() {
        let mut session = GameSession::new();
        assert!(session.restart().is_none());
        session.start_game(&mut NullAudio);
        assert!(session.restart().is_none());
        session.end_game();
        assert!(session.restart().is_some());
    }

    #[test]
    fn test_reload_task_completes_after_ticks() {
        let mut session = GameSession::new();
        session.end_game();
        let mut task = session.restart().unwrap();
        let mut pending = 0;
        while task.poll().is_pending() {
            pending += 1;
        }
        assert_eq!(pending, RELOAD_TICKS);
        assert!(task.poll().is_ready());
    }

    #[test]
    fn test_drop_releases_listeners() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut session = GameSession::new();
            let sink = log.clone();
            session.subscribe(move |e| sink.borrow_mut().push(*e));
            assert_eq!(Rc::strong_count(&log), 2);
        }
        assert_eq!(Rc::strong_count(&log), 1);
    }
}
