//! Game session controller: owns the deck, the pending move, the score and
//! the scheduled tasks for one game, and drives the Idle → Running ⇄ Paused
//! → Won lifecycle.

use chrono::Local;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::time::Duration;

use crate::config::Config;
use crate::deck::{build_deck, Deck, SymbolSet};
use crate::error::DeckError;
use crate::leaderboard::{BestTimeStore, WinRecord};
use crate::moves::{self, PendingMove, Resolution, Reveal};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::score::{RatingPolicy, ScoreState};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Won,
}

/// Shown to the player when the last pair is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinSummary {
    pub elapsed_secs: u32,
    pub star_rating: u8,
    pub move_count: u32,
    /// Best time after this win was taken into account
    pub best_time: Option<u32>,
    pub new_record: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    Ignored,
    Opened,
    Matched { won: Option<WinSummary> },
    Mismatched,
}

pub struct Session {
    symbols: SymbolSet,
    rating: RatingPolicy,
    mismatch_delay: Duration,
    state: SessionState,
    deck: Deck,
    pending: PendingMove,
    score: ScoreState,
    generation: u64,
    scheduler: Scheduler,
    tick_task: Option<TaskHandle>,
    mismatch_task: Option<TaskHandle>,
    last_win: Option<WinSummary>,
    best_time: Option<u32>,
    rng: Box<dyn RngCore>,
    store: Box<dyn BestTimeStore>,
}

impl Session {
    pub fn new(config: &Config, store: Box<dyn BestTimeStore>) -> Result<Self, DeckError> {
        Self::with_rng(config, store, Box::new(StdRng::from_entropy()))
    }

    pub fn seeded(
        config: &Config,
        store: Box<dyn BestTimeStore>,
        seed: u64,
    ) -> Result<Self, DeckError> {
        Self::with_rng(config, store, Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn with_rng(
        config: &Config,
        store: Box<dyn BestTimeStore>,
        rng: Box<dyn RngCore>,
    ) -> Result<Self, DeckError> {
        let symbols = config.symbol_set()?;
        let score = ScoreState::new(config.rating.breakpoints(symbols.pairs()));
        let best_time = load_best_time(store.as_ref());

        Ok(Self {
            symbols,
            rating: config.rating,
            mismatch_delay: Duration::from_millis(config.mismatch_delay_ms),
            state: SessionState::Idle,
            deck: Deck::default(),
            pending: PendingMove::Empty,
            score,
            generation: 0,
            scheduler: Scheduler::new(),
            tick_task: None,
            mismatch_task: None,
            last_win: None,
            best_time,
            rng,
            store,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn pending(&self) -> PendingMove {
        self.pending
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn pairs(&self) -> usize {
        self.symbols.pairs()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_win(&self) -> Option<&WinSummary> {
        self.last_win.as_ref()
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_task
            .is_some_and(|handle| self.scheduler.is_scheduled(handle))
    }

    /// Best time as of the last start or win; unavailable storage reads as none.
    pub fn best_time(&self) -> Option<u32> {
        self.best_time
    }

    pub fn recent_wins(&self, limit: usize) -> Vec<WinRecord> {
        self.store.recent_wins(limit).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "win history unavailable");
            Vec::new()
        })
    }

    /// Deal a fresh deck and start the clock. Only from Idle or Won.
    pub fn start(&mut self) -> bool {
        if !matches!(self.state, SessionState::Idle | SessionState::Won) {
            tracing::debug!(state = %self.state, "start ignored");
            return false;
        }

        self.clear_tasks();
        self.generation += 1;
        self.deck = build_deck(&self.symbols, self.rng.as_mut());
        self.pending = PendingMove::Empty;
        self.score = ScoreState::new(self.rating.breakpoints(self.symbols.pairs()));
        self.last_win = None;
        self.best_time = load_best_time(self.store.as_ref());
        self.state = SessionState::Running;
        self.tick_task = Some(self.scheduler.schedule_repeating(TICK_INTERVAL, Task::Tick));

        tracing::info!(
            generation = self.generation,
            pairs = self.symbols.pairs(),
            "game started"
        );
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Running {
            tracing::debug!(state = %self.state, "pause ignored");
            return false;
        }

        if let Some(handle) = self.tick_task.take() {
            self.scheduler.cancel(handle);
        }
        // a locked pair would otherwise stay face up across the pause
        if let Some(handle) = self.mismatch_task.take() {
            self.scheduler.cancel(handle);
        }
        moves::hide_mismatch(&mut self.deck, &mut self.pending);

        self.state = SessionState::Paused;
        tracing::info!(elapsed_secs = self.score.elapsed_secs, "game paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            tracing::debug!(state = %self.state, "resume ignored");
            return false;
        }

        self.tick_task = Some(self.scheduler.schedule_repeating(TICK_INTERVAL, Task::Tick));
        self.state = SessionState::Running;
        tracing::info!(elapsed_secs = self.score.elapsed_secs, "game resumed");
        true
    }

    /// Back to Idle from any state, discarding the deck.
    pub fn reset(&mut self) {
        self.clear_tasks();
        self.generation += 1;
        self.deck = Deck::default();
        self.pending = PendingMove::Empty;
        self.score = ScoreState::new(self.rating.breakpoints(self.symbols.pairs()));
        self.last_win = None;
        self.state = SessionState::Idle;
        tracing::info!(generation = self.generation, "game reset");
    }

    pub fn restart(&mut self) -> bool {
        self.reset();
        self.start()
    }

    pub fn reveal_card(&mut self, position: usize) -> RevealOutcome {
        if self.state != SessionState::Running {
            tracing::debug!(state = %self.state, position, "reveal ignored");
            return RevealOutcome::Ignored;
        }

        match moves::reveal(&mut self.deck, &mut self.pending, position) {
            Reveal::Rejected => {
                tracing::debug!(position, pending = ?self.pending, "reveal rejected");
                RevealOutcome::Ignored
            }
            Reveal::Opened => RevealOutcome::Opened,
            Reveal::Resolved(resolution) => self.on_move_resolved(resolution),
        }
    }

    /// Move the session clock forward, firing ticks and deferred hides that fall due.
    pub fn advance(&mut self, dt: Duration) {
        let until = self.scheduler.now() + dt;
        while let Some((handle, task)) = self.scheduler.pop_due(until) {
            self.fire(handle, task);
        }
        self.scheduler.finish_advance(until);
    }

    fn fire(&mut self, handle: TaskHandle, task: Task) {
        match task {
            Task::Tick => {
                if self.state == SessionState::Running && self.tick_task == Some(handle) {
                    self.score.tick();
                }
            }
            Task::HideMismatch { generation } => {
                if self.mismatch_task == Some(handle) {
                    self.mismatch_task = None;
                }
                if generation != self.generation {
                    tracing::debug!(generation, current = self.generation, "stale hide dropped");
                    return;
                }
                moves::hide_mismatch(&mut self.deck, &mut self.pending);
            }
        }
    }

    fn on_move_resolved(&mut self, resolution: Resolution) -> RevealOutcome {
        self.score.on_move_resolved();

        match resolution {
            Resolution::Match { first, second } => {
                self.score.on_match();
                tracing::debug!(
                    first,
                    second,
                    moves = self.score.move_count,
                    matches = self.score.match_count,
                    "pair matched"
                );
                let won = (self.score.match_count as usize == self.symbols.pairs())
                    .then(|| self.finish());
                RevealOutcome::Matched { won }
            }
            Resolution::Mismatch { first, second } => {
                tracing::debug!(first, second, moves = self.score.move_count, "mismatch");
                self.mismatch_task = Some(self.scheduler.schedule_once(
                    self.mismatch_delay,
                    Task::HideMismatch {
                        generation: self.generation,
                    },
                ));
                RevealOutcome::Mismatched
            }
        }
    }

    fn finish(&mut self) -> WinSummary {
        self.state = SessionState::Won;
        self.clear_tasks();

        let elapsed = self.score.elapsed_secs;
        let previous = load_best_time(self.store.as_ref());
        let beats = previous.map_or(true, |best| elapsed < best);
        let new_record = beats
            && match self.store.set_best_time(elapsed) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "could not store best time");
                    false
                }
            };

        let record = WinRecord {
            finished_at: Local::now(),
            elapsed_secs: elapsed,
            moves: self.score.move_count,
            stars: self.score.star_rating,
            pairs: self.symbols.pairs() as u32,
        };
        if let Err(e) = self.store.record_win(&record) {
            tracing::warn!(error = %e, "could not record win");
        }

        let summary = WinSummary {
            elapsed_secs: elapsed,
            star_rating: self.score.star_rating,
            move_count: self.score.move_count,
            best_time: if new_record { Some(elapsed) } else { previous },
            new_record,
        };
        tracing::info!(
            elapsed_secs = summary.elapsed_secs,
            stars = summary.star_rating,
            moves = summary.move_count,
            new_record,
            "game won"
        );
        self.best_time = summary.best_time;
        self.last_win = Some(summary.clone());
        summary
    }

    fn clear_tasks(&mut self) {
        self.scheduler.cancel_all();
        self.tick_task = None;
        self.mismatch_task = None;
    }
}

fn load_best_time(store: &dyn BestTimeStore) -> Option<u32> {
    store.best_time().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "best time unavailable");
        None
    })
}
