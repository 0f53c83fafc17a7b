use std::collections::HashSet;

use beachcomb_game::{
    DigOutcome, GameEngine, GameSession, MemoryStorage, PurchaseOutcome, SessionState,
};
use log::{debug, warn};

use crate::logic::policy::{PlayerAction, PlayerPolicy, PolicyKind};

/// Simulated time a dig takes.
const DIG_DURATION_MS: u64 = 250;

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub policy: PolicyKind,
    pub events: usize,
    /// Save and reload through storage every this many events.
    pub checkpoint_every: Option<usize>,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(policy: PolicyKind, seed: u64) -> Self {
        Self {
            seed,
            policy,
            events: 400,
            checkpoint_every: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: usize) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn with_checkpoints(mut self, every: usize) -> Self {
        self.checkpoint_every = (every > 0).then_some(every);
        self
    }
}

/// Counters gathered over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub digs: usize,
    pub hits: usize,
    pub misses: usize,
    pub purchases: usize,
    pub declined_purchases: usize,
    pub levels_cleared: usize,
    pub checkpoints: usize,
}

/// Outcome of one (policy, seed) run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub policy: PolicyKind,
    pub seed: u64,
    pub events: usize,
    pub tally: RunTally,
    pub final_state: SessionState,
    pub failures: Vec<String>,
}

impl RunOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives a [`GameSession`] with a policy on a simulated clock, checking
/// invariants after every event.
pub struct SimulationSession {
    config: SimulationConfig,
    session: GameSession,
    engine: GameEngine<MemoryStorage>,
    policy: Box<dyn PlayerPolicy>,
    clock: u64,
    tally: RunTally,
    failures: Vec<String>,
}

impl SimulationSession {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let engine = GameEngine::new(MemoryStorage::new());
        let session = engine.new_session(config.seed);
        Self {
            config,
            session,
            engine,
            policy: config.policy.create_policy(config.seed),
            clock: 0,
            tally: RunTally::default(),
            failures: Vec::new(),
        }
    }

    /// Run every configured event and report.
    #[must_use]
    pub fn run(mut self) -> RunOutcome {
        for event in 1..=self.config.events {
            self.step(event);
            if self
                .config
                .checkpoint_every
                .is_some_and(|every| event % every == 0)
            {
                self.checkpoint(event);
            }
        }
        debug!(
            "{} seed {}: level {} after {} events",
            self.policy.name(),
            self.config.seed,
            self.session.state().player_level,
            self.config.events
        );
        RunOutcome {
            policy: self.config.policy,
            seed: self.config.seed,
            events: self.config.events,
            tally: self.tally,
            final_state: self.session.into_state(),
            failures: self.failures,
        }
    }

    /// Apply one policy action, advance timers and check invariants.
    pub fn step(&mut self, event: usize) {
        let before = self.session.state().clone();
        let action = self.policy.next_action(&self.session);
        let mut spent = 0;

        match action {
            PlayerAction::Dig(spot) => {
                self.clock += DIG_DURATION_MS;
                self.tally.digs += 1;
                match self.session.attempt_dig(spot, self.clock) {
                    DigOutcome::Hit(_) => self.tally.hits += 1,
                    DigOutcome::Miss => self.tally.misses += 1,
                }
            }
            PlayerAction::SellAll => {
                self.session.sell_all();
            }
            PlayerAction::BuyDetector(tier) => {
                let outcome = self.session.purchase_detector(tier);
                spent = self.record_purchase(outcome);
            }
            PlayerAction::BuyShovel(tier) => {
                let outcome = self.session.purchase_shovel(tier);
                spent = self.record_purchase(outcome);
            }
            PlayerAction::Wait(ms) => self.clock += ms,
        }

        if self.session.tick(self.clock).level_advanced {
            self.tally.levels_cleared += 1;
        }
        self.session.drain_events();

        for failure in check_invariants(&before, &self.session, spent) {
            warn!("event {event}: {failure}");
            self.failures.push(format!("event {event}: {failure}"));
        }
    }

    fn record_purchase(&mut self, outcome: PurchaseOutcome) -> u64 {
        match outcome {
            PurchaseOutcome::Purchased { price } => {
                self.tally.purchases += 1;
                price
            }
            PurchaseOutcome::Declined(_) => {
                self.tally.declined_purchases += 1;
                0
            }
        }
    }

    /// Save through storage, reload, and continue on the restored session.
    fn checkpoint(&mut self, event: usize) {
        if let Err(err) = self.engine.save_session(&self.session) {
            self.failures
                .push(format!("event {event}: checkpoint save failed: {err}"));
            return;
        }
        let reload_seed = self.config.seed.wrapping_add(event as u64);
        let restored = self.engine.load_session(reload_seed);

        let saved = self.session.state();
        let loaded = restored.state();
        if loaded.player_level != saved.player_level
            || loaded.coins != saved.coins
            || loaded.detector != saved.detector
            || loaded.shovel != saved.shovel
            || loaded.best_streak != saved.best_streak
        {
            self.failures
                .push(format!("event {event}: checkpoint lost progression"));
        }
        if loaded.collection != saved.collection {
            self.failures
                .push(format!("event {event}: checkpoint lost collection entries"));
        }
        self.session = restored;
        self.tally.checkpoints += 1;
    }
}

/// Check every cross-event invariant; returns a description per violation.
#[must_use]
pub fn check_invariants(before: &SessionState, session: &GameSession, spent: u64) -> Vec<String> {
    let after = session.state();
    let mut failures = Vec::new();

    if after.coins + spent < before.coins {
        failures.push(format!(
            "coins dropped from {} to {} with {spent} spent",
            before.coins, after.coins
        ));
    }
    if after.streak > after.best_streak {
        failures.push(format!(
            "streak {} exceeds best streak {}",
            after.streak, after.best_streak
        ));
    }
    if after.collection.len() < before.collection.len() {
        failures.push(format!(
            "collection shrank from {} to {}",
            before.collection.len(),
            after.collection.len()
        ));
    }
    let reverted = before
        .collection
        .iter()
        .zip(&after.collection)
        .filter(|(was, now)| was.sold && !now.sold)
        .count();
    if reverted > 0 {
        failures.push(format!("{reverted} sold items reverted to unsold"));
    }

    let mut ids = HashSet::new();
    for item in &after.current_field {
        if !ids.insert(item.id) {
            failures.push(format!("duplicate field id {}", item.id));
        }
        if !item.position.in_playable_area() {
            failures.push(format!("item {} placed outside the field", item.id));
        }
    }
    if session.xp_progress_pct() > 100.0 {
        failures.push("xp progress above 100%".to_string());
    }
    failures
}

/// Run every policy against every seed.
#[must_use]
pub fn run_matrix(
    policies: &[PolicyKind],
    seeds: &[u64],
    events: usize,
    checkpoint_every: Option<usize>,
) -> Vec<RunOutcome> {
    let mut outcomes = Vec::with_capacity(policies.len() * seeds.len());
    for policy in policies {
        for seed in seeds {
            let mut config = SimulationConfig::new(*policy, *seed).with_events(events);
            config.checkpoint_every = checkpoint_every;
            outcomes.push(SimulationSession::new(config).run());
        }
    }
    outcomes
}
