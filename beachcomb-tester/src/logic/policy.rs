use std::fmt;
use std::str::FromStr;

use beachcomb_game::constants::{
    FIELD_MIN_X, FIELD_MIN_Y, FIELD_SPAN_X, FIELD_SPAN_Y, LEVEL_ADVANCE_DELAY_MS,
};
use beachcomb_game::{DetectorTier, Equipment, GameSession, Position, ShovelTier};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Something an automated player does between two harness ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerAction {
    Dig(Position),
    SellAll,
    BuyDetector(DetectorTier),
    BuyShovel(ShovelTier),
    /// Let the given number of milliseconds pass.
    Wait(u64),
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Choose the next action for the current session.
    fn next_action(&mut self, session: &GameSession) -> PlayerAction;
}

/// Built-in player policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// Uniform random clicks with the odd pause and sale.
    Random,
    /// Reads the detector over a grid and digs at the strongest signal.
    Sweeper,
    /// Digs straight onto hidden items and shops between fields.
    Oracle,
}

impl PolicyKind {
    pub const ALL: [Self; 3] = [Self::Random, Self::Sweeper, Self::Oracle];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sweeper => "sweeper",
            Self::Oracle => "oracle",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Sweeper => Box::new(SweeperPolicy::default()),
            Self::Oracle => Box::new(OraclePolicy),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn next_action(&mut self, _session: &GameSession) -> PlayerAction {
        match self.rng.gen_range(0..20) {
            0 => PlayerAction::Wait(self.rng.gen_range(500..4_000)),
            1 => PlayerAction::SellAll,
            _ => PlayerAction::Dig(Position::new(
                FIELD_MIN_X + self.rng.gen_range(0.0..FIELD_SPAN_X),
                FIELD_MIN_Y + self.rng.gen_range(0.0..FIELD_SPAN_Y),
            )),
        }
    }
}

/// Coarse scan spacing, then a fine search around the best coarse point.
const SWEEP_STEP: f64 = 30.0;
const REFINE_STEP: f64 = 5.0;
const REFINE_SPAN: i32 = 3;

struct SweeperPolicy {
    sell_threshold: usize,
}

impl Default for SweeperPolicy {
    fn default() -> Self {
        Self { sell_threshold: 10 }
    }
}

impl SweeperPolicy {
    fn strongest_point(session: &GameSession) -> Option<(Position, f64)> {
        let mut best = None;
        let mut y = FIELD_MIN_Y;
        while y <= FIELD_MIN_Y + FIELD_SPAN_Y {
            let mut x = FIELD_MIN_X;
            while x <= FIELD_MIN_X + FIELD_SPAN_X {
                consider(session, &mut best, Position::new(x, y));
                x += SWEEP_STEP;
            }
            y += SWEEP_STEP;
        }

        let (coarse, _) = best?;
        for dy in -REFINE_SPAN..=REFINE_SPAN {
            for dx in -REFINE_SPAN..=REFINE_SPAN {
                let point = Position::new(
                    coarse.x + f64::from(dx) * REFINE_STEP,
                    coarse.y + f64::from(dy) * REFINE_STEP,
                );
                consider(session, &mut best, point);
            }
        }
        best
    }
}

fn consider(session: &GameSession, best: &mut Option<(Position, f64)>, point: Position) {
    let strength = session.point_detection_strength(point);
    if strength > 0.0 && best.is_none_or(|(_, top)| strength > top) {
        *best = Some((point, strength));
    }
}

impl PlayerPolicy for SweeperPolicy {
    fn name(&self) -> &'static str {
        "Sweeper"
    }

    fn next_action(&mut self, session: &GameSession) -> PlayerAction {
        if session.state().unsold_count() >= self.sell_threshold {
            return PlayerAction::SellAll;
        }
        match Self::strongest_point(session) {
            Some((point, _)) => PlayerAction::Dig(point),
            None => PlayerAction::Wait(LEVEL_ADVANCE_DELAY_MS),
        }
    }
}

struct OraclePolicy;

impl PlayerPolicy for OraclePolicy {
    fn name(&self) -> &'static str {
        "Oracle"
    }

    fn next_action(&mut self, session: &GameSession) -> PlayerAction {
        let state = session.state();
        if let Some(item) = state.hidden_items().next() {
            return PlayerAction::Dig(item.position);
        }
        if state.unsold_count() > 0 {
            return PlayerAction::SellAll;
        }
        if let Some(shovel) = next_tier(&ShovelTier::ALL, state.shovel)
            .filter(|tier| affordable(*tier, state.coins, state.player_level))
        {
            return PlayerAction::BuyShovel(shovel);
        }
        if let Some(detector) = next_tier(&DetectorTier::ALL, state.detector)
            .filter(|tier| affordable(*tier, state.coins, state.player_level))
        {
            return PlayerAction::BuyDetector(detector);
        }
        PlayerAction::Wait(LEVEL_ADVANCE_DELAY_MS)
    }
}

fn next_tier<T: Equipment>(tiers: &[T], current: T) -> Option<T> {
    tiers
        .iter()
        .skip_while(|tier| **tier != current)
        .nth(1)
        .copied()
}

fn affordable<T: Equipment>(tier: T, coins: u64, level: u32) -> bool {
    coins >= tier.price() && level >= tier.required_level()
}
