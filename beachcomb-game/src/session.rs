//! Session state machine: detect, dig, reward, advance, and the shop economy.
//!
//! A [`GameSession`] is mutated only by discrete calls from the host event
//! loop. Time is never read from a clock; every time-dependent operation
//! takes the caller's millisecond timestamp, so the same sequence of calls
//! always yields the same state.
use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{combo_multiplier, streak_bonus_xp, streak_pays_bonus, xp_reward};
use crate::constants::{
    COMBO_TIMEOUT_MS, GLOW_STRENGTH_THRESHOLD, LEVEL_ADVANCE_DELAY_MS, MAX_DETECTION_STRENGTH,
};
use crate::equipment::{DetectorTier, Equipment, ShovelTier};
use crate::field::{FieldGenerator, PlacedItem, Position};
use crate::maps::{MapTheme, map_for_level, xp_for_next_level};
use crate::numbers::{round_f64_to_u32, round_f64_to_u64, u64_to_f64};
use crate::rarity::RarityTier;
use crate::state::{SessionPhase, SessionState};

/// What the detector reports at a cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReading {
    /// Strongest signal in `[0, 100]`.
    pub strength: f64,
    /// `strength` rounded for display.
    pub display_strength: u32,
    pub glow: Option<DetectionGlow>,
}

/// Hint shown over the strongest item once the signal passes the glow threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionGlow {
    pub position: Position,
    pub rarity: RarityTier,
}

/// Result of a dig.
#[derive(Debug, Clone, PartialEq)]
pub enum DigOutcome {
    Hit(DigReward),
    Miss,
}

impl DigOutcome {
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Breakdown of a successful dig.
#[derive(Debug, Clone, PartialEq)]
pub struct DigReward {
    /// The collection record appended for this find.
    pub item: PlacedItem,
    pub combo: u32,
    pub combo_multiplier: f64,
    pub streak: u32,
    pub base_xp: u32,
    pub streak_bonus: u32,
    pub xp_awarded: u32,
    pub field_cleared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SellError {
    #[error("no unsold item at index {index} ({unsold} unsold)")]
    InvalidIndex { index: usize, unsold: usize },
}

/// Why the shop turned a purchase down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum DeclineReason {
    AlreadyEquipped,
    LevelTooLow { required: u32, level: u32 },
    InsufficientCoins { price: u64, coins: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased { price: u64 },
    Declined(DeclineReason),
}

impl PurchaseOutcome {
    #[must_use]
    pub const fn is_purchased(self) -> bool {
        matches!(self, Self::Purchased { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolPurchase {
    Detector(DetectorTier),
    Shovel(ShovelTier),
}

/// Signals for the presentation layer, queued in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    FieldGenerated { level: u32, items: usize },
    Dug {
        position: Position,
        item_id: u64,
        rarity: RarityTier,
        xp: u32,
    },
    Missed { position: Position },
    ComboExpired,
    FieldCleared { level: u32 },
    LevelAdvanced { level: u32 },
    Sold { count: usize, coins: u64 },
    Purchased { tool: ToolPurchase, price: u64 },
}

/// What a call to [`GameSession::tick`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub combo_expired: bool,
    pub level_advanced: bool,
}

/// One player's play session.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: SessionState,
    phase: SessionPhase,
    generator: FieldGenerator,
    events: Vec<SessionEvent>,
}

impl GameSession {
    /// Fresh level-one session. Call [`GameSession::start`] to lay the first field.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::from_state(seed, SessionState::default())
    }

    /// Resume from a restored state. Any field in `state` is discarded on start.
    #[must_use]
    pub fn from_state(seed: u64, state: SessionState) -> Self {
        let generator = FieldGenerator::resume(seed, 0, state.highest_item_id());
        Self {
            state,
            phase: SessionPhase::Idle,
            generator,
            events: Vec::new(),
        }
    }

    /// Generate the first field. Does nothing once the session has started.
    pub fn start(&mut self) {
        if self.phase != SessionPhase::Idle {
            return;
        }
        self.regenerate_field();
        self.phase = SessionPhase::Active;
    }

    fn regenerate_field(&mut self) {
        let level = self.state.player_level;
        self.state.current_field = self.generator.next_field(level, self.state.detector);
        self.events.push(SessionEvent::FieldGenerated {
            level,
            items: self.state.current_field.len(),
        });
    }

    /// Strongest detector signal at `cursor`, in `[0, 100]`.
    #[must_use]
    pub fn point_detection_strength(&self, cursor: Position) -> f64 {
        self.detection_reading(cursor).strength
    }

    #[must_use]
    pub fn detection_reading(&self, cursor: Position) -> DetectionReading {
        let mut strongest: Option<(f64, &PlacedItem)> = None;
        for item in self.state.hidden_items() {
            let radius = item.rarity.attributes().detection_radius;
            let distance = item.distance_to(cursor);
            if distance >= radius {
                continue;
            }
            let strength = MAX_DETECTION_STRENGTH * (1.0 - distance / radius);
            if strongest.is_none_or(|(best, _)| strength > best) {
                strongest = Some((strength, item));
            }
        }

        let strength = strongest.map_or(0.0, |(strength, _)| strength);
        let glow = strongest
            .filter(|(strength, _)| *strength > GLOW_STRENGTH_THRESHOLD)
            .map(|(_, item)| DetectionGlow {
                position: item.position,
                rarity: item.rarity,
            });
        DetectionReading {
            strength,
            display_strength: round_f64_to_u32(strength),
            glow,
        }
    }

    /// Dig at `click`. The closest buried item within reach is unearthed;
    /// equal distances resolve to the lower id.
    pub fn attempt_dig(&mut self, click: Position, now: u64) -> DigOutcome {
        let reach_bonus = self.state.shovel.stats().click_radius_bonus;
        let target = self
            .state
            .current_field
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.found)
            .map(|(idx, item)| (idx, item.distance_to(click), item))
            .filter(|(_, distance, item)| {
                *distance < item.rarity.attributes().click_radius + reach_bonus
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.2.id.cmp(&b.2.id)))
            .map(|(idx, _, _)| idx);

        match target {
            Some(idx) => DigOutcome::Hit(self.resolve_hit(idx, click, now)),
            None => {
                self.register_miss(click);
                DigOutcome::Miss
            }
        }
    }

    fn resolve_hit(&mut self, idx: usize, click: Position, now: u64) -> DigReward {
        let state = &mut self.state;
        state.current_field[idx].found = true;
        let mut record = state.current_field[idx].clone();

        state.combo += 1;
        state.combo_deadline = Some(now.saturating_add(COMBO_TIMEOUT_MS));
        state.streak += 1;
        state.best_streak = state.best_streak.max(state.streak);

        let multiplier = combo_multiplier(state.combo);
        let base_xp = xp_reward(record.rarity);
        let streak_bonus = if streak_pays_bonus(state.streak) {
            streak_bonus_xp(state.streak)
        } else {
            0
        };
        let xp_awarded = round_f64_to_u32(f64::from(base_xp) * multiplier) + streak_bonus;
        state.player_xp = state.player_xp.saturating_add(xp_awarded);

        record.combo_multiplier = Some(multiplier);
        state.collection.push(record.clone());

        debug!(
            "dug {} ({}) combo {} streak {} +{xp_awarded} xp",
            record.name, record.rarity, state.combo, state.streak
        );
        self.events.push(SessionEvent::Dug {
            position: click,
            item_id: record.id,
            rarity: record.rarity,
            xp: xp_awarded,
        });

        let field_cleared = self.state.hidden_count() == 0;
        if field_cleared {
            self.phase = SessionPhase::FieldCleared {
                advance_at: now.saturating_add(LEVEL_ADVANCE_DELAY_MS),
            };
            self.events.push(SessionEvent::FieldCleared {
                level: self.state.player_level,
            });
            info!("level {} field cleared", self.state.player_level);
        }

        DigReward {
            item: record,
            combo: self.state.combo,
            combo_multiplier: multiplier,
            streak: self.state.streak,
            base_xp,
            streak_bonus,
            xp_awarded,
            field_cleared,
        }
    }

    fn register_miss(&mut self, click: Position) {
        // Digging an empty or cleared field is not a miss against the streak.
        if self.state.hidden_count() > 0 {
            self.state.streak = 0;
        }
        debug!("missed at ({:.0}, {:.0})", click.x, click.y);
        self.events.push(SessionEvent::Missed { position: click });
    }

    /// Drop the combo once its deadline has passed. Returns whether it lapsed.
    pub fn tick_combo_timer(&mut self, now: u64) -> bool {
        let lapsed = self.state.combo > 0
            && self
                .state
                .combo_deadline
                .is_some_and(|deadline| now >= deadline);
        if lapsed {
            self.state.combo = 0;
            self.state.combo_deadline = None;
            self.events.push(SessionEvent::ComboExpired);
        }
        lapsed
    }

    /// Evaluate every timer at `now`: combo expiry and the pending level advance.
    pub fn tick(&mut self, now: u64) -> TickOutcome {
        let combo_expired = self.tick_combo_timer(now);
        let level_advanced = match self.phase {
            SessionPhase::FieldCleared { advance_at } if now >= advance_at => self.advance_level(),
            _ => false,
        };
        TickOutcome {
            combo_expired,
            level_advanced,
        }
    }

    /// Move a cleared field on to the next level without waiting for the delay.
    ///
    /// Returns `false` and changes nothing unless the field has been cleared.
    pub fn advance_level(&mut self) -> bool {
        if !matches!(self.phase, SessionPhase::FieldCleared { .. }) {
            return false;
        }
        self.state.player_level += 1;
        self.state.player_xp = 0;
        self.regenerate_field();
        self.phase = SessionPhase::Active;
        self.events.push(SessionEvent::LevelAdvanced {
            level: self.state.player_level,
        });
        info!(
            "advanced to level {} ({})",
            self.state.player_level,
            self.current_map().name
        );
        true
    }

    /// Coins the equipped shovel fetches for `item`.
    #[must_use]
    pub fn sale_value(&self, item: &PlacedItem) -> u64 {
        round_f64_to_u64(u64_to_f64(item.value) * self.state.shovel.stats().value_multiplier)
    }

    /// Sell the `index`-th unsold collection item.
    ///
    /// # Errors
    ///
    /// Returns [`SellError::InvalidIndex`] and leaves the session unchanged if
    /// there are not more than `index` unsold items.
    pub fn sell_item(&mut self, index: usize) -> Result<u64, SellError> {
        let position = self
            .state
            .collection
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.sold)
            .nth(index)
            .map(|(position, _)| position);
        let Some(position) = position else {
            return Err(SellError::InvalidIndex {
                index,
                unsold: self.state.unsold_count(),
            });
        };

        let credit = self.sale_value(&self.state.collection[position]);
        self.state.collection[position].sold = true;
        self.state.coins = self.state.coins.saturating_add(credit);
        debug!("sold {} for {credit}", self.state.collection[position].name);
        self.events.push(SessionEvent::Sold {
            count: 1,
            coins: credit,
        });
        Ok(credit)
    }

    /// Sell every unsold item at once. Returns the coins credited.
    pub fn sell_all(&mut self) -> u64 {
        let multiplier = self.state.shovel.stats().value_multiplier;
        let mut count = 0;
        let mut total = 0u64;
        for item in self.state.collection.iter_mut().filter(|item| !item.sold) {
            item.sold = true;
            count += 1;
            total = total.saturating_add(round_f64_to_u64(u64_to_f64(item.value) * multiplier));
        }
        if count == 0 {
            return 0;
        }
        self.state.coins = self.state.coins.saturating_add(total);
        debug!("sold {count} items for {total}");
        self.events.push(SessionEvent::Sold {
            count,
            coins: total,
        });
        total
    }

    fn check_purchase<T: Equipment>(&self, tier: T, equipped: T) -> Result<u64, DeclineReason> {
        if tier == equipped {
            return Err(DeclineReason::AlreadyEquipped);
        }
        if self.state.player_level < tier.required_level() {
            return Err(DeclineReason::LevelTooLow {
                required: tier.required_level(),
                level: self.state.player_level,
            });
        }
        if self.state.coins < tier.price() {
            return Err(DeclineReason::InsufficientCoins {
                price: tier.price(),
                coins: self.state.coins,
            });
        }
        Ok(tier.price())
    }

    /// Buy and equip a detector. An active field is regenerated for the new
    /// detector; a cleared field keeps waiting and the next level uses it.
    pub fn purchase_detector(&mut self, tier: DetectorTier) -> PurchaseOutcome {
        let price = match self.check_purchase(tier, self.state.detector) {
            Ok(price) => price,
            Err(reason) => {
                debug!("declined {}: {reason:?}", tier.name());
                return PurchaseOutcome::Declined(reason);
            }
        };
        self.state.coins -= price;
        self.state.detector = tier;
        self.events.push(SessionEvent::Purchased {
            tool: ToolPurchase::Detector(tier),
            price,
        });
        info!("bought {} for {price}", tier.name());
        if self.phase.is_active() {
            self.regenerate_field();
        }
        PurchaseOutcome::Purchased { price }
    }

    /// Buy and equip a shovel.
    pub fn purchase_shovel(&mut self, tier: ShovelTier) -> PurchaseOutcome {
        let price = match self.check_purchase(tier, self.state.shovel) {
            Ok(price) => price,
            Err(reason) => {
                debug!("declined {}: {reason:?}", tier.name());
                return PurchaseOutcome::Declined(reason);
            }
        };
        self.state.coins -= price;
        self.state.shovel = tier;
        self.events.push(SessionEvent::Purchased {
            tool: ToolPurchase::Shovel(tier),
            price,
        });
        info!("bought {} for {price}", tier.name());
        PurchaseOutcome::Purchased { price }
    }

    /// Milliseconds left before the combo lapses; 0 when no combo is running.
    #[must_use]
    pub fn combo_time_left_ms(&self, now: u64) -> u64 {
        match self.state.combo_deadline {
            Some(deadline) if self.state.combo > 0 => deadline.saturating_sub(now),
            _ => 0,
        }
    }

    #[must_use]
    pub fn current_combo_multiplier(&self) -> f64 {
        combo_multiplier(self.state.combo)
    }

    #[must_use]
    pub fn current_map(&self) -> MapTheme {
        map_for_level(self.state.player_level)
    }

    #[must_use]
    pub fn xp_for_next_level(&self) -> u32 {
        xp_for_next_level(self.state.player_level)
    }

    /// Progress bar fill, capped at 100.
    #[must_use]
    pub fn xp_progress_pct(&self) -> f64 {
        let target = f64::from(self.xp_for_next_level());
        (f64::from(self.state.player_xp) / target * 100.0).min(100.0)
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.generator.seed()
    }

    #[must_use]
    pub fn field(&self) -> &[PlacedItem] {
        &self.state.current_field
    }

    #[must_use]
    pub fn collection(&self) -> &[PlacedItem] {
        &self.state.collection
    }

    /// Apply a closure to the mutable state. Intended for tooling and tests;
    /// callers are responsible for keeping the state's invariants.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.state)
    }

    /// Consume the session, returning the underlying state.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn buried(id: u64, x: f64, y: f64, rarity: RarityTier) -> PlacedItem {
        PlacedItem {
            id,
            position: Position::new(x, y),
            name: format!("Find {id}"),
            emoji: "🪙".to_string(),
            rarity,
            value: rarity.attributes().value,
            found: false,
            sold: false,
            combo_multiplier: None,
        }
    }

    /// Started session whose field is replaced by `items`.
    fn session_with(items: Vec<PlacedItem>) -> GameSession {
        let mut session = GameSession::new(0xBEAC);
        session.start();
        session.with_state_mut(|state| state.current_field = items);
        session.drain_events();
        session
    }

    /// A row of commons 100 units apart starting at (150, 200).
    fn common_row(count: u64) -> Vec<PlacedItem> {
        (0..count)
            .map(|i| buried(i + 1, 150.0 + 100.0 * i as f64, 200.0, RarityTier::Common))
            .collect()
    }

    fn spot(item: &PlacedItem) -> Position {
        item.position
    }

    fn clear_field(session: &mut GameSession) {
        let spots: Vec<Position> = session.state().hidden_items().map(spot).collect();
        for target in spots {
            session.attempt_dig(target, 0);
        }
    }

    #[test]
    fn start_lays_the_first_map() {
        let mut session = GameSession::new(7);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.field().is_empty());
        session.start();
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.field().len(), 7);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::FieldGenerated { level: 1, items: 7 }]
        );
        session.start();
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn detection_strength_falls_off_linearly() {
        let session = session_with(vec![buried(1, 300.0, 300.0, RarityTier::Common)]);
        let on_top = session.point_detection_strength(Position::new(300.0, 300.0));
        assert!((on_top - 100.0).abs() < 1e-9);
        let halfway = session.point_detection_strength(Position::new(300.0, 345.0));
        assert!((halfway - 50.0).abs() < 1e-9);
        assert!(session.point_detection_strength(Position::new(300.0, 390.0)).abs() < 1e-9);
    }

    #[test]
    fn detection_is_a_pure_query() {
        let session = session_with(common_row(3));
        let cursor = Position::new(170.0, 210.0);
        let first = session.point_detection_strength(cursor);
        let second = session.point_detection_strength(cursor);
        assert!(first > 0.0);
        assert!((first - second).abs() < f64::EPSILON);
    }

    #[test]
    fn detection_takes_the_strongest_signal_and_ignores_found_items() {
        let mut items = vec![
            buried(1, 300.0, 300.0, RarityTier::Common),
            buried(2, 340.0, 300.0, RarityTier::Rare),
        ];
        items[0].found = true;
        let session = session_with(items);
        let reading = session.detection_reading(Position::new(330.0, 300.0));
        // Rare radius 55, distance 10.
        let expected = 100.0 * (1.0 - 10.0 / 55.0);
        assert!((reading.strength - expected).abs() < 1e-9);
        assert_eq!(reading.display_strength, 82);
        let glow = reading.glow.expect("strong signal glows");
        assert_eq!(glow.rarity, RarityTier::Rare);
    }

    #[test]
    fn weak_signal_has_no_glow() {
        let session = session_with(vec![buried(1, 300.0, 300.0, RarityTier::Common)]);
        let reading = session.detection_reading(Position::new(300.0, 360.0));
        assert!(reading.strength > 0.0);
        assert!(reading.glow.is_none());
    }

    #[test]
    fn closest_item_wins_overlapping_digs() {
        let mut session = session_with(vec![
            buried(1, 300.0, 300.0, RarityTier::Common),
            buried(2, 330.0, 300.0, RarityTier::Common),
        ]);
        let DigOutcome::Hit(reward) = session.attempt_dig(Position::new(320.0, 300.0), 0) else {
            panic!("expected a hit");
        };
        assert_eq!(reward.item.id, 2);
        assert!(!session.field()[0].found);
        assert!(session.field()[1].found);
    }

    #[test]
    fn equidistant_digs_resolve_to_lower_id() {
        let mut session = session_with(vec![
            buried(5, 330.0, 300.0, RarityTier::Common),
            buried(4, 270.0, 300.0, RarityTier::Common),
        ]);
        let DigOutcome::Hit(reward) = session.attempt_dig(Position::new(300.0, 300.0), 0) else {
            panic!("expected a hit");
        };
        assert_eq!(reward.item.id, 4);
    }

    #[test]
    fn hit_updates_combo_streak_xp_and_collection() {
        let mut session = session_with(common_row(3));
        let target = spot(&session.field()[0]);
        let DigOutcome::Hit(reward) = session.attempt_dig(target, 1_000) else {
            panic!("expected a hit");
        };
        assert_eq!(reward.xp_awarded, 10);
        assert!(!reward.field_cleared);
        let state = session.state();
        assert_eq!(state.combo, 1);
        assert_eq!(state.combo_deadline, Some(11_000));
        assert_eq!(state.streak, 1);
        assert_eq!(state.best_streak, 1);
        assert_eq!(state.player_xp, 10);
        assert_eq!(state.collection.len(), 1);
        assert_eq!(state.collection[0].combo_multiplier, Some(1.0));
        assert!(state.collection[0].found);
    }

    #[test]
    fn combo_multiplies_xp() {
        let mut session = session_with(common_row(3));
        let spots: Vec<Position> = session.field().iter().map(spot).collect();
        session.attempt_dig(spots[0], 0);
        let DigOutcome::Hit(reward) = session.attempt_dig(spots[1], 100) else {
            panic!("expected a hit");
        };
        assert_eq!(reward.combo, 2);
        assert_eq!(reward.xp_awarded, 13);
        assert_eq!(session.state().player_xp, 23);
    }

    #[test]
    fn miss_resets_streak_but_keeps_combo() {
        let mut session = session_with(common_row(4));
        let spots: Vec<Position> = session.field().iter().map(spot).collect();
        for (i, spot) in spots.iter().take(3).enumerate() {
            assert!(session.attempt_dig(*spot, i as u64).is_hit());
        }
        assert_eq!(session.state().combo, 3);
        assert_eq!(session.state().streak, 3);

        let outcome = session.attempt_dig(Position::new(150.0, 450.0), 10);
        assert_eq!(outcome, DigOutcome::Miss);
        assert_eq!(session.state().combo, 3);
        assert_eq!(session.state().streak, 0);
        assert_eq!(session.state().best_streak, 3);
    }

    #[test]
    fn fifth_consecutive_dig_pays_streak_bonus() {
        let mut session = session_with(common_row(6));
        let spots: Vec<Position> = session.field().iter().map(spot).collect();
        let mut last = None;
        for (i, spot) in spots.iter().take(5).enumerate() {
            last = Some(session.attempt_dig(*spot, i as u64 * 100));
        }
        let Some(DigOutcome::Hit(reward)) = last else {
            panic!("expected a hit");
        };
        assert_eq!(reward.streak, 5);
        assert_eq!(reward.streak_bonus, 50);
        // Combo 5 doubles the 10 base XP.
        assert_eq!(reward.xp_awarded, 20 + 50);
        assert_eq!(session.state().player_xp, 10 + 13 + 16 + 16 + 70);
    }

    #[test]
    fn combo_lapses_at_deadline() {
        let mut session = session_with(common_row(2));
        let target = spot(&session.field()[0]);
        session.attempt_dig(target, 5_000);
        assert!(!session.tick_combo_timer(14_999));
        assert_eq!(session.state().combo, 1);
        assert_eq!(session.combo_time_left_ms(14_000), 1_000);
        assert!(session.tick_combo_timer(15_000));
        assert_eq!(session.state().combo, 0);
        assert_eq!(session.state().streak, 1);
        assert_eq!(session.combo_time_left_ms(15_000), 0);
        assert!(!session.tick_combo_timer(20_000));
    }

    #[test]
    fn clearing_the_field_advances_after_the_delay() {
        let mut session = session_with(common_row(2));
        let spots: Vec<Position> = session.field().iter().map(spot).collect();
        session.attempt_dig(spots[0], 0);
        let DigOutcome::Hit(reward) = session.attempt_dig(spots[1], 500) else {
            panic!("expected a hit");
        };
        assert!(reward.field_cleared);
        assert_eq!(
            session.phase(),
            SessionPhase::FieldCleared { advance_at: 2_500 }
        );

        assert!(!session.tick(2_499).level_advanced);
        assert_eq!(session.state().player_level, 1);

        let tick = session.tick(2_500);
        assert!(tick.level_advanced);
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.state().player_level, 2);
        assert_eq!(session.state().player_xp, 0);
        assert_eq!(session.field().len(), 8);
        assert_eq!(session.collection().len(), 2);
    }

    #[test]
    fn new_fields_never_reuse_ids() {
        let mut session = GameSession::new(31);
        session.start();
        let mut seen: HashSet<u64> = session.field().iter().map(|item| item.id).collect();
        for _ in 0..4 {
            clear_field(&mut session);
            assert!(session.advance_level());
            for item in session.field() {
                assert!(seen.insert(item.id), "id {} reused", item.id);
            }
        }
    }

    #[test]
    fn advance_level_requires_a_cleared_field() {
        let mut session = session_with(common_row(2));
        assert!(!session.advance_level());
        assert_eq!(session.state().player_level, 1);
        assert_eq!(session.phase(), SessionPhase::Active);
        assert!(session.drain_events().is_empty());

        let mut idle = GameSession::new(5);
        assert!(!idle.advance_level());
        assert_eq!(idle.phase(), SessionPhase::Idle);

        clear_field(&mut session);
        assert!(session.advance_level());
        assert_eq!(session.state().player_level, 2);
        assert!(!session.tick(10_000).level_advanced);
    }

    #[test]
    fn empty_field_holds_the_level() {
        let mut session = session_with(Vec::new());
        session.with_state_mut(|state| state.streak = 3);
        assert!(session.point_detection_strength(Position::new(300.0, 300.0)).abs() < 1e-9);
        assert_eq!(
            session.attempt_dig(Position::new(300.0, 300.0), 100),
            DigOutcome::Miss
        );
        assert_eq!(session.state().streak, 3);
        assert_eq!(session.phase(), SessionPhase::Active);
        assert!(!session.tick(60_000).level_advanced);
        assert!(!session.advance_level());
        assert_eq!(session.state().player_level, 1);
    }

    #[test]
    fn digging_a_cleared_field_keeps_the_streak() {
        let mut session = session_with(common_row(1));
        let target = spot(&session.field()[0]);
        session.attempt_dig(target, 0);
        assert_eq!(session.attempt_dig(target, 10), DigOutcome::Miss);
        assert_eq!(session.state().streak, 1);
    }

    #[test]
    fn shovel_bonus_extends_reach() {
        let far_click = Position::new(300.0, 348.0);
        let mut session = session_with(vec![buried(1, 300.0, 300.0, RarityTier::Common)]);
        assert_eq!(session.attempt_dig(far_click, 0), DigOutcome::Miss);

        let mut session = session_with(vec![buried(1, 300.0, 300.0, RarityTier::Common)]);
        session.with_state_mut(|state| state.shovel = ShovelTier::Upgraded);
        assert!(session.attempt_dig(far_click, 0).is_hit());
    }

    #[test]
    fn sell_item_indexes_unsold_items_only() {
        let mut session = session_with(common_row(3));
        let spots: Vec<Position> = session.field().iter().map(spot).collect();
        for spot in &spots {
            session.attempt_dig(*spot, 0);
        }
        assert_eq!(session.sell_item(1), Ok(50));
        assert!(session.collection()[1].sold);
        // Index 1 among the unsold is now the third record.
        assert_eq!(session.sell_item(1), Ok(50));
        assert!(session.collection()[2].sold);
        assert_eq!(session.state().coins, 100);
    }

    #[test]
    fn sell_item_rejects_out_of_range_without_side_effects() {
        let mut session = session_with(common_row(2));
        let target = spot(&session.field()[0]);
        session.attempt_dig(target, 0);
        let before = session.state().clone();
        assert_eq!(
            session.sell_item(1),
            Err(SellError::InvalidIndex {
                index: 1,
                unsold: 1
            })
        );
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn split_sales_credit_each_item_once() {
        let mut session = session_with(vec![
            buried(1, 150.0, 200.0, RarityTier::Common),
            buried(2, 300.0, 200.0, RarityTier::Uncommon),
            buried(3, 450.0, 200.0, RarityTier::Rare),
            buried(4, 600.0, 200.0, RarityTier::Common),
        ]);
        session.with_state_mut(|state| state.shovel = ShovelTier::Advanced);
        let spots: Vec<Position> = session.field().iter().map(spot).collect();
        for spot in &spots {
            assert!(session.attempt_dig(*spot, 0).is_hit());
        }
        let expected: u64 = 65 + 260 + 1_300 + 65;
        let first = session.sell_item(2).unwrap();
        let rest = session.sell_all();
        assert_eq!(first, 1_300);
        assert_eq!(first + rest, expected);
        assert_eq!(session.state().coins, expected);
        assert_eq!(session.sell_all(), 0);
        assert!(session.collection().iter().all(|item| item.sold));
    }

    #[test]
    fn purchases_validate_level_and_funds() {
        let mut session = session_with(common_row(2));
        assert_eq!(
            session.purchase_shovel(ShovelTier::Upgraded),
            PurchaseOutcome::Declined(DeclineReason::LevelTooLow {
                required: 5,
                level: 1
            })
        );
        session.with_state_mut(|state| state.player_level = 5);
        assert_eq!(
            session.purchase_shovel(ShovelTier::Upgraded),
            PurchaseOutcome::Declined(DeclineReason::InsufficientCoins {
                price: 3_000,
                coins: 0
            })
        );
        assert_eq!(
            session.purchase_shovel(ShovelTier::Basic),
            PurchaseOutcome::Declined(DeclineReason::AlreadyEquipped)
        );

        session.with_state_mut(|state| state.coins = 3_500);
        let field_before = session.field().to_vec();
        assert_eq!(
            session.purchase_shovel(ShovelTier::Upgraded),
            PurchaseOutcome::Purchased { price: 3_000 }
        );
        assert_eq!(session.state().coins, 500);
        assert_eq!(session.state().shovel, ShovelTier::Upgraded);
        assert_eq!(session.field(), field_before.as_slice());
    }

    #[test]
    fn detector_purchase_regenerates_the_field() {
        let mut session = session_with(common_row(2));
        session.with_state_mut(|state| {
            state.player_level = 12;
            state.coins = 6_000;
        });
        let old_ids: HashSet<u64> = session.field().iter().map(|item| item.id).collect();
        assert!(
            session
                .purchase_detector(DetectorTier::Upgraded)
                .is_purchased()
        );
        assert_eq!(session.state().coins, 1_000);
        assert_eq!(session.field().len(), 10);
        assert!(session.field().iter().all(|item| !old_ids.contains(&item.id)));
        let events = session.drain_events();
        assert!(matches!(
            events.last(),
            Some(SessionEvent::FieldGenerated { level: 12, .. })
        ));
    }

    #[test]
    fn declined_purchase_changes_nothing() {
        let mut session = session_with(common_row(2));
        let before = session.state().clone();
        assert!(
            !session
                .purchase_detector(DetectorTier::Master)
                .is_purchased()
        );
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn progress_bar_tracks_xp() {
        let mut session = session_with(common_row(2));
        session.with_state_mut(|state| state.player_xp = 175);
        assert_eq!(session.xp_for_next_level(), 350);
        assert!((session.xp_progress_pct() - 50.0).abs() < 1e-9);
        session.with_state_mut(|state| state.player_xp = 900);
        assert!((session.xp_progress_pct() - 100.0).abs() < 1e-9);
    }
}
