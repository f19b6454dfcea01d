//! Crystal Clicker game logic. Pure functions, fully testable.

use super::state::{CrystalState, UpgradeKind};

/// Each luck level multiplies a click by this factor.
pub const LUCK_BASE_MULTIPLIER: f64 = 5.0;

/// Uniform random source in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Result of one manual click.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickOutcome {
    pub energy_gained: f64,
    pub luck_level: u32,
}

/// Roll the luck level for a click.
///
/// `owned * effect` splits into guaranteed levels and a fractional remainder.
/// The remainder grants one extra level with exactly that probability: a
/// single draw, never repeated per level. No draw happens without a charm.
pub fn roll_luck(state: &CrystalState, rng: &mut impl RandomSource) -> u32 {
    let charm = state.upgrade(UpgradeKind::LuckyCharm);
    if charm.owned == 0 {
        return 0;
    }
    let total_chance = charm.owned as f64 * charm.effect;
    let guaranteed = total_chance.floor();
    let remainder = total_chance - guaranteed;

    // 巨大な effect でも u32 で頭打ちにする
    let level = guaranteed.max(0.0) as u32;
    if rng.next_f64() < remainder {
        level.saturating_add(1)
    } else {
        level
    }
}

/// Manual click: add click power (× multiplier, × luck) to energy.
pub fn click(state: &mut CrystalState, rng: &mut impl RandomSource) -> ClickOutcome {
    let mut gained = state.stats.per_click();
    let luck_level = roll_luck(state, rng);
    if luck_level > 0 {
        gained *= LUCK_BASE_MULTIPLIER.powf(luck_level as f64);
    }
    state.energy += gained;
    ClickOutcome {
        energy_gained: gained,
        luck_level,
    }
}

/// Try to buy one unit of an upgrade. Returns true if successful.
/// A rejected purchase leaves the state untouched.
pub fn purchase(state: &mut CrystalState, kind: UpgradeKind) -> bool {
    let upgrade = state.upgrade(kind);
    if upgrade.is_maxed() {
        return false;
    }
    let cost = upgrade.cost();
    if state.energy < cost {
        return false;
    }

    state.energy -= cost;
    state.upgrade_mut(kind).owned += 1;
    state.recompute_stats();
    true
}

/// Passive accrual over `delta_seconds`. Returns true if energy changed.
pub fn tick(state: &mut CrystalState, delta_seconds: f64) -> bool {
    if !(delta_seconds > 0.0) || !delta_seconds.is_finite() {
        return false;
    }
    if state.stats.energy_per_second <= 0.0 {
        return false;
    }
    state.energy += state.stats.per_second() * delta_seconds;
    true
}

/// Format a number floored, with commas (e.g. 1234567.8 → "1,234,567").
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "∞".to_string();
    }
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    // u64 を超える桁は指数表記に切り替える
    if n >= 1e18 {
        return format!("{:.3e}", n);
    }
    let s = (n.floor() as u64).to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Human-readable time away: "2h 5m", "3h", "12m" or "< 1m".
pub fn format_away_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    match (hours, minutes) {
        (0, 0) => "< 1m".to_string(),
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Deterministic random source for tests: replays values, then repeats the last.
#[cfg(test)]
pub struct SequenceRandom {
    values: Vec<f64>,
    pos: usize,
    pub draws: usize,
}

#[cfg(test)]
impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            pos: 0,
            draws: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        self.draws += 1;
        let v = self
            .values
            .get(self.pos)
            .or(self.values.last())
            .copied()
            .unwrap_or(0.5);
        self.pos += 1;
        v
    }
}
