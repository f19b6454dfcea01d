/// Crystal Clicker game state definitions.

/// Lucky Charm の所持上限。60 × 0.1 = 6 レベルが確定で付く設計上の最大値。
pub const LUCKY_CHARM_CAP: u32 = 60;

/// Visual tiers for lucky clicks. Levels at or above this share one style.
pub const MAX_LUCK_TIER: u32 = 5;

/// Kinds of upgrades. The set is fixed; every state holds all four.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    PowerBoost,
    AutoMiner,
    CrystalMultiplier,
    LuckyCharm,
}

impl UpgradeKind {
    /// All upgrade kinds in display order.
    pub fn all() -> &'static [UpgradeKind] {
        &[
            UpgradeKind::PowerBoost,
            UpgradeKind::AutoMiner,
            UpgradeKind::CrystalMultiplier,
            UpgradeKind::LuckyCharm,
        ]
    }

    /// Position in `all()` and in `CrystalState::upgrades`.
    pub fn index(&self) -> usize {
        match self {
            UpgradeKind::PowerBoost => 0,
            UpgradeKind::AutoMiner => 1,
            UpgradeKind::CrystalMultiplier => 2,
            UpgradeKind::LuckyCharm => 3,
        }
    }

    pub fn from_index(idx: usize) -> Option<UpgradeKind> {
        Self::all().get(idx).copied()
    }

    /// Key used in the persisted JSON blob.
    pub fn save_key(&self) -> &'static str {
        match self {
            UpgradeKind::PowerBoost => "powerBoost",
            UpgradeKind::AutoMiner => "autoMiner",
            UpgradeKind::CrystalMultiplier => "crystalMultiplier",
            UpgradeKind::LuckyCharm => "luckyCharm",
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            UpgradeKind::PowerBoost => "Power Boost",
            UpgradeKind::AutoMiner => "Auto Miner",
            UpgradeKind::CrystalMultiplier => "Crystal Multiplier",
            UpgradeKind::LuckyCharm => "Lucky Charm",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UpgradeKind::PowerBoost => "+1 energy per click",
            UpgradeKind::AutoMiner => "+1 energy per second",
            UpgradeKind::CrystalMultiplier => "x2 all energy gains",
            UpgradeKind::LuckyCharm => "+10% lucky click chance (x5)",
        }
    }

    /// Key to buy (1-4 mapped to upgrade index).
    pub fn key(&self) -> char {
        match self {
            UpgradeKind::PowerBoost => '1',
            UpgradeKind::AutoMiner => '2',
            UpgradeKind::CrystalMultiplier => '3',
            UpgradeKind::LuckyCharm => '4',
        }
    }

    pub fn from_key(key: char) -> Option<UpgradeKind> {
        Self::all().iter().copied().find(|k| k.key() == key)
    }

    /// Owned-count ceiling, if any.
    pub fn cap(&self) -> Option<u32> {
        match self {
            UpgradeKind::LuckyCharm => Some(LUCKY_CHARM_CAP),
            _ => None,
        }
    }
}

/// Economy of one upgrade kind.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeState {
    pub kind: UpgradeKind,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub owned: u32,
    /// Per-unit effect magnitude; meaning depends on the kind.
    pub effect: f64,
}

impl UpgradeState {
    /// Fresh, unowned upgrade with the default economy for `kind`.
    pub fn new(kind: UpgradeKind) -> Self {
        let (base_cost, cost_multiplier, effect) = match kind {
            UpgradeKind::PowerBoost => (10.0, 1.5, 1.0),
            UpgradeKind::AutoMiner => (50.0, 1.8, 1.0),
            UpgradeKind::CrystalMultiplier => (200.0, 3.0, 2.0),
            UpgradeKind::LuckyCharm => (500.0, 5.0, 0.1),
        };
        Self {
            kind,
            base_cost,
            cost_multiplier,
            owned: 0,
            effect,
        }
    }

    /// Current cost to buy the next one. Always derived from `owned`.
    pub fn cost(&self) -> f64 {
        (self.base_cost * self.cost_multiplier.powf(self.owned as f64)).ceil()
    }

    pub fn is_maxed(&self) -> bool {
        self.kind.cap().map_or(false, |cap| self.owned >= cap)
    }
}

/// Stats derived from the upgrades. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedStats {
    pub click_power: f64,
    pub energy_per_second: f64,
    pub total_multiplier: f64,
}

impl Default for DerivedStats {
    fn default() -> Self {
        Self {
            click_power: 1.0,
            energy_per_second: 0.0,
            total_multiplier: 1.0,
        }
    }
}

impl DerivedStats {
    /// Compute stats from the owned counts and effects.
    pub fn from_upgrades(upgrades: &[UpgradeState; 4]) -> Self {
        let power = &upgrades[UpgradeKind::PowerBoost.index()];
        let miner = &upgrades[UpgradeKind::AutoMiner.index()];
        let crystal = &upgrades[UpgradeKind::CrystalMultiplier.index()];
        Self {
            click_power: 1.0 + power.owned as f64 * power.effect,
            energy_per_second: miner.owned as f64 * miner.effect,
            total_multiplier: crystal.effect.powf(crystal.owned as f64),
        }
    }

    /// Energy a plain (unlucky) click yields.
    pub fn per_click(&self) -> f64 {
        self.click_power * self.total_multiplier
    }

    /// Effective passive income per second.
    pub fn per_second(&self) -> f64 {
        self.energy_per_second * self.total_multiplier
    }
}

/// Full state of a Crystal Clicker game.
#[derive(Clone, Debug, PartialEq)]
pub struct CrystalState {
    /// Current energy. Fractional because passive income accrues per tick.
    pub energy: f64,
    /// One entry per kind, indexed by `UpgradeKind::index()`.
    pub upgrades: [UpgradeState; 4],
    /// Cached result of `recompute_stats()`.
    pub stats: DerivedStats,
}

impl CrystalState {
    pub fn new() -> Self {
        Self {
            energy: 0.0,
            upgrades: [
                UpgradeState::new(UpgradeKind::PowerBoost),
                UpgradeState::new(UpgradeKind::AutoMiner),
                UpgradeState::new(UpgradeKind::CrystalMultiplier),
                UpgradeState::new(UpgradeKind::LuckyCharm),
            ],
            stats: DerivedStats::default(),
        }
    }

    pub fn upgrade(&self, kind: UpgradeKind) -> &UpgradeState {
        &self.upgrades[kind.index()]
    }

    pub fn upgrade_mut(&mut self, kind: UpgradeKind) -> &mut UpgradeState {
        &mut self.upgrades[kind.index()]
    }

    /// Refresh the cached stats. Call after any change to `owned` or `effect`.
    pub fn recompute_stats(&mut self) {
        self.stats = DerivedStats::from_upgrades(&self.upgrades);
    }

    /// Whether the next unit of `kind` can be bought right now.
    pub fn can_buy(&self, kind: UpgradeKind) -> bool {
        let upgrade = self.upgrade(kind);
        !upgrade.is_maxed() && self.energy >= upgrade.cost()
    }
}

impl Default for CrystalState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_index_matches_all_order() {
        for (i, kind) in UpgradeKind::all().iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(UpgradeKind::from_index(i), Some(*kind));
        }
        assert_eq!(UpgradeKind::from_index(4), None);
    }

    #[test]
    fn keys_roundtrip() {
        for kind in UpgradeKind::all() {
            assert_eq!(UpgradeKind::from_key(kind.key()), Some(*kind));
        }
        assert_eq!(UpgradeKind::from_key('9'), None);
    }

    #[test]
    fn initial_costs() {
        let state = CrystalState::new();
        assert_eq!(state.upgrade(UpgradeKind::PowerBoost).cost(), 10.0);
        assert_eq!(state.upgrade(UpgradeKind::AutoMiner).cost(), 50.0);
        assert_eq!(state.upgrade(UpgradeKind::CrystalMultiplier).cost(), 200.0);
        assert_eq!(state.upgrade(UpgradeKind::LuckyCharm).cost(), 500.0);
    }

    #[test]
    fn cost_rounds_up() {
        let mut u = UpgradeState::new(UpgradeKind::PowerBoost);
        u.owned = 1;
        assert_eq!(u.cost(), 15.0);
        u.owned = 2; // 10 * 2.25 = 22.5
        assert_eq!(u.cost(), 23.0);

        let mut miner = UpgradeState::new(UpgradeKind::AutoMiner);
        miner.owned = 1; // 50 * 1.8 = 90
        assert_eq!(miner.cost(), 90.0);
        miner.owned = 2; // 50 * 3.24 = 162
        assert_eq!(miner.cost(), 162.0);
    }

    #[test]
    fn fresh_stats() {
        let mut state = CrystalState::new();
        state.recompute_stats();
        assert_eq!(state.stats, DerivedStats::default());
        assert!((state.stats.per_click() - 1.0).abs() < 1e-9);
        assert!((state.stats.per_second() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn stats_follow_owned_counts() {
        let mut state = CrystalState::new();
        state.upgrade_mut(UpgradeKind::PowerBoost).owned = 3;
        state.upgrade_mut(UpgradeKind::AutoMiner).owned = 4;
        state.upgrade_mut(UpgradeKind::CrystalMultiplier).owned = 2;
        state.recompute_stats();
        assert!((state.stats.click_power - 4.0).abs() < 1e-9);
        assert!((state.stats.energy_per_second - 4.0).abs() < 1e-9);
        assert!((state.stats.total_multiplier - 4.0).abs() < 1e-9);
        assert!((state.stats.per_click() - 16.0).abs() < 1e-9);
        assert!((state.stats.per_second() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn stats_are_not_updated_until_recompute() {
        let mut state = CrystalState::new();
        state.upgrade_mut(UpgradeKind::AutoMiner).owned = 5;
        assert_eq!(state.stats.energy_per_second, 0.0);
        state.recompute_stats();
        assert_eq!(state.stats.energy_per_second, 5.0);
    }

    #[test]
    fn lucky_charm_cap() {
        let mut charm = UpgradeState::new(UpgradeKind::LuckyCharm);
        charm.owned = LUCKY_CHARM_CAP - 1;
        assert!(!charm.is_maxed());
        charm.owned = LUCKY_CHARM_CAP;
        assert!(charm.is_maxed());
        // Other kinds are never capped
        let mut boost = UpgradeState::new(UpgradeKind::PowerBoost);
        boost.owned = 10_000;
        assert!(!boost.is_maxed());
    }

    #[test]
    fn can_buy_requires_energy() {
        let mut state = CrystalState::new();
        assert!(!state.can_buy(UpgradeKind::PowerBoost));
        state.energy = 10.0;
        assert!(state.can_buy(UpgradeKind::PowerBoost));
        assert!(!state.can_buy(UpgradeKind::AutoMiner));
    }

    #[test]
    fn can_buy_false_when_maxed() {
        let mut state = CrystalState::new();
        state.energy = 1e300;
        state.upgrade_mut(UpgradeKind::LuckyCharm).owned = LUCKY_CHARM_CAP;
        assert!(!state.can_buy(UpgradeKind::LuckyCharm));
    }
}
