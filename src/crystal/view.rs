//! Presentation-facing outputs of the engine.
//!
//! The engine never reaches into the renderer. It pushes read-only
//! snapshots and one-shot events into a [`Display`] sink; [`ViewModel`]
//! is the sink the ratatui renderer reads from.

use super::state::{CrystalState, UpgradeKind, MAX_LUCK_TIER};

/// Cost shown on an upgrade card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CostLabel {
    Cost(f64),
    Max,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpgradeCard {
    pub kind: UpgradeKind,
    pub cost: CostLabel,
    pub owned: u32,
    pub can_buy: bool,
}

/// Read-only view of the state. All amounts are floored.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub energy: f64,
    pub per_click: f64,
    pub per_second: f64,
    pub upgrades: Vec<UpgradeCard>,
}

impl Snapshot {
    pub fn from_state(state: &CrystalState) -> Self {
        let upgrades = UpgradeKind::all()
            .iter()
            .map(|kind| {
                let u = state.upgrade(*kind);
                UpgradeCard {
                    kind: *kind,
                    cost: if u.is_maxed() {
                        CostLabel::Max
                    } else {
                        CostLabel::Cost(u.cost())
                    },
                    owned: u.owned,
                    can_buy: state.can_buy(*kind),
                }
            })
            .collect();
        Self {
            energy: state.energy.floor(),
            per_click: state.stats.per_click().floor(),
            per_second: state.stats.per_second().floor(),
            upgrades,
        }
    }
}

/// One-shot feedback for a manual click.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickFeedback {
    pub amount: f64,
    pub luck_level: u32,
}

impl ClickFeedback {
    /// Visual tier: 0 = normal, 1..=4 escalating, 5 = max (shared by all higher levels).
    pub fn tier(&self) -> u32 {
        self.luck_level.min(MAX_LUCK_TIER)
    }
}

/// One-shot notice for energy earned while away.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfflineEarnings {
    pub amount: f64,
    pub elapsed_seconds: u64,
}

/// Sink receiving engine outputs.
pub trait Display {
    /// Called on every state change.
    fn snapshot(&mut self, snapshot: &Snapshot);

    fn click_feedback(&mut self, _feedback: ClickFeedback) {}

    fn purchased(&mut self, _kind: UpgradeKind) {}

    fn offline_earnings(&mut self, _earnings: OfflineEarnings) {}

    fn saved(&mut self) {}
}

/// Duration of the floating "+N" text, in ticks.
pub const CLICK_FEEDBACK_TICKS: u32 = 10;
/// Duration of the purchased-card highlight (600ms).
pub const PURCHASE_FLASH_TICKS: u32 = 6;
/// Duration of the "Saved!" label (1s).
pub const SAVED_FLASH_TICKS: u32 = 10;

/// Latest engine output plus short-lived visual timers.
pub struct ViewModel {
    pub snapshot: Snapshot,
    /// Last click and ticks left to show it.
    pub click: Option<(ClickFeedback, u32)>,
    pub purchase_flash: Option<(UpgradeKind, u32)>,
    /// Stays until the player dismisses it.
    pub offline_notice: Option<OfflineEarnings>,
    pub saved_flash: u32,
}

impl ViewModel {
    pub fn new() -> Self {
        Self {
            snapshot: Snapshot::from_state(&CrystalState::new()),
            click: None,
            purchase_flash: None,
            offline_notice: None,
            saved_flash: 0,
        }
    }

    /// Advance visual timers.
    pub fn advance(&mut self, delta_ticks: u32) {
        if let Some((_, life)) = &mut self.click {
            *life = life.saturating_sub(delta_ticks);
        }
        if matches!(self.click, Some((_, 0))) {
            self.click = None;
        }
        if let Some((_, life)) = &mut self.purchase_flash {
            *life = life.saturating_sub(delta_ticks);
        }
        if matches!(self.purchase_flash, Some((_, 0))) {
            self.purchase_flash = None;
        }
        self.saved_flash = self.saved_flash.saturating_sub(delta_ticks);
    }

    pub fn dismiss_notice(&mut self) -> bool {
        self.offline_notice.take().is_some()
    }

    pub fn is_flashing(&self, kind: UpgradeKind) -> bool {
        matches!(self.purchase_flash, Some((k, _)) if k == kind)
    }
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ViewModel {
    fn snapshot(&mut self, snapshot: &Snapshot) {
        self.snapshot = snapshot.clone();
    }

    fn click_feedback(&mut self, feedback: ClickFeedback) {
        self.click = Some((feedback, CLICK_FEEDBACK_TICKS));
    }

    fn purchased(&mut self, kind: UpgradeKind) {
        self.purchase_flash = Some((kind, PURCHASE_FLASH_TICKS));
    }

    fn offline_earnings(&mut self, earnings: OfflineEarnings) {
        self.offline_notice = Some(earnings);
    }

    fn saved(&mut self) {
        self.saved_flash = SAVED_FLASH_TICKS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crystal::state::LUCKY_CHARM_CAP;

    #[test]
    fn snapshot_floors_amounts() {
        let mut state = CrystalState::new();
        state.energy = 12.9;
        state.upgrade_mut(UpgradeKind::AutoMiner).owned = 1;
        state.upgrade_mut(UpgradeKind::AutoMiner).effect = 0.5;
        state.recompute_stats();
        let snap = Snapshot::from_state(&state);
        assert_eq!(snap.energy, 12.0);
        assert_eq!(snap.per_click, 1.0);
        assert_eq!(snap.per_second, 0.0);
    }

    #[test]
    fn snapshot_cards_follow_display_order() {
        let mut state = CrystalState::new();
        state.energy = 60.0;
        let snap = Snapshot::from_state(&state);
        let kinds: Vec<UpgradeKind> = snap.upgrades.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, UpgradeKind::all().to_vec());
        assert!(snap.upgrades[0].can_buy);
        assert!(snap.upgrades[1].can_buy);
        assert!(!snap.upgrades[2].can_buy);
        assert_eq!(snap.upgrades[2].cost, CostLabel::Cost(200.0));
    }

    #[test]
    fn capped_charm_shows_max() {
        let mut state = CrystalState::new();
        state.energy = 1e300;
        state.upgrade_mut(UpgradeKind::LuckyCharm).owned = LUCKY_CHARM_CAP;
        let snap = Snapshot::from_state(&state);
        let charm = &snap.upgrades[UpgradeKind::LuckyCharm.index()];
        assert_eq!(charm.cost, CostLabel::Max);
        assert!(!charm.can_buy);
        assert_eq!(charm.owned, LUCKY_CHARM_CAP);
    }

    #[test]
    fn tiers_collapse_at_five() {
        let fb = |luck_level| ClickFeedback { amount: 1.0, luck_level };
        assert_eq!(fb(0).tier(), 0);
        assert_eq!(fb(4).tier(), 4);
        assert_eq!(fb(5).tier(), 5);
        assert_eq!(fb(6).tier(), 5);
    }

    #[test]
    fn click_feedback_expires() {
        let mut vm = ViewModel::new();
        vm.click_feedback(ClickFeedback { amount: 5.0, luck_level: 1 });
        vm.advance(CLICK_FEEDBACK_TICKS - 1);
        assert!(vm.click.is_some());
        vm.advance(1);
        assert!(vm.click.is_none());
    }

    #[test]
    fn purchase_flash_expires() {
        let mut vm = ViewModel::new();
        vm.purchased(UpgradeKind::AutoMiner);
        assert!(vm.is_flashing(UpgradeKind::AutoMiner));
        assert!(!vm.is_flashing(UpgradeKind::PowerBoost));
        vm.advance(PURCHASE_FLASH_TICKS);
        assert!(!vm.is_flashing(UpgradeKind::AutoMiner));
    }

    #[test]
    fn saved_flash_counts_down() {
        let mut vm = ViewModel::new();
        vm.saved();
        assert_eq!(vm.saved_flash, SAVED_FLASH_TICKS);
        vm.advance(3);
        assert_eq!(vm.saved_flash, SAVED_FLASH_TICKS - 3);
        vm.advance(100);
        assert_eq!(vm.saved_flash, 0);
    }

    #[test]
    fn offline_notice_stays_until_dismissed() {
        let mut vm = ViewModel::new();
        vm.offline_earnings(OfflineEarnings { amount: 10.0, elapsed_seconds: 70 });
        vm.advance(1_000);
        assert!(vm.offline_notice.is_some());
        assert!(vm.dismiss_notice());
        assert!(!vm.dismiss_notice());
    }
}
