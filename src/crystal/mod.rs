//! Crystal Clicker: an incremental crystal clicker game.

pub mod actions;
pub mod engine;
pub mod logic;
pub mod render;
pub mod save;
pub mod state;
pub mod view;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};
use crate::time::Clock;

use engine::GameEngine;
use logic::RandomSource;
use save::SaveStore;
use state::UpgradeKind;
use view::ViewModel;

pub struct CrystalGame<S, C, R> {
    pub engine: GameEngine<S, C, R, ViewModel>,
    /// Waiting for the player to confirm a reset.
    pub confirm_reset: bool,
}

impl<S, C, R> CrystalGame<S, C, R>
where
    S: SaveStore,
    C: Clock,
    R: RandomSource,
{
    pub fn new(engine: GameEngine<S, C, R, ViewModel>) -> Self {
        Self {
            engine,
            confirm_reset: false,
        }
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        // どの入力でもオフライン通知は閉じる
        let dismissed = self.engine.display_mut().dismiss_notice();

        if self.confirm_reset {
            return self.handle_reset_confirmation(event) || dismissed;
        }

        let consumed = match event {
            InputEvent::Key(' ') | InputEvent::Key('c') => {
                self.engine.click();
                true
            }
            InputEvent::Key('s') => {
                self.engine.save();
                true
            }
            InputEvent::Key('r') => {
                self.confirm_reset = true;
                true
            }
            InputEvent::Key(k) => match UpgradeKind::from_key(*k) {
                Some(kind) => {
                    self.engine.purchase(kind);
                    true
                }
                None => false,
            },
            InputEvent::Click(id) => self.handle_click(*id),
        };
        consumed || dismissed
    }

    fn handle_click(&mut self, id: u16) -> bool {
        match id {
            actions::CLICK_CRYSTAL => {
                self.engine.click();
                true
            }
            actions::DISMISS_NOTICE => true,
            actions::SAVE_GAME => {
                self.engine.save();
                true
            }
            actions::RESET_GAME => {
                self.confirm_reset = true;
                true
            }
            _ if id >= actions::BUY_UPGRADE_BASE => {
                match UpgradeKind::from_index((id - actions::BUY_UPGRADE_BASE) as usize) {
                    Some(kind) => {
                        self.engine.purchase(kind);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    fn handle_reset_confirmation(&mut self, event: &InputEvent) -> bool {
        let confirmed = matches!(
            event,
            InputEvent::Key('y') | InputEvent::Click(actions::CONFIRM_RESET)
        );
        if confirmed {
            self.engine.reset();
        }
        // y 以外は全てキャンセル扱い
        self.confirm_reset = false;
        true
    }

    /// Advance passive income and visual timers by `delta_ticks` ticks.
    pub fn tick(&mut self, delta_ticks: u32) {
        self.engine.tick_n(delta_ticks);
        self.engine.display_mut().advance(delta_ticks);
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self.engine.display(), self.confirm_reset, f, area, click_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crystal::engine::EngineConfig;
    use crate::crystal::logic::SequenceRandom;
    use crate::crystal::save::{MemoryStore, STORAGE_KEY};
    use crate::crystal::view::OfflineEarnings;
    use crate::time::ManualClock;

    type TestGame = CrystalGame<MemoryStore, ManualClock, SequenceRandom>;

    fn game() -> TestGame {
        CrystalGame::new(GameEngine::new(
            MemoryStore::new(),
            ManualClock::new(1_000),
            SequenceRandom::new(vec![0.5]),
            ViewModel::new(),
            EngineConfig::default(),
        ))
    }

    fn give_energy(game: &mut TestGame, energy: f64) {
        let blob = format!(r#"{{"energy": {}}}"#, energy);
        game.engine.deserialize(&blob, 1_000).unwrap();
    }

    #[test]
    fn space_and_c_click() {
        let mut g = game();
        assert!(g.handle_input(&InputEvent::Key(' ')));
        assert!(g.handle_input(&InputEvent::Key('c')));
        assert!((g.engine.state().energy - 2.0).abs() < 0.001);
        assert!(g.engine.display().click.is_some());
    }

    #[test]
    fn crystal_click_target() {
        let mut g = game();
        assert!(g.handle_input(&InputEvent::Click(actions::CLICK_CRYSTAL)));
        assert!((g.engine.state().energy - 1.0).abs() < 0.001);
    }

    #[test]
    fn number_keys_buy_upgrades() {
        let mut g = game();
        give_energy(&mut g, 60.0);
        g.handle_input(&InputEvent::Key('1'));
        g.handle_input(&InputEvent::Key('2'));
        assert_eq!(g.engine.state().upgrade(UpgradeKind::PowerBoost).owned, 1);
        assert_eq!(g.engine.state().upgrade(UpgradeKind::AutoMiner).owned, 1);
        assert!(g.engine.state().energy.abs() < 1e-9);
    }

    #[test]
    fn upgrade_click_targets_buy() {
        let mut g = game();
        give_energy(&mut g, 200.0);
        let id = actions::BUY_UPGRADE_BASE + UpgradeKind::CrystalMultiplier.index() as u16;
        assert!(g.handle_input(&InputEvent::Click(id)));
        assert_eq!(g.engine.state().upgrade(UpgradeKind::CrystalMultiplier).owned, 1);
        assert!(g.engine.display().is_flashing(UpgradeKind::CrystalMultiplier));
    }

    #[test]
    fn unknown_upgrade_target_not_consumed() {
        let mut g = game();
        assert!(!g.handle_input(&InputEvent::Click(actions::BUY_UPGRADE_BASE + 9)));
        assert!(!g.handle_input(&InputEvent::Key('z')));
    }

    #[test]
    fn save_key_writes_store() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('s'));
        assert!(g.engine.store().get(STORAGE_KEY).is_some());
        assert!(g.engine.display().saved_flash > 0);
    }

    #[test]
    fn reset_requires_confirmation() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('c'));
        g.handle_input(&InputEvent::Key('r'));
        assert!(g.confirm_reset);
        // Clicking while confirming cancels, it does not click
        g.handle_input(&InputEvent::Key('c'));
        assert!(!g.confirm_reset);
        assert!((g.engine.state().energy - 1.0).abs() < 0.001);

        g.handle_input(&InputEvent::Click(actions::RESET_GAME));
        g.handle_input(&InputEvent::Key('y'));
        assert!(!g.confirm_reset);
        assert_eq!(g.engine.state().energy, 0.0);
        assert!(g.engine.store().get(STORAGE_KEY).is_none());
    }

    #[test]
    fn reset_confirm_click_target() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('c'));
        g.handle_input(&InputEvent::Key('r'));
        g.handle_input(&InputEvent::Click(actions::CONFIRM_RESET));
        assert_eq!(g.engine.state().energy, 0.0);
    }

    #[test]
    fn reset_cancel_click_target() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('c'));
        g.handle_input(&InputEvent::Key('r'));
        g.handle_input(&InputEvent::Click(actions::CANCEL_RESET));
        assert!(!g.confirm_reset);
        assert!((g.engine.state().energy - 1.0).abs() < 0.001);
    }

    #[test]
    fn any_input_dismisses_offline_notice() {
        let mut g = game();
        g.engine.display_mut().offline_notice = Some(OfflineEarnings {
            amount: 5.0,
            elapsed_seconds: 100,
        });
        // Not otherwise handled, but still consumed as a dismissal
        assert!(g.handle_input(&InputEvent::Key('z')));
        assert!(g.engine.display().offline_notice.is_none());
    }

    #[test]
    fn tick_advances_income_and_timers() {
        let mut g = game();
        g.engine
            .deserialize(r#"{"upgrades": {"autoMiner": {"owned": 2}}}"#, 1_000)
            .unwrap();
        g.handle_input(&InputEvent::Key('c'));
        g.tick(10);
        assert!((g.engine.state().energy - 3.0).abs() < 1e-9);
        assert!(g.engine.display().click.is_none());
    }
}
