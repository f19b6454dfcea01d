//! The game engine: owns the state and wires it to injected collaborators.
//!
//! Every mutation goes through `click`, `purchase`, `tick`, `deserialize`
//! or `reset`; each one pushes a fresh [`Snapshot`] to the display.

use crate::console;
use crate::time::Clock;

use super::logic::{self, ClickOutcome, RandomSource};
use super::save::{self, LoadError, SaveError, SaveStore, STORAGE_KEY};
use super::state::{CrystalState, DerivedStats, UpgradeKind};
use super::view::{ClickFeedback, Display, OfflineEarnings, Snapshot};

/// Game ticks per second (100ms tick).
pub const TICKS_PER_SEC: u32 = 10;
/// オートセーブの間隔 (ms)。
pub const AUTOSAVE_INTERVAL_MS: f64 = 30_000.0;

/// Which stats the offline-earnings calculation uses on restore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OfflineStats {
    /// Stats in scope before the restored counts are recomputed. On a fresh
    /// engine these are the defaults, so nothing is earned offline. This is
    /// the long-standing behaviour of the game and is kept by default.
    #[default]
    Stale,
    /// Stats recomputed from the restored counts first.
    Restored,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub storage_key: String,
    pub offline_stats: OfflineStats,
    pub ticks_per_sec: u32,
    pub autosave_interval_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            offline_stats: OfflineStats::default(),
            ticks_per_sec: TICKS_PER_SEC,
            autosave_interval_ms: AUTOSAVE_INTERVAL_MS,
        }
    }
}

pub struct GameEngine<S, C, R, D> {
    state: CrystalState,
    store: S,
    clock: C,
    rng: R,
    display: D,
    config: EngineConfig,
}

impl<S, C, R, D> GameEngine<S, C, R, D>
where
    S: SaveStore,
    C: Clock,
    R: RandomSource,
    D: Display,
{
    /// Fresh game. Does not touch the store.
    pub fn new(store: S, clock: C, rng: R, display: D, config: EngineConfig) -> Self {
        let mut engine = Self {
            state: CrystalState::new(),
            store,
            clock,
            rng,
            display,
            config,
        };
        engine.publish();
        engine
    }

    /// Fresh game restored from the store if a save exists.
    pub fn load(store: S, clock: C, rng: R, display: D, config: EngineConfig) -> Self {
        let mut engine = Self::new(store, clock, rng, display, config);
        engine.load_saved();
        engine
    }

    pub fn state(&self) -> &CrystalState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_state(&self.state)
    }

    fn publish(&mut self) {
        let snapshot = Snapshot::from_state(&self.state);
        self.display.snapshot(&snapshot);
    }

    /// Manual click on the crystal. Saves afterwards.
    pub fn click(&mut self) -> ClickOutcome {
        let outcome = logic::click(&mut self.state, &mut self.rng);
        self.display.click_feedback(ClickFeedback {
            amount: outcome.energy_gained.floor(),
            luck_level: outcome.luck_level,
        });
        self.publish();
        self.save();
        outcome
    }

    /// Buy one unit of `kind`. Saves on success; a rejection changes nothing.
    pub fn purchase(&mut self, kind: UpgradeKind) -> bool {
        if !logic::purchase(&mut self.state, kind) {
            return false;
        }
        self.display.purchased(kind);
        self.publish();
        self.save();
        true
    }

    /// Passive accrual over `delta_seconds`.
    pub fn tick(&mut self, delta_seconds: f64) {
        if logic::tick(&mut self.state, delta_seconds) {
            self.publish();
        }
    }

    /// Run `ticks` scheduler ticks at once.
    pub fn tick_n(&mut self, ticks: u32) {
        if ticks == 0 {
            return;
        }
        let seconds = ticks as f64 / self.config.ticks_per_sec.max(1) as f64;
        self.tick(seconds);
    }

    /// JSON blob of the current state, stamped with the clock's time.
    pub fn serialize(&self) -> Result<String, SaveError> {
        save::encode(&self.state, self.clock.now_ms())
    }

    /// Restore from a blob, crediting offline earnings.
    ///
    /// Fields are merged over fresh defaults. On error the current state is
    /// left untouched.
    pub fn deserialize(
        &mut self,
        blob: &str,
        now_ms: u64,
    ) -> Result<Option<OfflineEarnings>, LoadError> {
        let data = save::decode(blob)?;

        let mut restored = CrystalState::new();
        save::apply_save(&mut restored, &data);

        // Recomputation happens only after the offline credit below.
        let stats = match self.config.offline_stats {
            OfflineStats::Stale => self.state.stats,
            OfflineStats::Restored => DerivedStats::from_upgrades(&restored.upgrades),
        };

        let mut credited = None;
        // timestamp 0 は未保存と同じ扱い
        if let Some(timestamp) = data.timestamp.filter(|&t| t > 0) {
            let elapsed = (now_ms as f64 - timestamp as f64) / 1000.0;
            let earnings = (elapsed * stats.energy_per_second * stats.total_multiplier).floor();
            if earnings > 0.0 {
                restored.energy += earnings;
                credited = Some(OfflineEarnings {
                    amount: earnings,
                    elapsed_seconds: elapsed.floor() as u64,
                });
            }
        }

        restored.recompute_stats();
        self.state = restored;

        if let Some(earnings) = credited {
            console::log(&format!(
                "offline earnings {} over {}s",
                earnings.amount, earnings.elapsed_seconds
            ));
            self.display.offline_earnings(earnings);
        }
        self.publish();
        Ok(credited)
    }

    /// Read the store and restore. Absent save → fresh game; a corrupt one is
    /// logged, discarded, and the game starts fresh.
    pub fn load_saved(&mut self) -> bool {
        let Some(json) = self.store.get(&self.config.storage_key) else {
            return false;
        };
        let now = self.clock.now_ms();
        match self.deserialize(&json, now) {
            Ok(_) => true,
            Err(e) => {
                console::warn(&format!("セーブデータのパースに失敗（破棄します）: {e}"));
                self.store.remove(&self.config.storage_key);
                self.state = CrystalState::new();
                self.publish();
                false
            }
        }
    }

    /// Write the current state. Failures are logged, never fatal.
    pub fn save(&mut self) -> bool {
        match self.try_save() {
            Ok(()) => {
                self.display.saved();
                true
            }
            Err(e) => {
                console::warn(&format!("セーブに失敗: {e}"));
                false
            }
        }
    }

    fn try_save(&mut self) -> Result<(), SaveError> {
        let json = self.serialize()?;
        self.store.set(&self.config.storage_key, &json)?;
        Ok(())
    }

    /// Clear the persisted blob and start over.
    pub fn reset(&mut self) {
        self.store.remove(&self.config.storage_key);
        self.state = CrystalState::new();
        console::log("progress reset");
        self.publish();
    }
}
