//! Crystal Clicker セーブ/ロード機能。
//!
//! ## フォーマット
//!
//! localStorage の 1 キーに JSON を 1 つ保存する:
//!
//! ```json
//! {"energy": 12.5,
//!  "upgrades": {"powerBoost": {"cost": 15, "baseCost": 10, "owned": 1,
//!                              "effect": 1, "costMultiplier": 1.5}, ...},
//!  "timestamp": 1700000000000}
//! ```
//!
//! 読み込み時は各フィールドを新規状態のデフォルト値の上にマージするので、
//! フィールドが欠けた古いセーブでも有効な状態になる。`cost` は互換性のために
//! 書き出すが、`owned` から常に再計算するので読み込みでは使わない。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::{CrystalState, UpgradeKind, UpgradeState};

/// localStorage のキー。
pub const STORAGE_KEY: &str = "crystalClickerSave";

/// Key/value backend holding the save blob.
pub trait SaveStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str);
}

/// Backend failure reported by a `SaveStore`.
#[derive(Debug, thiserror::Error)]
#[error("storage backend error: {0}")]
pub struct StoreError(pub String);

/// Errors while reading a persisted blob.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("malformed save data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors while writing a blob.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to encode save data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// One upgrade as stored. Every field is optional so old saves still load.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeSave {
    pub cost: Option<f64>,
    pub base_cost: Option<f64>,
    pub owned: Option<u32>,
    pub effect: Option<f64>,
    pub cost_multiplier: Option<f64>,
}

/// Stored upgrades by wire key. Unknown keys are ignored.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpgradesSave {
    pub power_boost: Option<UpgradeSave>,
    pub auto_miner: Option<UpgradeSave>,
    pub crystal_multiplier: Option<UpgradeSave>,
    pub lucky_charm: Option<UpgradeSave>,
}

impl UpgradesSave {
    pub fn get(&self, kind: UpgradeKind) -> Option<&UpgradeSave> {
        match kind {
            UpgradeKind::PowerBoost => self.power_boost.as_ref(),
            UpgradeKind::AutoMiner => self.auto_miner.as_ref(),
            UpgradeKind::CrystalMultiplier => self.crystal_multiplier.as_ref(),
            UpgradeKind::LuckyCharm => self.lucky_charm.as_ref(),
        }
    }

    fn slot(&mut self, kind: UpgradeKind) -> &mut Option<UpgradeSave> {
        match kind {
            UpgradeKind::PowerBoost => &mut self.power_boost,
            UpgradeKind::AutoMiner => &mut self.auto_miner,
            UpgradeKind::CrystalMultiplier => &mut self.crystal_multiplier,
            UpgradeKind::LuckyCharm => &mut self.lucky_charm,
        }
    }
}

/// シリアライズ用のセーブデータ構造体。派生ステータスは含まない。
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct SaveData {
    pub energy: Option<f64>,
    pub upgrades: Option<UpgradesSave>,
    /// Epoch milliseconds at save time.
    pub timestamp: Option<u64>,
}

impl SaveData {
    /// Energy to restore: missing, null, zero, negative or non-finite → 0.
    pub fn restored_energy(&self) -> f64 {
        match self.energy {
            Some(e) if e.is_finite() && e > 0.0 => e,
            _ => 0.0,
        }
    }
}

fn upgrade_save(upgrade: &UpgradeState) -> UpgradeSave {
    UpgradeSave {
        cost: Some(upgrade.cost()),
        base_cost: Some(upgrade.base_cost),
        owned: Some(upgrade.owned),
        effect: Some(upgrade.effect),
        cost_multiplier: Some(upgrade.cost_multiplier),
    }
}

/// CrystalState からセーブ用データを抽出する。
pub fn extract_save(state: &CrystalState, timestamp: u64) -> SaveData {
    let mut upgrades = UpgradesSave::default();
    for kind in UpgradeKind::all() {
        *upgrades.slot(*kind) = Some(upgrade_save(state.upgrade(*kind)));
    }
    SaveData {
        energy: Some(state.energy),
        upgrades: Some(upgrades),
        timestamp: Some(timestamp),
    }
}

/// セーブデータの各フィールドを state の上にマージする。
/// 派生ステータスは再計算しない（呼び出し側の責任）。
pub fn apply_save(state: &mut CrystalState, save: &SaveData) {
    state.energy = save.restored_energy();

    let Some(upgrades) = &save.upgrades else {
        return;
    };
    for kind in UpgradeKind::all() {
        let Some(saved) = upgrades.get(*kind) else {
            continue;
        };
        let target = state.upgrade_mut(*kind);
        if let Some(v) = saved.base_cost {
            target.base_cost = v;
        }
        if let Some(v) = saved.owned {
            target.owned = v;
        }
        if let Some(v) = saved.effect {
            target.effect = v;
        }
        if let Some(v) = saved.cost_multiplier {
            target.cost_multiplier = v;
        }
    }
}

pub fn encode(state: &CrystalState, timestamp: u64) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&extract_save(state, timestamp))?)
}

pub fn decode(json: &str) -> Result<SaveData, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// In-memory store. Used by native builds and tests.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// When set, every `set` fails (for exercising error paths).
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError("write rejected".into()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
