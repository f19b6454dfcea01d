//! Semantic action IDs for Crystal Clicker click targets.
//!
//! These IDs are registered during render and dispatched via `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const CLICK_CRYSTAL: u16 = 0;
pub const DISMISS_NOTICE: u16 = 1;

// ── Save / reset ────────────────────────────────────────────────
pub const SAVE_GAME: u16 = 10;
pub const RESET_GAME: u16 = 11;
pub const CONFIRM_RESET: u16 = 12;
pub const CANCEL_RESET: u16 = 13;

// ── Upgrade purchase (base + upgrade index 0..3) ────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;
