//! Browser-backed collaborators (localStorage, Date, Math.random).
//!
//! Native builds get in-memory / std stand-ins so the binary still links
//! and `cargo test` runs on the host.

use crate::crystal::logic::RandomSource;
use crate::time::Clock;

#[cfg(target_arch = "wasm32")]
use crate::crystal::save::{SaveStore, StoreError};

/// `window.localStorage` as a [`SaveStore`].
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            crate::console::warn("localStorage が使えません。進行状況は保存されません。");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok()?
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| StoreError("localStorage unavailable".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| StoreError(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub type LocalStorage = crate::crystal::save::MemoryStore;

/// Wall clock: `Date.now()` in the browser.
pub struct BrowserClock;

impl Clock for BrowserClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// `Math.random()` in the browser, xorshift32 elsewhere.
pub struct BrowserRandom {
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    state: u32,
}

impl BrowserRandom {
    pub fn new() -> Self {
        let seed = (BrowserClock.now_ms() as u32) | 1;
        Self { state: seed }
    }
}

impl RandomSource for BrowserRandom {
    #[cfg(target_arch = "wasm32")]
    fn next_f64(&mut self) -> f64 {
        js_sys::Math::random()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn next_f64(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x as f64 / (u32::MAX as f64 + 1.0)
    }
}

/// High-resolution frame timestamp for the scheduler.
#[cfg(target_arch = "wasm32")]
pub fn frame_now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn frame_now_ms() -> f64 {
    BrowserClock.now_ms() as f64
}

/// Run `on_hide` on `pagehide`. The flag is `PageTransitionEvent.persisted`:
/// true when the page goes into the back/forward cache and may come back.
#[cfg(target_arch = "wasm32")]
pub fn on_page_hide(on_hide: impl FnMut(bool) + 'static) {
    add_page_transition_listener("pagehide", on_hide);
}

/// Run `on_show` on `pageshow`. `persisted` is true for a bfcache restore.
#[cfg(target_arch = "wasm32")]
pub fn on_page_show(on_show: impl FnMut(bool) + 'static) {
    add_page_transition_listener("pageshow", on_show);
}

#[cfg(target_arch = "wasm32")]
fn add_page_transition_listener(event: &str, mut handler: impl FnMut(bool) + 'static) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::<dyn FnMut(web_sys::PageTransitionEvent)>::new(
        move |e: web_sys::PageTransitionEvent| handler(e.persisted()),
    );
    if let Err(e) =
        window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        crate::console::warn(&format!("{event} の登録に失敗: {e:?}"));
    }
    // ページの寿命と同じだけ生かす
    closure.forget();
}

#[cfg(not(target_arch = "wasm32"))]
pub fn on_page_hide(_on_hide: impl FnMut(bool) + 'static) {}

#[cfg(not(target_arch = "wasm32"))]
pub fn on_page_show(_on_show: impl FnMut(bool) + 'static) {}
