mod console;
mod crystal;
mod input;
mod platform;
mod time;

use std::{cell::RefCell, io, rc::Rc};

use crystal::engine::{EngineConfig, GameEngine};
use crystal::view::ViewModel;
use crystal::CrystalGame;
use input::{ClickState, InputEvent};
use platform::{BrowserClock, BrowserRandom, LocalStorage};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use time::Scheduler;

type Game = CrystalGame<LocalStorage, BrowserClock, BrowserRandom>;

/// Query the grid container's bounding rect and hit-test a click in page coordinates.
fn dom_hit_test(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    cs.hit_test_pixel(
        mouse_x as f64 - rect.left(),
        mouse_y as f64 - rect.top(),
        rect.width(),
        rect.height(),
    )
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let config = EngineConfig::default();
    let scheduler = Rc::new(RefCell::new(Scheduler::new(
        config.ticks_per_sec,
        config.autosave_interval_ms,
    )));
    let game: Rc<RefCell<Game>> = Rc::new(RefCell::new(CrystalGame::new(GameEngine::load(
        LocalStorage::new(),
        BrowserClock,
        BrowserRandom::new(),
        ViewModel::new(),
        config,
    ))));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // ページを離れたらタイマーを止め、bfcache から戻ったら再開する
    platform::on_page_hide({
        let scheduler = scheduler.clone();
        move |_persisted| scheduler.borrow_mut().stop()
    });
    platform::on_page_show({
        let scheduler = scheduler.clone();
        move |persisted| {
            if persisted {
                scheduler.borrow_mut().resume();
            }
        }
    });

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let action = dom_hit_test(mouse_event.x, mouse_event.y, &cs);
            drop(cs);

            if let Some(id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut()
                    .handle_input(&InputEvent::Key(c.to_ascii_lowercase()));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let triggers = scheduler.borrow_mut().update(platform::frame_now_ms());

            let mut game = game.borrow_mut();
            if triggers.ticks > 0 {
                game.tick(triggers.ticks);
            }
            if triggers.autosave {
                game.engine.save();
            }

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            game.render(f, size, &click_state);
        }
    });

    Ok(())
}
