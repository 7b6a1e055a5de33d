//! Neon Runner entry point
//!
//! Browser builds drive the game from `requestAnimationFrame` and DOM timers.
//! Native builds run a headless autopilot on a simulated clock and print a
//! JSON summary of the run.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

    use neon_runner::consts::*;
    use neon_runner::sim::GameState;
    use neon_runner::{Game, HudView, Scheduler, Settings, Tuning};

    type SharedGame = Rc<RefCell<Game<WebScheduler>>>;

    /// DOM-timer implementation of the scheduler
    ///
    /// The callbacks live as long as the scheduler and are re-armed, never
    /// recreated, so cancelling from inside a callback is safe.
    struct WebScheduler {
        frame_id: Option<i32>,
        countdown_id: Option<i32>,
        letter_id: Option<i32>,
        on_frame: Closure<dyn FnMut(f64)>,
        on_countdown: Closure<dyn FnMut()>,
        on_letter: Closure<dyn FnMut()>,
    }

    impl WebScheduler {
        fn new(game: Weak<RefCell<Game<WebScheduler>>>) -> Self {
            let on_frame = {
                let game = game.clone();
                Closure::<dyn FnMut(f64)>::new(move |_time: f64| {
                    if let Some(game) = game.upgrade() {
                        let mut g = game.borrow_mut();
                        g.scheduler_mut().frame_id = None;
                        g.on_frame();
                        update_hud(&g.hud());
                    }
                })
            };
            let on_countdown = {
                let game = game.clone();
                Closure::<dyn FnMut()>::new(move || {
                    if let Some(game) = game.upgrade() {
                        let mut g = game.borrow_mut();
                        g.on_countdown_step();
                        update_hud(&g.hud());
                    }
                })
            };
            let on_letter = Closure::<dyn FnMut()>::new(move || {
                if let Some(game) = game.upgrade() {
                    let mut g = game.borrow_mut();
                    g.scheduler_mut().letter_id = None;
                    g.on_letter_advance();
                    update_hud(&g.hud());
                }
            });

            Self {
                frame_id: None,
                countdown_id: None,
                letter_id: None,
                on_frame,
                on_countdown,
                on_letter,
            }
        }
    }

    impl Scheduler for WebScheduler {
        fn schedule_tick(&mut self) {
            if self.frame_id.is_some() {
                return;
            }
            let Some(window) = web_sys::window() else { return };
            match window.request_animation_frame(self.on_frame.as_ref().unchecked_ref()) {
                Ok(id) => self.frame_id = Some(id),
                Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
            }
        }

        fn cancel_tick(&mut self) {
            if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
        }

        fn start_countdown(&mut self) {
            self.cancel_countdown();
            let Some(window) = web_sys::window() else { return };
            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                self.on_countdown.as_ref().unchecked_ref(),
                1000,
            ) {
                Ok(id) => self.countdown_id = Some(id),
                Err(e) => log::error!("setInterval failed: {:?}", e),
            }
        }

        fn cancel_countdown(&mut self) {
            if let (Some(id), Some(window)) = (self.countdown_id.take(), web_sys::window()) {
                window.clear_interval_with_handle(id);
            }
        }

        fn schedule_letter_advance(&mut self, delay_ms: u32) {
            self.cancel_letter_advance();
            let Some(window) = web_sys::window() else { return };
            match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                self.on_letter.as_ref().unchecked_ref(),
                delay_ms as i32,
            ) {
                Ok(id) => self.letter_id = Some(id),
                Err(e) => log::error!("setTimeout failed: {:?}", e),
            }
        }

        fn cancel_letter_advance(&mut self) {
            if let (Some(id), Some(window)) = (self.letter_id.take(), web_sys::window()) {
                window.clear_timeout_with_handle(id);
            }
        }
    }

    fn set_text(document: &web_sys::Document, id: &str, text: Option<&str>) {
        if let Some(el) = document.get_element_by_id(id) {
            match text {
                Some(text) => {
                    el.set_text_content(Some(text));
                    let _ = el.set_attribute("class", "");
                }
                None => {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    /// Push HUD text into the DOM
    fn update_hud(hud: &HudView) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(el) = document.get_element_by_id("score") {
            el.set_text_content(Some(&hud.score));
            if let Some(el) = el.dyn_ref::<HtmlElement>() {
                let _ = el.style().set_property("color", hud.score_color);
            }
        }
        set_text(&document, "message", hud.message.as_deref());
        if let Some(el) = document.get_element_by_id("message").and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
            let _ = el.style().set_property("color", hud.message_color);
        }

        let overlay = (!hud.overlay.is_empty()).then(|| hud.overlay.join("\n"));
        set_text(&document, "overlay", overlay.as_deref());

        let countdown = hud.countdown.map(|n| n.to_string());
        set_text(&document, "countdown", countdown.as_deref());
        set_text(&document, "game-over", hud.game_over.as_deref());

        if let Some(el) = document
            .get_element_by_id("game-container")
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        {
            let _ = el.style().set_property("background-color", hud.background);
        }
    }

    /// Map client coordinates into logical game space
    fn to_game_coords(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> (f32, f32) {
        let rect = canvas.get_bounding_client_rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return (0.0, 0.0);
        }
        let x = (client_x - rect.left()) * GAME_WIDTH as f64 / rect.width();
        let y = (client_y - rect.top()) * GAME_HEIGHT as f64 / rect.height();
        (x as f32, y as f32)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {}", e).into());
        }

        log::info!("Neon Runner starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document available");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element found");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game: SharedGame = Rc::new_cyclic(|weak| {
            let state = GameState::new(seed, Tuning::default(), Settings::default());
            RefCell::new(Game::from_state(state, WebScheduler::new(weak.clone())))
        });
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());

        game.borrow_mut().start();
        update_hud(&game.borrow().hud());

        log::info!("Neon Runner running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: SharedGame) {
        // Mouse
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = to_game_coords(&canvas_clone, event.client_x() as f64, event.client_y() as f64);
                let mut g = game.borrow_mut();
                g.interact(x, y);
                update_hud(&g.hud());
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let (x, y) = to_game_coords(&canvas_clone, touch.client_x() as f64, touch.client_y() as f64);
                    let mut g = game.borrow_mut();
                    g.interact(x, y);
                    update_hud(&g.hud());
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else { return };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() != "Space" {
                    return;
                }
                event.prevent_default();
                let mut g = game.borrow_mut();
                // Space picks the middle choice while the menu is open
                if g.state().pause.is_paused() {
                    g.interact(GAME_WIDTH / 2.0, GAME_HEIGHT / 2.0);
                } else {
                    g.interact(0.0, 0.0);
                }
                update_hud(&g.hud());
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use serde::Serialize;

    use neon_runner::scheduler::TimerEvent;
    use neon_runner::sim::pause::PauseState;
    use neon_runner::sim::{EntityKind, GameState};
    use neon_runner::{Error, Game, ManualScheduler, Settings, Tuning};

    /// Simulated wall time per frame
    const FRAME_MS: u64 = 16;
    /// How far ahead (in frames of travel) the autopilot looks for hazards
    const LOOKAHEAD_FRAMES: f32 = 14.0;

    #[derive(Debug, Serialize)]
    pub struct RunSummary {
        pub seed: u64,
        pub frames: u64,
        pub final_score: u64,
        pub difficulty: u32,
        pub theme: &'static str,
        pub letters: u32,
        pub bonuses: Vec<&'static str>,
        pub game_over: bool,
        pub diagnostic: Option<String>,
    }

    /// Jump when something ground-level is about to reach the player
    fn should_jump(state: &GameState) -> bool {
        let player = &state.player;
        if !player.on_ground {
            return false;
        }
        let front = player.pos.x + player.size.x;
        let reach = state.speed * LOOKAHEAD_FRAMES;
        state.entities.iter().any(|e| {
            !matches!(e.kind, EntityKind::RainCloud | EntityKind::Platform | EntityKind::MovingPlatform)
                && e.right() > player.pos.x
                && e.pos.x - front < reach
                && e.pos.y < player.bottom()
                && e.rect().bottom() > player.pos.y
        })
    }

    pub fn autopilot(seed: u64, tuning: Tuning, settings: Settings, max_frames: u64) -> Result<RunSummary, Error> {
        let mut game = Game::new(seed, tuning, settings, ManualScheduler::new())?;
        game.start();

        let mut frames = 0;
        let mut letters = 0;
        let mut bonuses = Vec::new();

        while frames < max_frames && !game.state().is_game_over {
            if game.scheduler_mut().take_frame() {
                if should_jump(game.state()) {
                    game.interact(0.0, 0.0);
                }
                game.on_frame();
                frames += 1;
            }

            match game.state().pause {
                PauseState::ShowingIcon => {
                    letters += 1;
                    game.interact(0.0, 0.0);
                }
                PauseState::ShowingChoices => {
                    let Some(area) = game.state().choice_areas.first().copied() else {
                        break;
                    };
                    let center = area.rect.pos + area.rect.size / 2.0;
                    game.interact(center.x, center.y);
                    bonuses.push(area.bonus.kind.id());
                }
                _ => {}
            }

            let events = game.scheduler_mut().advance(FRAME_MS);
            for event in events {
                match event {
                    TimerEvent::CountdownStep => game.on_countdown_step(),
                    TimerEvent::LetterAdvance => game.on_letter_advance(),
                }
            }

            if !game.is_ticking() && !game.state().pause.is_paused() && !game.state().is_game_over {
                log::warn!("Run stalled at frame {}", frames);
                break;
            }
        }

        let state = game.state();
        Ok(RunSummary {
            seed,
            frames,
            final_score: state.score.floor() as u64,
            difficulty: state.difficulty,
            theme: state.theme.name,
            letters,
            bonuses,
            game_over: state.is_game_over,
            diagnostic: state.diagnostic.clone(),
        })
    }
}

/// Read and parse the JSON file named by `var`; exits on a bad file
#[cfg(not(target_arch = "wasm32"))]
fn load_config<T>(var: &str, parse: fn(&str) -> Result<T, neon_runner::Error>) -> Option<T> {
    let path = std::env::var(var).ok()?;
    let loaded = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| parse(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(config) => {
            log::info!("Loaded {} from {}", var, path);
            Some(config)
        }
        Err(e) => {
            log::error!("Failed to load {} from {}: {}", var, path, e);
            std::process::exit(2);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_runner::{QualityPreset, Settings, Tuning};

    env_logger::init();
    log::info!("Neon Runner (native) starting headless autopilot...");

    // Usage: neon-runner [seed] [max_frames]
    // NEON_RUNNER_TUNING / NEON_RUNNER_SETTINGS may point at JSON files,
    // NEON_RUNNER_QUALITY overrides the quality preset (low, medium, high)
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    let max_frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 60 * 10);

    let tuning = load_config("NEON_RUNNER_TUNING", Tuning::from_json).unwrap_or_default();
    let mut settings = load_config("NEON_RUNNER_SETTINGS", Settings::from_json).unwrap_or_default();
    if let Ok(name) = std::env::var("NEON_RUNNER_QUALITY") {
        match QualityPreset::from_str(&name) {
            Some(preset) => settings.apply_preset(preset),
            None => log::warn!("Unknown quality preset '{}', keeping {}", name, settings.quality.as_str()),
        }
    }
    log::info!("Quality: {}, particles: {}", settings.quality.as_str(), settings.particles);

    match headless::autopilot(seed, tuning, settings, max_frames) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize summary: {}", e),
        },
        Err(e) => {
            log::error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
