//! Sky Hop entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use sky_hop::renderer::SdfRenderState;
    use sky_hop::sim::{Difficulty, RunPhase, SimEvent};
    use sky_hop::{HighScores, Session, Settings};

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<SdfRenderState>,
        settings: Settings,
        highscores: HighScores,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Skip DOM writes when nothing visible changed
        last_hud: Option<(RunPhase, u32, Difficulty)>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            Self {
                session: Session::new(seed, settings.difficulty),
                render_state: None,
                settings,
                highscores: HighScores::load(),
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                last_hud: None,
            }
        }

        /// Run due simulation ticks and react to what happened
        fn update(&mut self, elapsed_ms: f64, time: f64) {
            for event in self.session.frame(elapsed_ms) {
                match event {
                    SimEvent::Started { difficulty } => {
                        log::info!("Run started on {}", difficulty.as_str());
                    }
                    SimEvent::Crashed { score, cause } => {
                        log::info!("Run over: score {} ({:?})", score, cause);
                        // Autopilot runs don't go on the board
                        if !self.session.autopilot() {
                            let difficulty = self.session.difficulty();
                            let now = js_sys::Date::now();
                            if let Some(rank) = self.highscores.add_score(score, difficulty, now) {
                                log::info!("New high score #{}: {}", rank, score);
                                self.highscores.save();
                            }
                        }
                    }
                    SimEvent::Scored { .. } | SimEvent::Impulse => {}
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let snapshot = self.session.snapshot();
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&snapshot, &self.settings, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Select a difficulty from the menu (ignored mid-run)
        fn select_difficulty(&mut self, difficulty: Difficulty) {
            if self.session.phase() == RunPhase::Running {
                return;
            }
            self.session.set_difficulty(difficulty);
            self.settings.difficulty = difficulty;
            self.settings.save();
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("hud-fps") {
                let class = if self.settings.show_fps { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.fps.to_string()));
            }

            let snapshot = self.session.snapshot();
            let key = (snapshot.phase, snapshot.score, snapshot.difficulty);
            if self.last_hud == Some(key) {
                return;
            }
            self.last_hud = Some(key);

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&snapshot.score.to_string()));
                let class = if self.settings.show_score { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            // Menu overlay whenever not running
            if let Some(el) = document.get_element_by_id("overlay") {
                let class = if snapshot.phase == RunPhase::Running { "hidden" } else { "" };
                let _ = el.set_attribute("class", class);
            }

            if let Some(el) = document.get_element_by_id("overlay-title") {
                let title = if snapshot.phase == RunPhase::Over { "Game Over!" } else { "Sky Hop" };
                el.set_text_content(Some(title));
            }

            if let Some(el) = document.get_element_by_id("overlay-subtitle") {
                let text = match snapshot.phase {
                    RunPhase::Over => format!("Final Score: {}", snapshot.score),
                    _ => "Tap or space to start your flight".to_string(),
                };
                el.set_text_content(Some(&text));
            }

            if let Some(el) = document.get_element_by_id("start-btn") {
                let label = if snapshot.phase == RunPhase::Over { "Try Again" } else { "Start Playing" };
                el.set_text_content(Some(label));
            }

            if let Some(el) = document.get_element_by_id("best-score") {
                let best = self
                    .highscores
                    .best_for(snapshot.difficulty)
                    .map(|s| format!("Best: {}", s))
                    .unwrap_or_default();
                el.set_text_content(Some(&best));
            }

            for level in Difficulty::ALL {
                let id = format!("level-{}", level.as_str().to_lowercase());
                if let Some(el) = document.get_element_by_id(&id) {
                    let class = if level == snapshot.difficulty { "level selected" } else { "level" };
                    let _ = el.set_attribute("class", class);
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Sky Hop starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match SdfRenderState::new(surface, &adapter, width, height).await {
                            Ok(mut render_state) => {
                                render_state.set_start_time(js_sys::Date::now());
                                game.borrow_mut().render_state = Some(render_state);
                            }
                            Err(e) => log::error!("Failed to create device: {}", e),
                        }
                    }
                    Err(e) => log::error!("No suitable adapter: {}", e),
                }
            }
            Err(e) => log::error!("Failed to create surface: {}", e),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_menu(game.clone());
        setup_lifecycle(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Sky Hop running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer covers mouse, pen and touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                game.borrow_mut().session.impulse();
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" | "ArrowUp" => {
                        event.prevent_default();
                        g.session.impulse();
                    }
                    "1" => g.select_difficulty(Difficulty::Easy),
                    "2" => g.select_difficulty(Difficulty::Normal),
                    "3" => g.select_difficulty(Difficulty::Hard),
                    "i" | "I" => {
                        let enabled = !g.session.autopilot();
                        g.session.set_autopilot(enabled);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                event.stop_propagation();
                game.borrow_mut().session.impulse();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for level in Difficulty::ALL {
            let id = format!("level-{}", level.as_str().to_lowercase());
            if let Some(btn) = document.get_element_by_id(&id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                    event.stop_propagation();
                    game.borrow_mut().select_difficulty(level);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    /// Mount/unmount with the page so no ticks run while it's gone
    fn setup_lifecycle(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.unmount();
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.session.mount();
                g.last_hud = None;
            });
            let _ = window.add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let elapsed_ms = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                0.0
            };
            g.last_time = time;

            g.update(elapsed_ms, time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sky Hop (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - use `trunk serve` for the playable web version");

    // Usage: sky-hop [seed] [easy|normal|hard]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = args
        .first()
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(42);
    let difficulties: Vec<sky_hop::Difficulty> = match args.get(1) {
        Some(name) => match sky_hop::Difficulty::from_str(name) {
            Some(difficulty) => vec![difficulty],
            None => {
                log::warn!("Unknown difficulty '{}', running all", name);
                sky_hop::Difficulty::ALL.to_vec()
            }
        },
        None => sky_hop::Difficulty::ALL.to_vec(),
    };

    for difficulty in difficulties {
        let (score, ticks) = demo_run(seed, difficulty);
        println!(
            "{:<6} seed {}: score {} in {} ticks",
            difficulty.as_str(),
            seed,
            score,
            ticks
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one autopilot run at 60 fps frame pacing, return (score, ticks)
#[cfg(not(target_arch = "wasm32"))]
fn demo_run(seed: u64, difficulty: sky_hop::Difficulty) -> (u32, u64) {
    use sky_hop::sim::SimEvent;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    let mut session = sky_hop::Session::new(seed, difficulty);
    session.set_autopilot(true);

    for _ in 0..MAX_FRAMES {
        for event in session.frame(FRAME_MS) {
            if let SimEvent::Crashed { score, cause } = event {
                log::info!("{} run crashed ({:?})", difficulty.as_str(), cause);
                return (score, session.snapshot().time_ticks);
            }
        }
    }

    let snapshot = session.snapshot();
    log::info!("{} run survived the demo window", difficulty.as_str());
    (snapshot.score, snapshot.time_ticks)
}
