//! Circus Clowns entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::PI;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement, MouseEvent,
        TouchEvent,
    };

    use circus_clowns::audio::{AudioManager, SoundEffect};
    use circus_clowns::consts::*;
    use circus_clowns::sim::{BalloonColor, GameEvent, GamePhase, GameState, Tilt};
    use circus_clowns::{Game, HighScores, Settings, highscores};

    /// Browser session: simulation driver plus everything attached to the page
    struct App {
        game: Game,
        ctx: CanvasRenderingContext2d,
        canvas: HtmlCanvasElement,
        audio: AudioManager,
        settings: Settings,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Track phase for leaderboard refresh
        last_phase: GamePhase,
    }

    impl App {
        /// Convert a client-space x to playfield x
        fn to_playfield_x(&self, client_x: f32) -> f32 {
            let w = self.canvas.client_width().max(1) as f32;
            client_x * PLAYFIELD_WIDTH / w
        }

        /// Start from the title / game-over screens, launch otherwise
        fn primary_action(&mut self) {
            self.audio.resume();
            if self.game.state().is_active() {
                self.game.launch_pressed();
            } else if !self.game.can_submit_score() {
                self.game.start(js_sys::Date::now() as u64, js_sys::Date::now());
            }
        }

        /// One display refresh
        fn update(&mut self, time: f64) {
            self.game.frame(time);

            for event in self.game.drain_events() {
                self.audio.handle_event(&event);
                if let GameEvent::GameOver { score } = event {
                    log::info!("Final score {}", score);
                }
            }
            self.audio.update();

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 && time > oldest_time {
                self.fps = (60000.0 / (time - oldest_time)).round() as u32;
            }

            let phase = self.game.state().phase;
            if phase != self.last_phase {
                if phase == GamePhase::GameOver {
                    self.show_game_over();
                }
                self.last_phase = phase;
            }
        }

        /// Draw the current snapshot
        fn render(&self, time: f64) {
            let state = self.game.state();
            let ctx = &self.ctx;

            // Tent backdrop
            ctx.set_fill_style_str("#1a0f2e");
            ctx.fill_rect(0.0, 0.0, PLAYFIELD_WIDTH as f64, PLAYFIELD_HEIGHT as f64);
            ctx.set_fill_style_str("#2a1a45");
            let stripe = 50.0;
            let mut x = 0.0;
            while x < PLAYFIELD_WIDTH as f64 {
                ctx.fill_rect(x, 0.0, stripe / 2.0, PLAYFIELD_HEIGHT as f64);
                x += stripe;
            }

            draw_balloons(ctx, state);
            draw_diving_boards(ctx, state);
            draw_seesaw(ctx, state);
            for clown in &state.clowns {
                draw_clown(ctx, clown.pos.x as f64, clown.pos.y as f64);
            }

            // Floating texts, fading out
            ctx.set_font("bold 18px monospace");
            ctx.set_text_align("center");
            for text in &state.floating_texts {
                let rise = ((time - text.created_at).max(0.0) / FLOATING_TEXT_MS) * 30.0;
                ctx.set_global_alpha(text.opacity(time) as f64);
                ctx.set_fill_style_str(if text.text == "SPLAT!" { "#ff4d4d" } else { "#fff27a" });
                let _ = ctx.fill_text(&text.text, text.pos.x as f64, text.pos.y as f64 - rise);
            }
            ctx.set_global_alpha(1.0);

            if !state.is_playing() {
                ctx.set_fill_style_str("#ffffff");
                ctx.set_font("bold 28px monospace");
                let _ = ctx.fill_text(
                    "Click or press Space to start",
                    PLAYFIELD_WIDTH as f64 / 2.0,
                    PLAYFIELD_HEIGHT as f64 / 2.0,
                );
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let state = self.game.state();

            set_text(document, "#hud-score .hud-value", &state.score.to_string());
            set_text(document, "#hud-lives .hud-value", &state.lives.to_string());
            set_text(document, "#hud-jumps .hud-value", &state.bonus_jumps.to_string());
            set_text(
                document,
                "#hud-speed .hud-value",
                &format!("{:.1}", state.launch.speed()),
            );

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    set_text(document, "#hud-fps .hud-value", &self.fps.to_string());
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            if let Some(el) = document.get_element_by_id("hud-best") {
                let best = self.game.high_scores().top_score().unwrap_or(0);
                el.set_text_content(Some(&best.to_string()));
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                let class = if state.phase == GamePhase::GameOver { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }

        /// Populate the game-over panel
        fn show_game_over(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let score = self.game.state().score;
            set_text(&document, "#final-score", &score.to_string());

            let entry_class = if self.game.can_submit_score() { "" } else { "hidden" };
            if let Some(el) = document.get_element_by_id("name-entry") {
                let _ = el.set_attribute("class", entry_class);
            }
            if let Some(rank) = self.game.high_scores().potential_rank(score) {
                set_text(&document, "#potential-rank", &format!("#{}", rank));
            }
            if let Some(input) = document
                .get_element_by_id("name-input")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                input.set_value(self.settings.last_player_name.as_deref().unwrap_or(""));
            }
            render_leaderboard(&document, self.game.high_scores());
        }

        /// Save the finished match under the entered name
        fn submit_name(&mut self, name: &str) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            match self.game.submit_score(name, js_sys::Date::now()) {
                Ok(rank) => {
                    self.game.high_scores().save();
                    self.settings.remember_name(name);
                    self.settings.save();
                    if rank.is_some() {
                        self.audio.play(SoundEffect::HighScore);
                    }
                    set_text(&document, "#name-error", "");
                    if let Some(el) = document.get_element_by_id("name-entry") {
                        let _ = el.set_attribute("class", "hidden");
                    }
                    render_leaderboard(&document, self.game.high_scores());
                }
                Err(e) => {
                    log::warn!("Rejected name {:?}: {}", name, e);
                    set_text(&document, "#name-error", &e.to_string());
                }
            }
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn render_leaderboard(document: &Document, scores: &HighScores) {
        let Some(list) = document.get_element_by_id("leaderboard") else {
            return;
        };
        let mut html = String::new();
        for (rank, entry) in scores.ranked() {
            html.push_str(&format!(
                "<li><span class=\"rank\">{}</span> <span class=\"name\">{}</span> \
                 <span class=\"score\">{}</span> <span class=\"date\">{}</span></li>",
                rank,
                entry.name,
                entry.score,
                highscores::format_date(entry.timestamp)
            ));
        }
        list.set_inner_html(&html);
    }

    fn balloon_fill(color: BalloonColor) -> &'static str {
        match color {
            BalloonColor::Yellow => "#ffd23f",
            BalloonColor::Green => "#3ddc84",
            BalloonColor::Blue => "#3fa7ff",
        }
    }

    fn draw_balloons(ctx: &CanvasRenderingContext2d, state: &GameState) {
        for balloon in state.balloons.iter().filter(|b| !b.popped) {
            let (x, y) = (balloon.pos.x as f64, balloon.pos.y as f64);
            ctx.set_fill_style_str(balloon_fill(balloon.color));
            ctx.begin_path();
            let _ = ctx.arc(x, y, BALLOON_RADIUS as f64, 0.0, 2.0 * PI);
            ctx.fill();
            ctx.set_stroke_style_str("#dddddd");
            ctx.set_line_width(1.0);
            ctx.begin_path();
            ctx.move_to(x, y + BALLOON_RADIUS as f64);
            ctx.line_to(x, y + BALLOON_RADIUS as f64 + 8.0);
            ctx.stroke();
        }
    }

    fn draw_diving_boards(ctx: &CanvasRenderingContext2d, state: &GameState) {
        ctx.set_fill_style_str("#c58b4b");
        for board in &state.diving_boards {
            ctx.fill_rect(
                board.rect_left() as f64,
                board.top() as f64,
                DIVING_BOARD_WIDTH as f64,
                DIVING_BOARD_HEIGHT as f64,
            );
        }
    }

    fn draw_seesaw(ctx: &CanvasRenderingContext2d, state: &GameState) {
        let seesaw = &state.seesaw;
        let angle = match seesaw.tilt {
            Tilt::Left => -0.15,
            Tilt::Right => 0.15,
            Tilt::Center => 0.0,
        };
        let (x, y) = (seesaw.x as f64, seesaw.y as f64);

        // Fulcrum
        ctx.set_fill_style_str("#888888");
        ctx.begin_path();
        ctx.move_to(x, y);
        ctx.line_to(x - 15.0, y + 30.0);
        ctx.line_to(x + 15.0, y + 30.0);
        ctx.fill();

        ctx.save();
        let _ = ctx.translate(x, y);
        let _ = ctx.rotate(angle);
        ctx.set_fill_style_str("#e94f37");
        let half = seesaw.width as f64 / 2.0;
        ctx.fill_rect(-half, -4.0, seesaw.width as f64, 8.0);
        // Dead zone marking
        ctx.set_fill_style_str("#7a1f14");
        ctx.fill_rect(-half / 3.0, -4.0, seesaw.width as f64 / 3.0, 8.0);
        ctx.restore();
    }

    fn draw_clown(ctx: &CanvasRenderingContext2d, x: f64, y: f64) {
        let r = CLOWN_RADIUS as f64;
        ctx.set_fill_style_str("#ffe0c2");
        ctx.begin_path();
        let _ = ctx.arc(x, y, r * 0.6, 0.0, 2.0 * PI);
        ctx.fill();
        // Nose
        ctx.set_fill_style_str("#ff2d2d");
        ctx.begin_path();
        let _ = ctx.arc(x, y + 2.0, r * 0.15, 0.0, 2.0 * PI);
        ctx.fill();
        // Hat
        ctx.set_fill_style_str("#9b5de5");
        ctx.begin_path();
        ctx.move_to(x - r * 0.5, y - r * 0.4);
        ctx.line_to(x + r * 0.5, y - r * 0.4);
        ctx.line_to(x, y - r);
        ctx.fill();
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Circus Clowns starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(PLAYFIELD_WIDTH as u32);
        canvas.set_height(PLAYFIELD_HEIGHT as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let settings = Settings::load();
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App {
            game: Game::with_high_scores(seed, HighScores::load()),
            ctx,
            canvas: canvas.clone(),
            audio,
            settings,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
            last_phase: GamePhase::Idle,
        }));
        log::info!("Game initialized with seed: {}", seed);

        render_leaderboard(&document, app.borrow().game.high_scores());

        setup_input_handlers(&canvas, app.clone())?;
        setup_buttons(&document, app.clone());
        setup_auto_mute(app.clone())?;

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(app);
        log::info!("Circus Clowns running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        // Mouse move - seesaw follows the pointer
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let x = a.to_playfield_x(event.offset_x() as f32);
                a.game.pointer_moved(x);
            });
            canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse click - start or launch
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().primary_action();
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch move
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let mut a = app.borrow_mut();
                    let x = a.to_playfield_x(touch.client_x() as f32 - rect.left() as f32);
                    a.game.pointer_moved(x);
                }
            });
            canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start (start or launch)
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = a.to_playfield_x(touch.client_x() as f32 - rect.left() as f32);
                    a.game.pointer_moved(x);
                }
                a.primary_action();
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().ok_or("no window")?;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                // Leave typing in the name field alone
                let typing = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some();
                if typing {
                    return;
                }
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    " " => {
                        event.prevent_default();
                        a.primary_action();
                    }
                    "i" | "I" => {
                        let on = !a.game.idle_mode();
                        a.game.set_idle_mode(on);
                    }
                    "f" | "F" => {
                        a.settings.show_fps = !a.settings.show_fps;
                        a.settings.save();
                    }
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.audio.resume();
                let now = js_sys::Date::now();
                a.game.restart(now as u64, now);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("save-score-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let name = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.get_element_by_id("name-input"))
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();
                app.borrow_mut().submit_name(&name);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_mute(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Window blur (click outside, tab switch)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                if a.settings.mute_on_blur {
                    a.audio.set_muted(true);
                    log::info!("Muted (window blur)");
                }
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().audio.set_muted(false);
            });
            window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, _time: f64) {
        {
            let mut a = app.borrow_mut();
            // Floating texts are stamped with wall-clock time
            let now = js_sys::Date::now();
            a.update(now);
            a.render(now);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                a.update_hud(&document);
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

/// Ticks in the native demo before it gives up (about ten minutes at 60 Hz)
#[cfg(not(target_arch = "wasm32"))]
const DEMO_MAX_TICKS: u32 = 60 * 60 * 10;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use circus_clowns::Game;
    use circus_clowns::audio::SoundEffect;
    use circus_clowns::sim::GameEvent;

    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    log::info!("Circus Clowns (native) headless demo, seed {}", seed);

    let mut game = Game::new(seed);
    game.set_idle_mode(true);
    game.start(seed, 0.0);

    let mut pops = 0u32;
    let mut rows = 0u32;
    let mut splats = 0u32;
    let mut ticks = 0u32;
    while ticks < DEMO_MAX_TICKS && !game.state().is_game_over() {
        ticks += 1;
        game.frame(ticks as f64 * 1000.0 / 60.0);
        for event in game.drain_events() {
            if let Some(effect) = SoundEffect::for_event(&event) {
                log::trace!("{:?}", effect);
            }
            match event {
                GameEvent::BalloonPopped { .. } => pops += 1,
                GameEvent::RowCleared { .. } => rows += 1,
                GameEvent::Splat { .. } => splats += 1,
                _ => {}
            }
        }
    }

    let state = game.state();
    println!("Seed:            {}", seed);
    println!("Ticks:           {}", ticks);
    println!("Score:           {}", state.score);
    println!("Lives left:      {}", state.lives);
    println!("Balloons popped: {} ({} left)", pops, state.balloons_remaining());
    println!("Rows cleared:    {}", rows);
    println!("Splats:          {}", splats);
    println!("Launch speed:    {:.1}", state.launch.speed());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
