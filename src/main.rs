//! Lane Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Document, Element, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use lane_rush::ads::AdGateway;
    use lane_rush::audio::{AudioManager, SoundEffect};
    use lane_rush::catalog::{self, Season, VEHICLES};
    use lane_rush::controller::{App, Outcome, RunPhase, Screen};
    use lane_rush::profile::AdWatch;
    use lane_rush::renderer::{RenderState, build_scene};
    use lane_rush::settings::Theme;
    use lane_rush::sim::{Difficulty, Mode, Steer, TickEvent};
    use lane_rush::store;

    /// Screen container element ids, in sync with index.html
    const SCREEN_IDS: [&str; 7] = [
        "mainMenu",
        "modeSelect",
        "endlessMenu",
        "adventureSeasons",
        "adventureLevels",
        "garage",
        "gameScreen",
    ];

    /// Game shell: application state plus platform resources
    struct Shell {
        app: App,
        render_state: Option<RenderState>,
        audio: AudioManager,
        gateway: AdGateway,
        canvas: HtmlCanvasElement,
    }

    fn document() -> Document {
        web_sys::window()
            .and_then(|w| w.document())
            .expect("no document")
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    impl Shell {
        /// One display frame: tick (when running), react to events, render, HUD
        fn frame(&mut self) {
            let events = self.app.frame();
            for event in &events {
                match event {
                    TickEvent::CoinCollected => self.audio.play(SoundEffect::Coin),
                    TickEvent::Crashed => self.audio.play(SoundEffect::Crash),
                    _ => {}
                }
            }

            if let RunPhase::Ended(outcome) = self.app.phase() {
                if events
                    .iter()
                    .any(|e| matches!(e, TickEvent::Crashed | TickEvent::FinishCrossed))
                {
                    self.gateway.gameplay_stopped();
                    if matches!(outcome, Outcome::Lost { .. }) {
                        // Commercial break on defeat; the run is Ended so the
                        // tick loop stays halted while it plays out
                        let gateway = self.gateway;
                        spawn_local(async move {
                            gateway.request_interstitial().await;
                        });
                    }
                    self.show_outcome(outcome);
                }
            }

            self.render();
            self.update_hud();
        }

        fn render(&mut self) {
            if self.app.screen() != Screen::Game {
                return;
            }
            let Some(run) = self.app.run() else { return };
            let scene = build_scene(run, self.app.settings.theme, self.app.profile.selected());

            if let Some(render_state) = &mut self.render_state {
                match render_state.render(&scene) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let (w, h) = render_state.size;
                        let (cw, ch) = render_state.css_size;
                        render_state.resize(w, h, cw, ch);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {e:?}"),
                }
            }
        }

        /// Mirror game state into the DOM
        fn update_hud(&self) {
            set_text("uiHigh", &self.app.profile.high_score().to_string());
            set_text("uiCoins", &self.app.profile.coins().to_string());
            set_text("garageCoins", &self.app.profile.coins().to_string());
            if let Some(run) = self.app.run() {
                set_text("gameScore", &run.score.to_string());
                set_text("gameCoins", &run.coins_run.to_string());
            }
        }

        /// Show exactly the screen the controller says we are on
        fn sync_screens(&self) {
            let target = match self.app.screen() {
                Screen::MainMenu => "mainMenu",
                Screen::ModeSelect => "modeSelect",
                Screen::EndlessMenu => "endlessMenu",
                Screen::SeasonSelect => "adventureSeasons",
                Screen::LevelSelect(_) => "adventureLevels",
                Screen::Garage => "garage",
                Screen::Game => "gameScreen",
            };
            let document = document();
            for id in SCREEN_IDS {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.class_list().toggle_with_force("hidden", id != target);
                }
            }
        }

        fn show_popup(&self, message: &str, primary: &str, secondary: &str) {
            set_text("popupMessage", message);
            set_text("popupBtn1", primary);
            set_text("popupBtn2", secondary);
            if let Some(el) = document().get_element_by_id("pauseOverlay") {
                let _ = el.class_list().remove_1("hidden");
            }
        }

        fn hide_popup(&self) {
            if let Some(el) = document().get_element_by_id("pauseOverlay") {
                let _ = el.class_list().add_1("hidden");
            }
        }

        fn show_outcome(&self, outcome: Outcome) {
            match outcome {
                Outcome::Won { reward } => {
                    let next = match self.app.run().map(|r| r.mode) {
                        Some(Mode::Adventure { .. }) => "Next Level",
                        _ => "Main Menu",
                    };
                    self.show_popup(
                        &format!("YOU WON!\nReward: {reward} coins"),
                        next,
                        "Main Menu",
                    );
                }
                Outcome::Lost { score } => {
                    self.show_popup(&format!("YOU LOST!\nScore: {score}"), "Try Again", "Main Menu");
                }
            }
        }

        fn pause_game(&mut self) {
            if self.app.phase() == RunPhase::Running {
                self.gateway.gameplay_stopped();
                self.app.pause();
                self.show_popup("PAUSED", "Resume", "Main Menu");
            }
        }

        fn resume_game(&mut self) {
            if self.app.phase() == RunPhase::Paused {
                self.app.resume();
                self.gateway.gameplay_started();
                self.hide_popup();
            }
        }

        fn steer(&mut self, dir: Steer) {
            if self.app.steer(dir) {
                self.audio.play(SoundEffect::LaneChange);
            }
        }

        /// Size the canvas to its CSS box at the device pixel ratio and push
        /// the new geometry into the simulation and renderer.
        fn resize(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let css_w = self.canvas.client_width();
            let css_h = self.canvas.client_height();
            let width = (css_w as f64 * dpr) as u32;
            let height = (css_h as f64 * dpr) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);

            self.app.resize(css_w as f32, css_h as f32);
            if let Some(render_state) = &mut self.render_state {
                render_state.resize(width, height, css_w as f32, css_h as f32);
            }
        }

        fn apply_theme(&self) {
            let dark = self.app.settings.theme == Theme::Dark;
            if let Some(body) = document().body() {
                let _ = body.class_list().toggle_with_force("theme-dark", dark);
                let _ = body.class_list().toggle_with_force("theme-light", !dark);
            }
            set_text("btnTheme", self.app.settings.theme.as_str());
        }

        /// Rebuild the garage list. Buttons carry data attributes; a single
        /// delegated click listener on the container handles them.
        fn render_garage(&self) {
            let document = document();
            let Some(list) = document.get_element_by_id("garageList") else {
                return;
            };
            list.set_inner_html("");

            for vehicle in &VEHICLES {
                let owned = self.app.profile.is_owned(vehicle.id);
                let selected = self.app.profile.selected() == vehicle.id;
                let watched = self.app.profile.ad_watches(vehicle.id);

                let Ok(item) = document.create_element("div") else {
                    continue;
                };
                item.set_class_name("carItem");

                let body = if owned {
                    let button = if selected {
                        "<button class=\"carBtn\" disabled>SELECTED</button>".to_string()
                    } else {
                        format!(
                            "<button class=\"carBtn\" data-action=\"select\" \
                             data-vehicle=\"{}\">SELECT</button>",
                            vehicle.id
                        )
                    };
                    format!(
                        "<div class=\"carName\">{}</div>\
                         <div class=\"carPrice\">Unlocked</div>{button}",
                        vehicle.name
                    )
                } else {
                    format!(
                        "<div class=\"carName\">{name}</div>\
                         <div class=\"carPrice\">{price} coins<br>OR<br>\
                         Watch ads: {watched}/{ads}</div>\
                         <button class=\"carBtn\" data-action=\"buy\" \
                         data-vehicle=\"{id}\">Buy with Coins</button>\
                         <button class=\"carBtn\" data-action=\"ad\" \
                         data-vehicle=\"{id}\">Watch Ad</button>",
                        name = vehicle.name,
                        price = vehicle.price,
                        ads = vehicle.ads_required,
                        id = vehicle.id,
                    )
                };
                item.set_inner_html(&body);
                let _ = list.append_child(&item);
            }
        }

        /// Rebuild the level grid for the selected season
        fn render_levels(&self, season: Season) {
            let document = document();
            let Some(list) = document.get_element_by_id("levelList") else {
                return;
            };
            list.set_inner_html("");

            let unlocked = self.app.profile.unlocked_level(season);
            for level in 1..=lane_rush::consts::SEASON_LEVELS {
                let Ok(button) = document.create_element("button") else {
                    continue;
                };
                if level <= unlocked {
                    button.set_class_name("levelBtn unlocked");
                    let _ = button.set_attribute("data-level", &level.to_string());
                } else {
                    button.set_class_name("levelBtn locked");
                    let _ = button.set_attribute("disabled", "");
                }
                button.set_text_content(Some(&level.to_string()));
                let _ = list.append_child(&button);
            }
        }
    }

    /// Fresh per-run RNG seed
    fn seed_now() -> u64 {
        js_sys::Date::now() as u64
    }

    /// Start (or restart) a run behind a commercial break. The tick loop
    /// cannot advance meanwhile: the run phase is Idle/Ended until the break
    /// resolves and `start_run` flips it to Running.
    fn start_with_break(shell: &Rc<RefCell<Shell>>, mode: Mode) {
        let shell = shell.clone();
        spawn_local(async move {
            let gateway = shell.borrow().gateway;
            gateway.gameplay_stopped();
            gateway.request_interstitial().await;

            let mut s = shell.borrow_mut();
            match s.app.start_run(mode, seed_now()) {
                Ok(()) => {
                    s.gateway.gameplay_started();
                    s.audio.restart_music();
                    s.hide_popup();
                }
                Err(e) => s.show_popup(&e.to_string(), "OK", "Close"),
            }
            s.sync_screens();
            s.update_hud();
        });
    }

    enum Restart {
        Retry,
        NextLevel,
    }

    fn restart_with_break(shell: &Rc<RefCell<Shell>>, action: Restart) {
        let shell = shell.clone();
        spawn_local(async move {
            let gateway = shell.borrow().gateway;
            gateway.request_interstitial().await;

            let mut s = shell.borrow_mut();
            let result = match action {
                Restart::Retry => s.app.retry(seed_now()),
                Restart::NextLevel => s.app.next_level(seed_now()),
            };
            match result {
                Ok(()) => {
                    s.gateway.gameplay_started();
                    s.audio.restart_music();
                    s.hide_popup();
                }
                Err(e) => s.show_popup(&e.to_string(), "OK", "Close"),
            }
            s.sync_screens();
            s.update_hud();
        });
    }

    /// Wire a click handler onto an element by id
    fn on_click(id: &str, f: impl FnMut(MouseEvent) + 'static) {
        if let Some(el) = document().get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(f);
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(shell: &Rc<RefCell<Shell>>) {
        // Main menu
        {
            let shell = shell.clone();
            on_click("btnPlay", move |_| {
                let s = &mut *shell.borrow_mut();
                s.audio.unlock();
                let _ = s.app.goto(Screen::ModeSelect);
                s.sync_screens();
            });
        }
        {
            let shell = shell.clone();
            on_click("btnGarage", move |_| {
                let s = &mut *shell.borrow_mut();
                let _ = s.app.goto(Screen::Garage);
                s.render_garage();
                s.sync_screens();
                s.update_hud();
            });
        }
        {
            let shell = shell.clone();
            on_click("btnMusic", move |_| {
                let s = &mut *shell.borrow_mut();
                let music = s.app.toggle_music();
                s.audio.set_enabled(music);
                set_text("btnMusic", if music { "Music: ON" } else { "Music: OFF" });
            });
        }
        {
            let shell = shell.clone();
            on_click("btnTheme", move |_| {
                let s = &mut *shell.borrow_mut();
                s.app.toggle_theme();
                s.apply_theme();
            });
        }

        // Mode select
        {
            let shell = shell.clone();
            on_click("btnBackMode", move |_| {
                let s = &mut *shell.borrow_mut();
                let _ = s.app.goto(Screen::MainMenu);
                s.sync_screens();
            });
        }
        {
            let shell = shell.clone();
            on_click("btnEndless", move |_| {
                let s = &mut *shell.borrow_mut();
                let _ = s.app.goto(Screen::EndlessMenu);
                s.sync_screens();
            });
        }
        {
            let shell = shell.clone();
            on_click("btnAdventure", move |_| {
                let s = &mut *shell.borrow_mut();
                let _ = s.app.goto(Screen::SeasonSelect);
                s.sync_screens();
            });
        }

        // Endless difficulty
        {
            let shell = shell.clone();
            on_click("btnBackEndless", move |_| {
                let s = &mut *shell.borrow_mut();
                let _ = s.app.goto(Screen::ModeSelect);
                s.sync_screens();
            });
        }
        for (id, tier) in [
            ("btnEasy", 1u8),
            ("btnMedium", 2),
            ("btnHard", 3),
            ("btnExtreme", 4),
        ] {
            let shell = shell.clone();
            on_click(id, move |_| {
                start_with_break(
                    &shell,
                    Mode::Endless {
                        tier: Difficulty::from_tier(tier),
                    },
                );
            });
        }

        // Seasons
        {
            let shell = shell.clone();
            on_click("btnBackSeasons", move |_| {
                let s = &mut *shell.borrow_mut();
                let _ = s.app.goto(Screen::ModeSelect);
                s.sync_screens();
            });
        }
        for (id, season) in [
            ("btnSummer", Season::Summer),
            ("btnWinter", Season::Winter),
            ("btnAutumn", Season::Autumn),
            ("btnRainy", Season::Rainy),
        ] {
            let shell = shell.clone();
            on_click(id, move |_| {
                let s = &mut *shell.borrow_mut();
                match s.app.goto(Screen::LevelSelect(season)) {
                    Ok(()) => {
                        s.render_levels(season);
                        s.sync_screens();
                    }
                    Err(e) => s.show_popup(&e.to_string(), "OK", "Close"),
                }
            });
        }
        {
            let shell = shell.clone();
            on_click("btnBackLevels", move |_| {
                let s = &mut *shell.borrow_mut();
                let _ = s.app.goto(Screen::SeasonSelect);
                s.sync_screens();
            });
        }

        // Garage back
        {
            let shell = shell.clone();
            on_click("btnBackGarage", move |_| {
                let s = &mut *shell.borrow_mut();
                let _ = s.app.goto(Screen::MainMenu);
                s.sync_screens();
            });
        }

        // In-game pause button
        {
            let shell = shell.clone();
            on_click("btnPause", move |_| {
                let s = &mut *shell.borrow_mut();
                match s.app.phase() {
                    RunPhase::Running => s.pause_game(),
                    RunPhase::Paused => s.resume_game(),
                    _ => {}
                }
            });
        }
    }

    /// Level grid: one delegated listener instead of 100 closures
    fn setup_level_list(shell: &Rc<RefCell<Shell>>) {
        let Some(list) = document().get_element_by_id("levelList") else {
            return;
        };
        let shell = shell.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(level) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.get_attribute("data-level"))
                .and_then(|v| v.parse::<u32>().ok())
            else {
                return;
            };
            let Screen::LevelSelect(season) = shell.borrow().app.screen() else {
                return;
            };
            start_with_break(&shell, Mode::Adventure { season, level });
        });
        let _ = list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Garage: delegated buy/select/watch-ad handling
    fn setup_garage(shell: &Rc<RefCell<Shell>>) {
        let Some(list) = document().get_element_by_id("garageList") else {
            return;
        };
        let shell = shell.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let (Some(action), Some(id)) =
                (el.get_attribute("data-action"), el.get_attribute("data-vehicle"))
            else {
                return;
            };

            match action.as_str() {
                "select" => {
                    let s = &mut *shell.borrow_mut();
                    if let Err(e) = s.app.select_vehicle(&id) {
                        log::warn!("Select rejected: {e}");
                    }
                    s.render_garage();
                }
                "buy" => {
                    let s = &mut *shell.borrow_mut();
                    match s.app.purchase_vehicle(&id) {
                        Ok(()) => s.show_popup("Purchased!", "OK", "Close"),
                        Err(e) => s.show_popup(&e.to_string(), "OK", "Close"),
                    }
                    s.render_garage();
                    s.update_hud();
                }
                "ad" => {
                    let shell = shell.clone();
                    spawn_local(async move {
                        let gateway = shell.borrow().gateway;
                        gateway.gameplay_stopped();
                        let outcome = gateway.request_rewarded().await;
                        gateway.gameplay_started();

                        let s = &mut *shell.borrow_mut();
                        match s.app.record_ad_watch(&id, outcome.granted) {
                            AdWatch::Unlocked => {
                                let name =
                                    catalog::vehicle(&id).map(|v| v.name).unwrap_or(&id);
                                s.show_popup(&format!("{name} unlocked!"), "OK", "Close");
                            }
                            AdWatch::Ignored if !outcome.granted => {
                                s.show_popup("Ad not completed!", "OK", "Close");
                            }
                            _ => {}
                        }
                        s.render_garage();
                        s.update_hud();
                    });
                }
                _ => {}
            }
        });
        let _ = list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Popup buttons are wired once; what they do depends on the phase
    fn setup_popup_buttons(shell: &Rc<RefCell<Shell>>) {
        {
            let shell = shell.clone();
            on_click("popupBtn1", move |_| {
                let phase = shell.borrow().app.phase();
                match phase {
                    RunPhase::Paused => shell.borrow_mut().resume_game(),
                    RunPhase::Ended(Outcome::Lost { .. }) => {
                        shell.borrow().hide_popup();
                        restart_with_break(&shell, Restart::Retry);
                    }
                    RunPhase::Ended(Outcome::Won { .. }) => {
                        shell.borrow().hide_popup();
                        let is_adventure = shell
                            .borrow()
                            .app
                            .run()
                            .is_some_and(|r| r.mode.is_adventure());
                        if is_adventure {
                            restart_with_break(&shell, Restart::NextLevel);
                        } else {
                            let s = &mut *shell.borrow_mut();
                            s.app.to_menu();
                            s.sync_screens();
                            s.update_hud();
                        }
                    }
                    _ => shell.borrow().hide_popup(),
                }
            });
        }
        {
            let shell = shell.clone();
            on_click("popupBtn2", move |_| {
                let s = &mut *shell.borrow_mut();
                s.hide_popup();
                if matches!(s.app.phase(), RunPhase::Paused | RunPhase::Ended(_)) {
                    s.gateway.gameplay_stopped();
                    s.app.to_menu();
                    s.sync_screens();
                    s.update_hud();
                }
            });
        }
    }

    fn setup_input(shell: &Rc<RefCell<Shell>>) {
        let window = web_sys::window().expect("no window");

        // Keyboard steering + pause
        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut s = shell.borrow_mut();
                match key.as_str() {
                    "ArrowLeft" | "a" | "A" => s.steer(Steer::Left),
                    "ArrowRight" | "d" | "D" => s.steer(Steer::Right),
                    "Escape" => s.pause_game(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: left half steers left, right half steers right
        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut s = shell.borrow_mut();
                if let Some(touch) = event.touches().get(0) {
                    let rect = s.canvas.get_bounding_client_rect();
                    let x = touch.client_x() as f64 - rect.left();
                    if x < rect.width() / 2.0 {
                        s.steer(Steer::Left);
                    } else {
                        s.steer(Steer::Right);
                    }
                }
            });
            let canvas = shell.borrow().canvas.clone();
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize -> recompute lane geometry
        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                shell.borrow_mut().resize();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Visibility and blur map 1:1 onto the focus-lost/focus-gained signals
    fn setup_auto_pause(shell: &Rc<RefCell<Shell>>) {
        let window = web_sys::window().expect("no window");
        let document = document();

        {
            let shell = shell.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut s = shell.borrow_mut();
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    s.gateway.gameplay_stopped();
                    if s.app.phase() == RunPhase::Running {
                        log::info!("Auto-paused (tab hidden)");
                    }
                    s.pause_game();
                } else {
                    s.resume_game();
                    s.gateway.gameplay_started();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut s = shell.borrow_mut();
                if s.app.phase() == RunPhase::Running {
                    log::info!("Auto-paused (window blur)");
                }
                s.pause_game();
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(shell: Rc<RefCell<Shell>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |_time: f64| {
            game_loop(shell);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(shell: Rc<RefCell<Shell>>) {
        shell.borrow_mut().frame();
        request_animation_frame(shell);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lane Rush starting...");

        let gateway = AdGateway::init().await;
        gateway.loading_started();

        let store = store::open_store();
        let app = App::new(store);
        let audio = AudioManager::new(app.settings.music);

        let document = document();
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let window = web_sys::window().expect("no window");
        let dpr = window.device_pixel_ratio();
        let css_w = canvas.client_width();
        let css_h = canvas.client_height();
        let width = (css_w as f64 * dpr) as u32;
        let height = (css_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state =
            RenderState::new(surface, &adapter, width, height, css_w as f32, css_h as f32).await;

        let shell = Rc::new(RefCell::new(Shell {
            app,
            render_state: Some(render_state),
            audio,
            gateway,
            canvas,
        }));

        {
            let s = &mut *shell.borrow_mut();
            s.resize();
            s.apply_theme();
            set_text(
                "btnMusic",
                if s.app.settings.music {
                    "Music: ON"
                } else {
                    "Music: OFF"
                },
            );
            s.sync_screens();
            s.update_hud();
        }

        setup_menu_buttons(&shell);
        setup_level_list(&shell);
        setup_garage(&shell);
        setup_popup_buttons(&shell);
        setup_input(&shell);
        setup_auto_pause(&shell);

        // Hide the loader now that everything is wired up
        if let Some(loader) = document.get_element_by_id("loader") {
            let _ = loader.class_list().add_1("hidden");
        }
        gateway.loading_finished();

        request_animation_frame(shell);

        log::info!("Lane Rush running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lane_rush::consts::{OBSTACLE_HEIGHT, PLAYER_HEIGHT};
    use lane_rush::controller::{App, RunPhase};
    use lane_rush::sim::{Difficulty, Mode, Steer};
    use lane_rush::store::MemoryStore;

    env_logger::init();
    log::info!("Lane Rush (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    // Drive a short endless run with a naive dodge policy as a smoke test
    let mut app = App::new(Box::new(MemoryStore::new()));
    app.resize(960.0, 640.0);
    app.start_run(
        Mode::Endless {
            tier: Difficulty::Medium,
        },
        0xC0FFEE,
    )
    .expect("endless runs are never gated");

    while app.phase() == RunPhase::Running {
        let dodge = app.run().and_then(|run| {
            let player = &run.player;
            let threat = run.obstacles.iter().any(|o| {
                o.lane == player.lane
                    && o.y + OBSTACLE_HEIGHT > player.y - 180.0
                    && o.y < player.y + PLAYER_HEIGHT
            });
            match (threat, player.lane) {
                (false, _) => None,
                (true, 0) => Some(Steer::Right),
                (true, _) => Some(Steer::Left),
            }
        });
        if let Some(dir) = dodge {
            app.steer(dir);
        }
        app.frame();
        if app.run().is_some_and(|r| r.frame >= 20_000) {
            break;
        }
    }

    if let Some(run) = app.run() {
        println!(
            "Demo run over: {} frames, score {}, coins {}",
            run.frame, run.score, run.coins_run
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main; this only satisfies the compiler
}
