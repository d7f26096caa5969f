//! Star Blazers entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use starblazers::menu::ListingRequest;
    use starblazers::net::web::{SocketHandlers, WebTransport};
    use starblazers::renderer::RenderState;
    use starblazers::{Game, GameState, Settings};

    /// Game plus the browser-side state that drives it
    struct Client {
        game: Game<WebTransport>,
        render_state: Option<RenderState>,
    }

    type Shared = Rc<RefCell<Client>>;

    impl Client {
        /// Render the current frame
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            match render_state.render(self.game.canvas().vertices()) {
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

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.game.settings().show_fps {
                    let fps = self.game.scheduler().frames_per_second();
                    el.set_text_content(Some(&format!("{} fps", fps)));
                } else {
                    el.set_text_content(None);
                }
            }

            // Menu text drawn over the canvas rails
            if let Some(el) = document.get_element_by_id("menu-overlay") {
                if self.game.state() == GameState::Menu {
                    let text = self
                        .game
                        .menu()
                        .labels()
                        .into_iter()
                        .map(|(label, selected)| {
                            if selected {
                                format!("> {}", label)
                            } else {
                                format!("  {}", label)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    el.set_text_content(Some(&text));
                    let _ = el.set_attribute("class", "");
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }

            if let Some(el) = document.get_element_by_id("pause-menu") {
                let class = if self.game.state() == GameState::Pause {
                    ""
                } else {
                    "hidden"
                };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or_else(js_sys::Date::now, |p| p.now())
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Star Blazers starting...");

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

        let settings = Settings::load();

        // Backing store follows the device pixel ratio; the game draws in
        // logical canvas units
        let dpr = window.device_pixel_ratio();
        let width = (settings.canvas_width as f64 * dpr) as u32;
        let height = (settings.canvas_height as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let canvas_size = (settings.canvas_width, settings.canvas_height);
        let client = Rc::new(RefCell::new(Client {
            game: Game::new(settings, seed),
            render_state: None,
        }));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
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

        match RenderState::new(surface, &adapter, width, height, canvas_size).await {
            Ok(render_state) => client.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("No GPU device, running without rendering: {}", e),
        }

        setup_input_handlers(client.clone());
        setup_auto_pause(client.clone());
        connect(&client);

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(client);

        log::info!("Star Blazers running!");
    }

    /// Open the game server socket, wiring its callbacks back into the game
    fn connect(client: &Shared) {
        let url = client.borrow().game.settings().server_url.clone();

        let handlers = SocketHandlers {
            on_open: {
                let client = Rc::downgrade(client);
                Box::new(move || with_client(&client, |c| c.game.on_socket_open()))
            },
            on_message: {
                let client = Rc::downgrade(client);
                Box::new(move |text: String| {
                    with_client(&client, |c| {
                        // Fatal errors halt the game; the loop notices
                        let _ = c.game.on_socket_message(&text, now());
                    })
                })
            },
            on_close: {
                let client = Rc::downgrade(client);
                Box::new(move || with_client(&client, |c| c.game.on_socket_close(now())))
            },
        };

        match WebTransport::connect(&url, handlers) {
            Ok(transport) => client.borrow_mut().game.socket_mut().connect_with(transport),
            Err(e) => {
                log::warn!("Could not open socket: {}", e);
                client.borrow_mut().game.on_socket_close(now());
            }
        }
    }

    fn with_client(client: &Weak<RefCell<Client>>, f: impl FnOnce(&mut Client)) {
        if let Some(client) = client.upgrade() {
            f(&mut client.borrow_mut());
        }
    }

    fn setup_input_handlers(client: Shared) {
        let window = web_sys::window().unwrap();

        {
            let client = client.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                client.borrow_mut().game.key_down(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                client.borrow_mut().game.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(client: Shared) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(client, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(client: Shared, time: f64) {
        let reconnect = {
            let mut c = client.borrow_mut();
            // Errors are logged by the game itself
            let _ = c.game.frame(time);
            c.render();
            c.update_hud();
            c.game.socket_mut().should_reconnect(time)
        };

        if reconnect {
            connect(&client);
        }

        let requests = client.borrow_mut().game.take_listing_requests();
        for request in requests {
            fetch_listing(&client, request);
        }

        if client.borrow().game.is_halted() {
            log::error!("Game halted");
            return;
        }
        request_animation_frame(client);
    }

    /// Fetch a lobby or player listing and hand it to the menu
    fn fetch_listing(client: &Shared, request: ListingRequest) {
        let (url, jwt) = {
            let c = client.borrow();
            let settings = c.game.settings();
            (request.url(&settings.api_url), settings.jwt.clone())
        };
        let client = Rc::downgrade(client);
        wasm_bindgen_futures::spawn_local(async move {
            match get_names(&url, jwt.as_deref()).await {
                Ok(names) => with_client(&client, |c| c.game.apply_listing(&request, names)),
                Err(e) => log::warn!("Listing fetch from {} failed: {}", url, e),
            }
        });
    }

    async fn get_names(url: &str, jwt: Option<&str>) -> Result<Vec<String>, String> {
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Request, RequestInit, RequestMode, Response};

        let init = RequestInit::new();
        init.set_method("GET");
        init.set_mode(RequestMode::Cors);
        let request =
            Request::new_with_str_and_init(url, &init).map_err(|e| format!("{:?}", e))?;
        if let Some(jwt) = jwt {
            request
                .headers()
                .set("Authorization", &format!("Bearer {}", jwt))
                .map_err(|e| format!("{:?}", e))?;
        }

        let window = web_sys::window().ok_or("no window")?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| format!("{:?}", e))?
            .dyn_into()
            .map_err(|e| format!("{:?}", e))?;
        if !response.ok() {
            return Err(format!("status {}", response.status()));
        }

        let body = response.text().map_err(|e| format!("{:?}", e))?;
        let text = JsFuture::from(body)
            .await
            .map_err(|e| format!("{:?}", e))?
            .as_string()
            .ok_or("body is not text")?;
        serde_json::from_str(&text).map_err(|e| e.to_string())
    }

    fn setup_auto_pause(client: Shared) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let client = client.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    client.borrow_mut().game.pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                client.borrow_mut().game.pause();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    log::info!("Star Blazers (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    headless_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play a few seconds against an in-memory socket and report what happened
#[cfg(not(target_arch = "wasm32"))]
fn headless_run() {
    use starblazers::net::socket::MemoryTransport;
    use starblazers::{Game, Settings};

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or(0x5eed);
    let transport = MemoryTransport::new();
    let mut game: Game<MemoryTransport> = Game::new(settings, seed);

    game.socket_mut().connect_with(transport.clone());
    game.on_socket_open();

    let pushes = [
        r#"{"type":"SynchronizeState","state":{"Authenticated":{"player_id":"native"}}}"#,
        r#"{"type":"SynchronizeState","state":{"InGame":{"player_id":"native","game_id":"local"}}}"#,
    ];
    for push in pushes {
        if let Err(e) = game.on_socket_message(push, 0.0) {
            log::error!("Headless run failed: {}", e);
            return;
        }
    }

    let frame_ms = 1000.0 / 60.0;
    for frame in 1..=600 {
        let time = frame as f64 * frame_ms + 1.0;
        if game.frame(time).is_err() {
            break;
        }
    }

    println!(
        "State: {:?}, entities alive: {}, frames sent: {}",
        game.state(),
        game.registry().len(),
        transport.sent().len()
    );
}
