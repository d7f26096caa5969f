//! Game orchestrator
//!
//! One [`Game::frame`] call per animation frame. Depending on the game state
//! and the scheduler it processes menu input, advances the simulation, sends
//! socket heartbeats, then rebuilds the draw list. Server frames arrive
//! through [`Game::on_socket_message`] between frames.
//!
//! Simulation tick order:
//! 1. cleanup of entities deactivated last tick
//! 2. input
//! 3. entity updates, fire requests turned into bullets by the registry
//! 4. collisions: aliens × player bullets, players × alien bullets
//! 5. position report to the server

use std::collections::HashMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::PLAYER_SPAWN_OFFSET;
use crate::dev_console::{self, Command, ConsoleTarget};
use crate::error::{GameError, RegistryError};
use crate::input::{InputState, TickInput};
use crate::menu::{ListingRequest, Menu, MenuAction, MenuKind};
use crate::net::protocol::{ClientMessage, RemotePlayerState, ServerMessage, UserState};
use crate::net::session::{Session, Transition};
use crate::net::socket::{Socket, Transport};
use crate::renderer::{Canvas, DebugContext};
use crate::settings::Settings;
use crate::sim::collision::check_collision;
use crate::sim::entity::{Direction, EntityId, EntityKind, UpdateContext};
use crate::sim::registry::EntityRegistry;
use crate::sim::scheduler::{Throttle, TickScheduler};
use crate::sim::spawn::SpawnHandler;

/// Which cadence and input routing applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    #[default]
    Menu,
    Run,
    Pause,
}

pub struct Game<T: Transport> {
    settings: Settings,
    state: GameState,
    menu: Menu,
    registry: EntityRegistry,
    spawner: SpawnHandler,
    scheduler: TickScheduler,
    input: InputState,
    session: Session,
    socket: Socket<T>,
    rng: Pcg32,
    debug: DebugContext,
    canvas: Canvas,
    local_player: Option<EntityId>,
    /// Last frame time each mirrored player was heard from
    remote_seen: HashMap<EntityId, f64>,
    listing_poll: Throttle,
    /// Fetch the listing on the next menu frame regardless of the cadence
    listing_due: bool,
    /// Listings for the platform layer to fetch
    listing_requests: Vec<ListingRequest>,
    /// Set after a fatal error; no further frames are processed
    halted: bool,
    menu_transitions: u32,
}

impl<T: Transport> Game<T> {
    pub fn new(settings: Settings, seed: u64) -> Self {
        log::info!("Game initialized with seed: {}", seed);
        Self {
            state: GameState::Menu,
            menu: Menu::new(MenuKind::Main, None),
            registry: EntityRegistry::new(settings.entity_capacity, settings.bounds()),
            spawner: SpawnHandler::new(),
            scheduler: TickScheduler::new(
                settings.sim_interval_ms,
                settings.menu_input_interval_ms,
                settings.heartbeat_interval_ms,
            ),
            input: InputState::new(),
            session: Session::new(),
            socket: Socket::new(settings.reconnect_delay_ms),
            rng: Pcg32::seed_from_u64(seed),
            debug: DebugContext {
                enabled: settings.debug,
            },
            canvas: Canvas::new(),
            local_player: None,
            remote_seen: HashMap::new(),
            listing_poll: Throttle::new(settings.listing_poll_interval_ms),
            listing_due: true,
            listing_requests: Vec::new(),
            halted: false,
            menu_transitions: 0,
            settings,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    /// Number of menu replacements so far
    pub fn menu_transitions(&self) -> u32 {
        self.menu_transitions
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn socket(&self) -> &Socket<T> {
        &self.socket
    }

    pub fn socket_mut(&mut self) -> &mut Socket<T> {
        &mut self.socket
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn debug(&self) -> DebugContext {
        self.debug
    }

    pub fn local_player(&self) -> Option<EntityId> {
        self.local_player
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    // -------------------------------------------------------------------------
    // Platform events
    // -------------------------------------------------------------------------

    pub fn key_down(&mut self, key: &str) {
        self.input.key_down(key, self.state == GameState::Menu);
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    /// Focus lost or tab hidden
    pub fn pause(&mut self) {
        if self.state == GameState::Run {
            self.state = GameState::Pause;
            log::info!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Pause {
            self.state = GameState::Run;
            log::info!("Resumed");
        }
    }

    pub fn on_socket_open(&mut self) {
        self.socket.on_open();
        if let Some(jwt) = self.settings.jwt.clone() {
            self.send(ClientMessage::Auth { jwt });
        }
    }

    /// The server forgets us with the connection, so does the session
    pub fn on_socket_close(&mut self, timestamp: f64) {
        self.socket.on_close(timestamp);
        self.session.reset();
    }

    /// Listings waiting to be fetched by the platform layer
    pub fn take_listing_requests(&mut self) -> Vec<ListingRequest> {
        std::mem::take(&mut self.listing_requests)
    }

    /// Feed a fetched listing to the menu that asked for it
    pub fn apply_listing(&mut self, request: &ListingRequest, names: Vec<String>) {
        self.menu.apply_listing(request, names);
    }

    /// Apply one inbound frame. Malformed frames are logged and dropped.
    pub fn on_socket_message(&mut self, text: &str, timestamp: f64) -> Result<(), GameError> {
        if self.halted {
            return Ok(());
        }
        let message = match ServerMessage::decode(text) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("Ignoring malformed server frame: {}", e);
                return Ok(());
            }
        };
        let result = match message {
            ServerMessage::SynchronizeState(state) => self.synchronize(state, timestamp),
            ServerMessage::GameState(remote) => self.mirror_remote(&remote, timestamp),
        };
        self.check_fatal(result)
    }

    // -------------------------------------------------------------------------
    // Frame loop
    // -------------------------------------------------------------------------

    /// Run one animation frame. An error is fatal: the game halts and the
    /// caller should stop scheduling frames.
    pub fn frame(&mut self, timestamp: f64) -> Result<(), GameError> {
        if self.halted {
            return Ok(());
        }
        let result = self.advance(timestamp);
        self.check_fatal(result)?;
        self.draw();
        Ok(())
    }

    fn advance(&mut self, timestamp: f64) -> Result<(), GameError> {
        self.scheduler.count_frame(timestamp);

        if self.socket.is_open() && self.scheduler.should_heartbeat(timestamp) {
            self.send(ClientMessage::Heartbeat { timestamp });
        }

        match self.state {
            GameState::Menu => {
                self.poll_listing(timestamp);
                if self.scheduler.should_process_menu_input(timestamp)
                    && let Some(action) = self.menu.handle_input(&mut self.input)
                {
                    self.apply_menu_action(action, timestamp)?;
                }
            }
            GameState::Run | GameState::Pause => {
                if self.scheduler.should_advance_simulation(timestamp) {
                    let input = self.input.sample(timestamp);
                    if input.escape {
                        self.on_escape();
                    }
                    if self.state == GameState::Run {
                        if let Some(command) = input.dev_command {
                            self.run_command(command)?;
                        }
                        self.tick(&input, timestamp)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn poll_listing(&mut self, timestamp: f64) {
        let Some(request) = self.menu.listing_request() else {
            return;
        };
        let due = if std::mem::take(&mut self.listing_due) {
            self.listing_poll.reset(timestamp);
            true
        } else {
            self.listing_poll.ready(timestamp)
        };
        if due && !self.listing_requests.contains(&request) {
            self.listing_requests.push(request);
        }
    }

    fn check_fatal(&mut self, result: Result<(), GameError>) -> Result<(), GameError> {
        if let Err(e) = &result {
            log::error!("Fatal error, halting: {}", e);
            self.halted = true;
        }
        result
    }

    fn on_escape(&mut self) {
        match self.state {
            GameState::Run => self.open_menu(MenuKind::Main),
            GameState::Pause => self.resume(),
            GameState::Menu => {}
        }
    }

    /// One fixed simulation step
    fn tick(&mut self, input: &TickInput, timestamp: f64) -> Result<(), GameError> {
        self.registry.cleanup();
        if let Some(id) = self.local_player
            && self.registry.get(id).is_none()
        {
            log::info!("Local player {} is gone", id);
            self.local_player = None;
        }
        self.expire_remote_players(timestamp);

        self.update_entities(input.steering)?;
        self.resolve_collisions();
        self.report_state(timestamp);
        Ok(())
    }

    fn expire_remote_players(&mut self, timestamp: f64) {
        let timeout = self.settings.remote_player_timeout_ms;
        let registry = &mut self.registry;
        self.remote_seen.retain(|&id, &mut seen| {
            let Some(entity) = registry.get_mut(id) else {
                return false;
            };
            if timestamp - seen > timeout {
                log::info!("Remote player {} timed out", id);
                entity.deactivate();
                return false;
            }
            true
        });
    }

    fn update_entities(&mut self, steering: Option<Vec2>) -> Result<(), RegistryError> {
        let bounds = self.registry.bounds();
        let mut in_flight: HashMap<EntityId, usize> = HashMap::new();
        for shooter in self.registry.iter().filter_map(|e| e.shooter_id()) {
            *in_flight.entry(shooter).or_default() += 1;
        }

        // Bullets fired this tick start moving on the next one; `notify`
        // enforces the cap against live counts
        for id in self.registry.ids() {
            let bullets_in_flight = in_flight.get(&id).copied().unwrap_or(0);
            let steering = if Some(id) == self.local_player {
                steering
            } else {
                None
            };
            let Some(entity) = self.registry.get_mut(id) else {
                continue;
            };
            let mut ctx = UpdateContext {
                bounds,
                bullets_in_flight,
                steering,
                rng: &mut self.rng,
            };
            if let Some(event) = entity.update(&mut ctx) {
                self.registry.notify(id, event)?;
            }
        }
        Ok(())
    }

    /// Players fire upward and aliens downward, so direction picks the side
    fn resolve_collisions(&mut self) {
        let mut player_bullets = Vec::new();
        let mut alien_bullets = Vec::new();
        for bullet in self.registry.bullets() {
            match bullet.as_bullet().map(|b| b.direction) {
                Some(Direction::Up) => player_bullets.push(bullet.id()),
                Some(Direction::Down) => alien_bullets.push(bullet.id()),
                None => {}
            }
        }
        let enemies: Vec<EntityId> = self.registry.enemies().iter().map(|e| e.id()).collect();
        let players = self.registry.ids_by_kind(EntityKind::Player);

        self.resolve_side(&enemies, &player_bullets);
        self.resolve_side(&players, &alien_bullets);
    }

    fn resolve_side(&mut self, defenders: &[EntityId], bullets: &[EntityId]) {
        for &defender in defenders {
            for &bullet in bullets {
                let hit = match (self.registry.get(defender), self.registry.get(bullet)) {
                    (Some(d), Some(b)) if d.is_active() && b.is_active() => check_collision(d, b),
                    _ => false,
                };
                if !hit {
                    continue;
                }
                if let Some(d) = self.registry.get_mut(defender) {
                    d.take_hit();
                    log::debug!("Entity {} hit by bullet {}", defender, bullet);
                }
                if let Some(b) = self.registry.get_mut(bullet) {
                    b.deactivate();
                }
            }
        }
    }

    fn report_state(&mut self, timestamp: f64) {
        if !self.socket.is_open() {
            return;
        }
        let message = {
            let player = self.local_player.and_then(|id| self.registry.get(id));
            match (self.session.player_id(), player) {
                (Some(player_id), Some(player)) => ClientMessage::GameState {
                    position_x: player.position.x,
                    position_y: player.position.y,
                    player_id: player_id.to_string(),
                    timestamp,
                },
                _ => return,
            }
        };
        self.send(message);
    }

    fn draw(&mut self) {
        self.canvas.clear();
        match self.state {
            GameState::Menu => self.menu.draw(&mut self.canvas, self.registry.bounds()),
            GameState::Run | GameState::Pause => {
                for entity in self.registry.iter() {
                    entity.draw(&mut self.canvas, self.debug);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Menus and runs
    // -------------------------------------------------------------------------

    /// Replace the active menu, running the old menu's exit hook first
    pub fn open_menu(&mut self, kind: MenuKind) {
        if let Some(message) = self.menu.on_exit() {
            self.send(message);
        }
        log::info!("Opening menu: {}", kind.title());
        self.menu = Menu::new(kind, self.session.player_id());
        self.state = GameState::Menu;
        self.input.clear_cached();
        self.listing_due = true;
        self.menu_transitions += 1;
    }

    /// Fresh run: local player at the bottom center plus the alien wave
    pub fn start_run(&mut self, timestamp: f64) -> Result<(), GameError> {
        self.registry.clear();
        self.remote_seen.clear();
        let bounds = self.registry.bounds();
        let position = Vec2::new(bounds.width / 2.0, bounds.height - PLAYER_SPAWN_OFFSET);
        let player_id = self.session.player_id().unwrap_or("local").to_string();

        self.local_player = Some(self.spawner.spawn_player(
            &mut self.registry,
            position,
            &player_id,
            self.settings.max_bullets,
        )?);
        self.spawner.spawn_alien_wave(&mut self.registry)?;

        self.scheduler.start_run(timestamp);
        self.state = GameState::Run;
        log::info!("Run started");
        Ok(())
    }

    fn apply_menu_action(&mut self, action: MenuAction, timestamp: f64) -> Result<(), GameError> {
        match action {
            MenuAction::StartSinglePlayer => self.start_run(timestamp)?,
            MenuAction::Open(kind) => self.open_menu(kind),
            MenuAction::CreateLobby => match self.session.player_id() {
                Some(player_id) => {
                    let message = ClientMessage::create_lobby(player_id);
                    self.send(message);
                }
                None => log::warn!("Cannot create a lobby before authenticating"),
            },
            MenuAction::JoinLobby(lobby_name) => match self.session.player_id() {
                Some(player_id) => {
                    let message = ClientMessage::JoinLobby {
                        lobby_name,
                        player_id: player_id.to_string(),
                    };
                    self.send(message);
                }
                None => log::warn!("Cannot join a lobby before authenticating"),
            },
            // The menu changes once the server confirms
            MenuAction::LeaveLobby => {
                if let Some(message) = self.menu.on_exit() {
                    self.send(message);
                }
            }
            MenuAction::Exit => log::info!("Exit selected"),
        }
        Ok(())
    }

    /// Run a developer console command
    pub fn run_command(&mut self, line: &str) -> Result<(), GameError> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                log::warn!("Dev console: {}", e);
                return Ok(());
            }
        };
        dev_console::execute(
            &command,
            ConsoleTarget {
                registry: &mut self.registry,
                spawner: &mut self.spawner,
                debug: &mut self.debug,
            },
        )?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Server state
    // -------------------------------------------------------------------------

    fn synchronize(&mut self, state: UserState, timestamp: f64) -> Result<(), GameError> {
        log::info!("Server state: {:?}", state);
        match self.session.apply(state, self.state, self.menu.kind()) {
            Some(Transition::OpenMenu(kind)) => self.open_menu(kind),
            Some(Transition::ShowMenu) => {
                log::info!("Back to menu: {}", self.menu.title());
                self.state = GameState::Menu;
                self.input.clear_cached();
                self.listing_due = true;
            }
            Some(Transition::Run) => {
                if self.local_player.is_some() {
                    self.state = GameState::Run;
                } else {
                    self.start_run(timestamp)?;
                }
            }
            None => {}
        }
        Ok(())
    }

    /// Track another player's reported position, spawning it on first sight
    fn mirror_remote(
        &mut self,
        remote: &RemotePlayerState,
        timestamp: f64,
    ) -> Result<(), GameError> {
        if self.session.player_id() == Some(remote.player_id.as_str()) {
            return Ok(());
        }
        let position = Vec2::new(remote.position_x, remote.position_y);
        let id = match self.registry.find_player(&remote.player_id) {
            Some(id) => {
                if let Some(entity) = self.registry.get_mut(id) {
                    entity.sync_remote_position(position);
                }
                id
            }
            None => {
                self.spawner
                    .spawn_remote_player(&mut self.registry, position, &remote.player_id)?
            }
        };
        self.remote_seen.insert(id, timestamp);
        Ok(())
    }

    fn send(&mut self, message: ClientMessage) {
        if let Err(e) = self.socket.send(&message) {
            log::warn!("Could not send {:?}: {}", message, e);
        }
    }
}
