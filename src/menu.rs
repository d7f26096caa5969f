//! Menu screens
//!
//! Exactly one [`Menu`] is active at a time. Menus turn cached key presses
//! into [`MenuAction`]s for the game to carry out; they never talk to the
//! socket themselves; their exit hook only returns the frame to send.

use glam::Vec2;

use crate::input::InputState;
use crate::net::protocol::{ClientMessage, own_lobby_name};
use crate::renderer::Canvas;
use crate::renderer::vertex::colors;
use crate::sim::entity::Bounds;
use crate::sim::shape::Rect;

// Layout (canvas pixels)
const MENU_START_Y: f32 = 60.0;
const HEADER_SIZE: f32 = 36.0;
const ITEM_SIZE: f32 = 20.0;
const PIXELS_BELOW_HEADER: f32 = 60.0;
const PIXELS_BETWEEN_ITEMS: f32 = 50.0;
const ITEM_WIDTH: f32 = 320.0;
const RAIL_WIDTH: f32 = 30.0;
const RAIL_TOP: f32 = 30.0;

// Navigator cursor
const DISTANCE_TO_ITEM: f32 = 20.0;
const NAVIGATOR_HORIZONTAL_LENGTH: f32 = 40.0;
const NAVIGATOR_VERTICAL_LENGTH: f32 = 20.0;

const MAIN_MENU_ITEMS: [&str; 7] = [
    "Tutorial",
    "Single player",
    "Multiplayer",
    "Account",
    "Settings",
    "Shop",
    "Exit",
];
const SETTINGS_MENU_ITEMS: [&str; 6] = [
    "General",
    "Sound",
    "Video",
    "Accessibility",
    "More settings",
    "Main menu",
];
const MULTIPLAYER_MENU_ITEMS: [&str; 4] = ["Quick join", "Create lobby", "Join lobby", "Exit"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MenuKind {
    #[default]
    Main,
    Settings,
    Multiplayer,
    CurrentPlayerOwnLobby,
    JoinLobby,
    /// Lobby hosted by another player, by lobby id
    SomeoneElsesLobby(String),
    Undefined,
}

impl MenuKind {
    pub fn title(&self) -> &'static str {
        match self {
            MenuKind::Main => "Main menu",
            MenuKind::Settings => "Settings",
            MenuKind::Multiplayer => "Multiplayer",
            MenuKind::CurrentPlayerOwnLobby => "Your lobby",
            MenuKind::JoinLobby => "Join lobby",
            MenuKind::SomeoneElsesLobby(_) => "Lobby",
            MenuKind::Undefined => "Undefined",
        }
    }

    pub fn is_lobby(&self) -> bool {
        matches!(
            self,
            MenuKind::CurrentPlayerOwnLobby | MenuKind::SomeoneElsesLobby(_)
        )
    }

    /// Menu that Escape returns to. Lobbies are left through the server.
    fn parent(&self) -> Option<MenuKind> {
        match self {
            MenuKind::Settings | MenuKind::Multiplayer | MenuKind::Undefined => Some(MenuKind::Main),
            MenuKind::JoinLobby => Some(MenuKind::Multiplayer),
            MenuKind::Main | MenuKind::CurrentPlayerOwnLobby | MenuKind::SomeoneElsesLobby(_) => {
                None
            }
        }
    }
}

/// What selecting an item asks the game to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    StartSinglePlayer,
    Open(MenuKind),
    CreateLobby,
    JoinLobby(String),
    LeaveLobby,
    Exit,
}

/// Listing a menu shows below its fixed items, fetched over HTTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingRequest {
    /// Open lobbies, for the join menu
    Lobbies,
    /// Players in the lobby created by `owner`
    Players { owner: String },
}

impl ListingRequest {
    /// Endpoint serving this listing under `api_url`
    pub fn url(&self, api_url: &str) -> String {
        let base = api_url.trim_end_matches('/');
        match self {
            Self::Lobbies => format!("{}/lobbies", base),
            Self::Players { owner } => format!("{}/lobby/{}/players", base, owner),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub label: String,
    /// `None` for informational or unimplemented entries
    pub action: Option<MenuAction>,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub struct Menu {
    kind: MenuKind,
    items: Vec<MenuItem>,
    index: usize,
    local_player: Option<String>,
    /// Players (lobby menus) or lobbies (join menu) listed below the fixed items
    listing: Vec<String>,
    /// `LeaveLobby` already sent for this menu
    left: bool,
}

impl Menu {
    pub fn new(kind: MenuKind, local_player: Option<&str>) -> Self {
        let mut menu = Self {
            kind,
            items: Vec::new(),
            index: 0,
            local_player: local_player.map(str::to_string),
            listing: Vec::new(),
            left: false,
        };
        menu.rebuild();
        menu
    }

    pub fn kind(&self) -> &MenuKind {
        &self.kind
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn selected(&self) -> Option<&MenuItem> {
        self.items.get(self.index)
    }

    /// Lobby name this menu belongs to, for lobby menus
    pub fn lobby_name(&self) -> Option<String> {
        match &self.kind {
            MenuKind::CurrentPlayerOwnLobby => self.local_player.as_deref().map(own_lobby_name),
            MenuKind::SomeoneElsesLobby(lobby_id) => Some(lobby_id.clone()),
            _ => None,
        }
    }

    /// Listing this menu polls for, if any
    pub fn listing_request(&self) -> Option<ListingRequest> {
        match &self.kind {
            MenuKind::JoinLobby => Some(ListingRequest::Lobbies),
            MenuKind::CurrentPlayerOwnLobby => {
                self.local_player.clone().map(|owner| ListingRequest::Players { owner })
            }
            MenuKind::SomeoneElsesLobby(lobby_id) => Some(ListingRequest::Players {
                owner: lobby_id.clone(),
            }),
            _ => None,
        }
    }

    /// Apply a fetched listing if this menu still asks for it
    pub fn apply_listing(&mut self, request: &ListingRequest, names: Vec<String>) {
        if self.listing_request().as_ref() != Some(request) {
            log::debug!("Dropping stale listing for {:?}", request);
            return;
        }
        match request {
            ListingRequest::Lobbies => self.set_lobbies(names),
            ListingRequest::Players { .. } => self.set_players(names),
        }
    }

    /// Replace the player list of a lobby menu
    pub fn set_players(&mut self, players: Vec<String>) {
        if self.kind.is_lobby() {
            self.listing = players;
            self.rebuild();
        }
    }

    /// Replace the lobbies offered by the join menu
    pub fn set_lobbies(&mut self, lobbies: Vec<String>) {
        if self.kind == MenuKind::JoinLobby {
            self.listing = lobbies;
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let fixed: Vec<(String, Option<MenuAction>)> = match &self.kind {
            MenuKind::Main => MAIN_MENU_ITEMS
                .iter()
                .map(|label| (label.to_string(), main_action(label)))
                .collect(),
            MenuKind::Settings => SETTINGS_MENU_ITEMS
                .iter()
                .map(|label| {
                    let action = (*label == "Main menu").then_some(MenuAction::Open(MenuKind::Main));
                    (label.to_string(), action)
                })
                .collect(),
            MenuKind::Multiplayer => MULTIPLAYER_MENU_ITEMS
                .iter()
                .map(|label| (label.to_string(), multiplayer_action(label)))
                .collect(),
            MenuKind::JoinLobby => self
                .listing
                .iter()
                .map(|lobby| (lobby.clone(), Some(MenuAction::JoinLobby(lobby.clone()))))
                .chain(std::iter::once((
                    "Back".to_string(),
                    Some(MenuAction::Open(MenuKind::Multiplayer)),
                )))
                .collect(),
            MenuKind::CurrentPlayerOwnLobby | MenuKind::SomeoneElsesLobby(_) => {
                let you = self.local_player.as_deref();
                std::iter::once(("Leave lobby".to_string(), Some(MenuAction::LeaveLobby)))
                    .chain(self.listing.iter().map(|player| {
                        let label = if Some(player.as_str()) == you {
                            format!("{} (you)", player)
                        } else {
                            player.clone()
                        };
                        (label, None)
                    }))
                    .collect()
            }
            MenuKind::Undefined => Vec::new(),
        };

        let first_y = MENU_START_Y + PIXELS_BELOW_HEADER;
        self.items = fixed
            .into_iter()
            .enumerate()
            .map(|(i, (label, action))| MenuItem {
                label,
                action,
                y: first_y + i as f32 * PIXELS_BETWEEN_ITEMS,
            })
            .collect();
        self.index = self.index.min(self.items.len().saturating_sub(1));
    }

    pub fn prev_item(&mut self) {
        if !self.items.is_empty() {
            self.index = (self.index + self.items.len() - 1) % self.items.len();
        }
    }

    pub fn next_item(&mut self) {
        if !self.items.is_empty() {
            self.index = (self.index + 1) % self.items.len();
        }
    }

    /// Consume cached presses: `w`/`k` up, `s`/`j` down, `Enter` select,
    /// `Escape` back
    pub fn handle_input(&mut self, input: &mut InputState) -> Option<MenuAction> {
        if input.take_cached(&["w", "k"]) {
            self.prev_item();
        }
        if input.take_cached(&["s", "j"]) {
            self.next_item();
        }
        if input.take_escape() {
            input.take_cached(&["Escape"]);
            if let Some(parent) = self.kind.parent() {
                return Some(MenuAction::Open(parent));
            }
        }
        if input.take_cached(&["Enter"]) {
            match self.selected() {
                Some(item) => {
                    if item.action.is_none() {
                        log::info!("Menu item '{}' has no action", item.label);
                    }
                    return item.action.clone();
                }
                None => log::error!(
                    "Selected an empty menu item at index {} ({} items)",
                    self.index,
                    self.items.len()
                ),
            }
        }
        None
    }

    /// Leave frame for a lobby menu. Yields it once; later calls return
    /// `None`. Also run as the exit hook before this menu is replaced.
    pub fn on_exit(&mut self) -> Option<ClientMessage> {
        if self.left {
            return None;
        }
        let lobby_name = self.lobby_name()?;
        let player_id = self.local_player.clone()?;
        self.left = true;
        Some(ClientMessage::LeaveLobby {
            lobby_name,
            player_id,
        })
    }

    /// Header and item labels for a text overlay, with the selection flag
    pub fn labels(&self) -> Vec<(String, bool)> {
        std::iter::once((self.title().to_string(), false))
            .chain(
                self.items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (item.label.clone(), i == self.index)),
            )
            .collect()
    }

    pub fn draw(&self, canvas: &mut Canvas, bounds: Bounds) {
        // Side rails
        let rail_height = bounds.height - RAIL_TOP;
        canvas.rect(
            Rect::new(0.0, RAIL_TOP, RAIL_WIDTH, rail_height),
            colors::MENU_RAIL,
        );
        canvas.rect(
            Rect::new(bounds.width - RAIL_WIDTH, RAIL_TOP, RAIL_WIDTH, rail_height),
            colors::MENU_RAIL,
        );

        let item_x = (bounds.width - ITEM_WIDTH) / 2.0;
        canvas.rect(
            Rect::new(item_x, MENU_START_Y - HEADER_SIZE, ITEM_WIDTH, HEADER_SIZE),
            colors::MENU_SELECTED,
        );
        for (i, item) in self.items.iter().enumerate() {
            let color = if i == self.index {
                colors::MENU_SELECTED
            } else {
                colors::MENU_ITEM
            };
            canvas.rect(Rect::new(item_x, item.y - ITEM_SIZE, ITEM_WIDTH, ITEM_SIZE), color);
        }

        if let Some(item) = self.selected() {
            let leftmost_x = item_x - (DISTANCE_TO_ITEM + NAVIGATOR_HORIZONTAL_LENGTH);
            canvas.triangle(
                Vec2::new(leftmost_x, item.y - ITEM_SIZE - NAVIGATOR_VERTICAL_LENGTH / 2.0),
                Vec2::new(item_x - DISTANCE_TO_ITEM, item.y - ITEM_SIZE / 2.0),
                Vec2::new(leftmost_x, item.y + NAVIGATOR_VERTICAL_LENGTH / 2.0),
                colors::PRIMARY,
            );
        }
    }
}

fn main_action(label: &str) -> Option<MenuAction> {
    match label {
        "Single player" => Some(MenuAction::StartSinglePlayer),
        "Multiplayer" => Some(MenuAction::Open(MenuKind::Multiplayer)),
        "Settings" => Some(MenuAction::Open(MenuKind::Settings)),
        "Exit" => Some(MenuAction::Exit),
        _ => None,
    }
}

fn multiplayer_action(label: &str) -> Option<MenuAction> {
    match label {
        "Create lobby" => Some(MenuAction::CreateLobby),
        "Join lobby" => Some(MenuAction::Open(MenuKind::JoinLobby)),
        "Exit" => Some(MenuAction::Open(MenuKind::Main)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputState, key: &str) {
        input.key_down(key, true);
        input.key_up(key);
    }

    #[test]
    fn test_main_menu_labels() {
        let menu = Menu::new(MenuKind::Main, None);
        let labels: Vec<&str> = menu.items().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, MAIN_MENU_ITEMS);
        assert_eq!(menu.labels()[0], ("Main menu".to_string(), false));
        assert_eq!(menu.labels()[1], ("Tutorial".to_string(), true));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut menu = Menu::new(MenuKind::Multiplayer, None);
        let mut input = InputState::new();

        press(&mut input, "w");
        assert_eq!(menu.handle_input(&mut input), None);
        assert_eq!(menu.selected().unwrap().label, "Exit");

        press(&mut input, "j");
        menu.handle_input(&mut input);
        assert_eq!(menu.selected().unwrap().label, "Quick join");
    }

    #[test]
    fn test_select_single_player() {
        let mut menu = Menu::new(MenuKind::Main, None);
        let mut input = InputState::new();
        press(&mut input, "s");
        press(&mut input, "Enter");
        assert_eq!(menu.handle_input(&mut input), Some(MenuAction::StartSinglePlayer));
        // Presses are consumed
        assert_eq!(menu.handle_input(&mut input), None);
    }

    #[test]
    fn test_escape_goes_to_parent() {
        let mut input = InputState::new();
        press(&mut input, "Escape");
        let mut menu = Menu::new(MenuKind::JoinLobby, None);
        assert_eq!(
            menu.handle_input(&mut input),
            Some(MenuAction::Open(MenuKind::Multiplayer))
        );

        press(&mut input, "Escape");
        let mut lobby = Menu::new(MenuKind::CurrentPlayerOwnLobby, Some("me"));
        assert_eq!(lobby.handle_input(&mut input), None);
    }

    #[test]
    fn test_lobby_menus_leave_on_exit() {
        let mut own = Menu::new(MenuKind::CurrentPlayerOwnLobby, Some("me"));
        assert_eq!(
            own.on_exit(),
            Some(ClientMessage::LeaveLobby {
                lobby_name: "me's lobby".into(),
                player_id: "me".into()
            })
        );

        let mut other = Menu::new(MenuKind::SomeoneElsesLobby("them".into()), Some("me"));
        assert_eq!(
            other.on_exit(),
            Some(ClientMessage::LeaveLobby {
                lobby_name: "them".into(),
                player_id: "me".into()
            })
        );

        assert_eq!(Menu::new(MenuKind::Main, Some("me")).on_exit(), None);
    }

    #[test]
    fn test_leave_is_sent_once() {
        let mut own = Menu::new(MenuKind::CurrentPlayerOwnLobby, Some("me"));
        assert!(own.on_exit().is_some());
        assert_eq!(own.on_exit(), None);
    }

    #[test]
    fn test_listing_requests_per_menu() {
        assert_eq!(
            Menu::new(MenuKind::JoinLobby, None).listing_request(),
            Some(ListingRequest::Lobbies)
        );
        assert_eq!(
            Menu::new(MenuKind::CurrentPlayerOwnLobby, Some("me")).listing_request(),
            Some(ListingRequest::Players { owner: "me".into() })
        );
        assert_eq!(
            Menu::new(MenuKind::SomeoneElsesLobby("them".into()), Some("me")).listing_request(),
            Some(ListingRequest::Players {
                owner: "them".into()
            })
        );
        assert_eq!(Menu::new(MenuKind::Main, Some("me")).listing_request(), None);
    }

    #[test]
    fn test_listing_urls() {
        assert_eq!(
            ListingRequest::Lobbies.url("http://localhost:3030/"),
            "http://localhost:3030/lobbies"
        );
        let players = ListingRequest::Players {
            owner: "them".into(),
        };
        assert_eq!(
            players.url("http://localhost:3030"),
            "http://localhost:3030/lobby/them/players"
        );
    }

    #[test]
    fn test_stale_listing_is_dropped() {
        let mut menu = Menu::new(MenuKind::SomeoneElsesLobby("them".into()), Some("me"));
        menu.apply_listing(
            &ListingRequest::Players {
                owner: "other".into(),
            },
            vec!["other".into()],
        );
        assert_eq!(menu.items().len(), 1);

        menu.apply_listing(
            &ListingRequest::Players {
                owner: "them".into(),
            },
            vec!["them".into()],
        );
        assert_eq!(menu.items().len(), 2);
    }

    #[test]
    fn test_lobby_player_listing_marks_self() {
        let mut menu = Menu::new(MenuKind::SomeoneElsesLobby("them".into()), Some("me"));
        menu.set_players(vec!["them".into(), "me".into()]);
        let labels: Vec<&str> = menu.items().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Leave lobby", "them", "me (you)"]);
    }

    #[test]
    fn test_join_menu_lists_lobbies() {
        let mut menu = Menu::new(MenuKind::JoinLobby, Some("me"));
        menu.set_lobbies(vec!["abc's lobby".into()]);
        let mut input = InputState::new();
        press(&mut input, "Enter");
        assert_eq!(
            menu.handle_input(&mut input),
            Some(MenuAction::JoinLobby("abc's lobby".into()))
        );
    }

    #[test]
    fn test_draw_emits_rails_and_navigator() {
        let menu = Menu::new(MenuKind::Settings, None);
        let mut canvas = Canvas::new();
        menu.draw(&mut canvas, Bounds::default());
        // 2 rails + header + 6 items as quads, plus the navigator triangle
        assert_eq!(canvas.vertices().len(), (2 + 1 + 6) * 6 + 3);
    }
}
