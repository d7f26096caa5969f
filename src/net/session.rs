//! Server session reconciliation
//!
//! Maps a pushed [`UserState`] onto the local game-state / menu pair. The
//! mapping only reports what should change; applying it is up to the caller.
//! Every rule checks the current view first, so delivering the same push any
//! number of times yields at most one transition.

use super::protocol::UserState;
use crate::game::GameState;
use crate::menu::MenuKind;

/// Local change requested by a server push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Enter `GameState::Menu` showing this menu
    OpenMenu(MenuKind),
    /// Enter `GameState::Menu` keeping the current menu, which already
    /// matches the push
    ShowMenu,
    /// Enter `GameState::Run`, leaving the menu in place
    Run,
}

/// Client-side record of the server session
#[derive(Debug, Default, Clone)]
pub struct Session {
    user_state: Option<UserState>,
    player_id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last state pushed by the server
    pub fn user_state(&self) -> Option<&UserState> {
        self.user_state.as_ref()
    }

    /// Local player id, known once the server has authenticated us
    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    /// Record a push and work out the local transition it requires
    pub fn apply(
        &mut self,
        state: UserState,
        game_state: GameState,
        menu: &MenuKind,
    ) -> Option<Transition> {
        self.player_id = state.player_id().map(str::to_string);
        let transition = reconcile(&state, self.player_id(), game_state, menu);
        self.user_state = Some(state);
        transition
    }

    /// Forget the session, e.g. after the socket closed
    pub fn reset(&mut self) {
        self.user_state = None;
        self.player_id = None;
    }
}

/// Transition table from a server push to a local change
pub fn reconcile(
    state: &UserState,
    local_player: Option<&str>,
    game_state: GameState,
    menu: &MenuKind,
) -> Option<Transition> {
    let in_menu = game_state == GameState::Menu;
    match state {
        UserState::Unauthenticated => None,
        UserState::Authenticated { .. } => menu
            .is_lobby()
            .then_some(Transition::OpenMenu(MenuKind::Main)),
        UserState::InLobby { lobby_id, .. } if Some(lobby_id.as_str()) == local_player => {
            enter_lobby(MenuKind::CurrentPlayerOwnLobby, in_menu, menu)
        }
        UserState::InLobby { lobby_id, .. } => {
            enter_lobby(MenuKind::SomeoneElsesLobby(lobby_id.clone()), in_menu, menu)
        }
        UserState::InGame { .. } => (game_state != GameState::Run).then_some(Transition::Run),
    }
}

/// Re-entering the menu already in place never replaces it
fn enter_lobby(target: MenuKind, in_menu: bool, menu: &MenuKind) -> Option<Transition> {
    if *menu != target {
        Some(Transition::OpenMenu(target))
    } else if in_menu {
        None
    } else {
        Some(Transition::ShowMenu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_lobby(player: &str, lobby: &str) -> UserState {
        UserState::InLobby {
            player_id: player.into(),
            lobby_id: lobby.into(),
        }
    }

    #[test]
    fn test_authenticated_leaves_lobby_menus_only() {
        let auth = UserState::Authenticated {
            player_id: "me".into(),
        };
        assert_eq!(
            reconcile(&auth, Some("me"), GameState::Menu, &MenuKind::CurrentPlayerOwnLobby),
            Some(Transition::OpenMenu(MenuKind::Main))
        );
        assert_eq!(
            reconcile(
                &auth,
                Some("me"),
                GameState::Menu,
                &MenuKind::SomeoneElsesLobby("x".into())
            ),
            Some(Transition::OpenMenu(MenuKind::Main))
        );
        assert_eq!(
            reconcile(&auth, Some("me"), GameState::Menu, &MenuKind::Settings),
            None
        );
    }

    #[test]
    fn test_own_lobby_is_idempotent() {
        let mut session = Session::new();
        let mut menu = MenuKind::Multiplayer;
        let mut transitions = 0;

        for _ in 0..2 {
            if let Some(Transition::OpenMenu(kind)) =
                session.apply(in_lobby("me", "me"), GameState::Menu, &menu)
            {
                menu = kind;
                transitions += 1;
            }
        }
        assert_eq!(transitions, 1);
        assert_eq!(menu, MenuKind::CurrentPlayerOwnLobby);
        assert_eq!(session.player_id(), Some("me"));
    }

    #[test]
    fn test_other_lobby_switches_per_lobby_id() {
        let current = MenuKind::SomeoneElsesLobby("a".into());
        assert_eq!(
            reconcile(&in_lobby("me", "a"), Some("me"), GameState::Menu, &current),
            None
        );
        assert_eq!(
            reconcile(&in_lobby("me", "b"), Some("me"), GameState::Menu, &current),
            Some(Transition::OpenMenu(MenuKind::SomeoneElsesLobby("b".into())))
        );
    }

    #[test]
    fn test_lobby_push_while_running_shows_menu_in_place() {
        assert_eq!(
            reconcile(
                &in_lobby("me", "me"),
                Some("me"),
                GameState::Run,
                &MenuKind::CurrentPlayerOwnLobby
            ),
            Some(Transition::ShowMenu)
        );
        assert_eq!(
            reconcile(
                &in_lobby("me", "a"),
                Some("me"),
                GameState::Pause,
                &MenuKind::SomeoneElsesLobby("a".into())
            ),
            Some(Transition::ShowMenu)
        );
        // A different lobby still replaces the menu
        assert_eq!(
            reconcile(
                &in_lobby("me", "b"),
                Some("me"),
                GameState::Run,
                &MenuKind::SomeoneElsesLobby("a".into())
            ),
            Some(Transition::OpenMenu(MenuKind::SomeoneElsesLobby("b".into())))
        );
    }

    #[test]
    fn test_in_game_runs_once() {
        let state = UserState::InGame {
            player_id: "me".into(),
            game_id: "g".into(),
        };
        assert_eq!(
            reconcile(&state, Some("me"), GameState::Menu, &MenuKind::CurrentPlayerOwnLobby),
            Some(Transition::Run)
        );
        assert_eq!(
            reconcile(&state, Some("me"), GameState::Run, &MenuKind::CurrentPlayerOwnLobby),
            None
        );
    }

    #[test]
    fn test_unauthenticated_forgets_player_id() {
        let mut session = Session::new();
        session.apply(
            UserState::Authenticated {
                player_id: "me".into(),
            },
            GameState::Menu,
            &MenuKind::Main,
        );
        assert_eq!(session.player_id(), Some("me"));

        session.apply(UserState::Unauthenticated, GameState::Menu, &MenuKind::Main);
        assert_eq!(session.player_id(), None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = Session::new();
        session.apply(in_lobby("me", "me"), GameState::Menu, &MenuKind::Main);
        session.reset();
        assert_eq!(session.player_id(), None);
        assert_eq!(session.user_state(), None);
    }

    #[test]
    fn test_unauthenticated_changes_nothing() {
        let mut session = Session::new();
        assert_eq!(
            session.apply(UserState::Unauthenticated, GameState::Menu, &MenuKind::Main),
            None
        );
        assert_eq!(session.player_id(), None);
        assert_eq!(session.user_state(), Some(&UserState::Unauthenticated));
    }
}
