use payloads::Role;
use payloads::responses::CurrentUser;
use yewdux::prelude::*;

#[derive(Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Unknown,
    LoggedOut,
    LoggedIn(CurrentUser),
}

#[derive(Default, Clone, PartialEq, Store)]
pub struct State {
    pub error_message: Option<String>,
    pub dark_mode: bool,

    // managed by use_authentication and use_logout
    pub auth_state: AuthState,
}

impl State {
    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth_state, AuthState::LoggedIn(_))
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        match &self.auth_state {
            AuthState::LoggedIn(user) => Some(user),
            _ => None,
        }
    }

    /// Key for per-user settings; empty while signed out.
    pub fn owner_id(&self) -> String {
        self.current_user()
            .map(CurrentUser::owner_id)
            .unwrap_or_default()
    }

    pub fn role(&self) -> Option<Role> {
        self.current_user().map(CurrentUser::highest_role)
    }

    pub fn logout(&mut self) {
        self.auth_state = AuthState::LoggedOut;
        self.dark_mode = false;
        self.error_message = None;
    }
}
