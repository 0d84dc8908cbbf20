use client_state::SessionGuard;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::State;

/// Wrap API results with the returned guard so a 401 from any call logs
/// the user out.
#[hook]
pub fn use_session_guard() -> SessionGuard {
    let (_, dispatch) = use_store::<State>();
    let guard = use_memo((), move |_| {
        SessionGuard::new(move || {
            yew::platform::spawn_local(crate::auth::logout(dispatch.clone()));
        })
    });
    (*guard).clone()
}
