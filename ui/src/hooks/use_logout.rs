use yew::prelude::*;
use yewdux::prelude::*;

use crate::State;

#[hook]
pub fn use_logout() -> Callback<()> {
    let (_, dispatch) = use_store::<State>();

    Callback::from(move |_| {
        yew::platform::spawn_local(crate::auth::logout(dispatch.clone()));
    })
}
