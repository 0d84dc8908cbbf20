use payloads::Role;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::State;
use crate::components::{RequireRole, UsersTable};
use crate::hooks::use_title;

#[function_component]
pub fn UsersPage() -> Html {
    let (state, _) = use_store::<State>();
    use_title("Users");
    let read_only = state.role() != Some(Role::Admin);

    html! {
        <RequireRole min_role={Role::Moderator}>
            <UsersTable {read_only} />
        </RequireRole>
    }
}
