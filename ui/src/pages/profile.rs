use payloads::responses::CurrentUser;
use yew::prelude::*;

use crate::components::{AddressList, ProfileForm, RequireRole};
use crate::hooks::use_title;

#[function_component]
pub fn ProfilePage() -> Html {
    use_title("Profile");

    let render = Callback::from(|user: CurrentUser| match user.id {
        Some(user_id) => html! {
            <div class="max-w-3xl space-y-10">
                <section class="space-y-4">
                    <h1 class="text-3xl font-bold">{"Profile"}</h1>
                    <ProfileForm {user_id} />
                </section>
                <section class="space-y-4">
                    <h2 class="text-xl font-semibold">{"Addresses"}</h2>
                    <AddressList {user_id} />
                </section>
            </div>
        },
        None => html! {
            <p class="text-neutral-600 dark:text-neutral-400">
                {"Your sign-in is not linked to a console account, so there is no profile to edit."}
            </p>
        },
    });

    html! { <RequireRole {render} /> }
}
