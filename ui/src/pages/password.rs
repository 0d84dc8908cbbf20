use payloads::responses::CurrentUser;
use yew::prelude::*;

use crate::components::{PasswordChange, PasswordForm, RequireRole};
use crate::contexts::use_toast;
use crate::hooks::{use_logout, use_title};

#[function_component]
pub fn PasswordPage() -> Html {
    use_title("Change password");
    let logout = use_logout();
    let toasts = use_toast();

    let on_updated = Callback::from(move |require_relogin: bool| {
        if require_relogin {
            toasts.success("Password updated. Please sign in again.");
            logout.emit(());
        } else {
            toasts.success("Password updated");
        }
    });

    let render = Callback::from(move |user: CurrentUser| {
        html! {
            <div class="max-w-md space-y-6">
                <h1 class="text-3xl font-bold">{"Change password"}</h1>
                <PasswordForm
                    change={PasswordChange::Current { user_id: user.id }}
                    on_updated={on_updated.clone()}
                />
            </div>
        }
    });

    html! { <RequireRole {render} /> }
}
