use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::Route;
use crate::components::{PasswordChange, PasswordForm};
use crate::hooks::use_title;
use crate::storage::clear_logging_out;

/// Recovery links carry the token base64-encoded. Tokens that do not
/// decode to UTF-8 are used as they are.
pub fn decode_reset_token(encoded: &str) -> String {
    STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| encoded.to_string())
}

#[derive(Properties, PartialEq)]
pub struct ResetPasswordPageProps {
    pub token: String,
}

#[function_component]
pub fn ResetPasswordPage(props: &ResetPasswordPageProps) -> Html {
    use_title("Reset password");
    let success = use_state(|| false);

    use_effect_with((), |_| clear_logging_out());

    let token = use_memo(props.token.clone(), |token| decode_reset_token(token));

    let on_updated = {
        let success = success.clone();
        Callback::from(move |_| success.set(true))
    };

    html! {
        <div class="flex items-center justify-center min-h-[60vh]">
            <div class="max-w-md w-full space-y-6">
                <div class="text-center">
                    <h1 class="text-3xl font-bold text-neutral-900 dark:text-white mb-2">
                        {"Set new password"}
                    </h1>
                </div>
                if *success {
                    <div class="text-center space-y-4">
                        <p class="font-semibold">{"Password reset successful"}</p>
                        <Link<Route> to={Route::Home} classes="underline">
                            {"Go to sign in"}
                        </Link<Route>>
                    </div>
                } else {
                    <PasswordForm
                        change={PasswordChange::Reset { token: (*token).clone() }}
                        {on_updated}
                    />
                }
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_decode_from_either_alphabet() {
        assert_eq!(decode_reset_token(&STANDARD.encode("tok+/en")), "tok+/en");
        assert_eq!(
            decode_reset_token(&URL_SAFE_NO_PAD.encode("tok?en>>")),
            "tok?en>>"
        );
    }

    #[test]
    fn undecodable_tokens_pass_through() {
        assert_eq!(decode_reset_token("not base64!"), "not base64!");
    }
}
