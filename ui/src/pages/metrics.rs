use payloads::Role;
use yew::prelude::*;

use crate::components::{MetricsPanel, RequireRole};
use crate::hooks::use_title;

#[function_component]
pub fn MetricsPage() -> Html {
    use_title("Metrics");

    html! {
        <RequireRole min_role={Role::Admin}>
            <MetricsPanel detailed=true />
        </RequireRole>
    }
}
