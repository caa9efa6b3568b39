use log::{error, info};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api;
use crate::config::{INDEX_PAGE, LOGIN_PAGE};
use crate::dom;
use crate::error::AppError;
use crate::models::Account;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GateOutcome {
    /// Logged in: show the page.
    Reveal,
    RedirectToLogin,
    /// Status unknown. The page stays hidden rather than failing open.
    StayHidden,
}

pub fn gate_outcome(status: Result<&Account, &AppError>) -> GateOutcome {
    match status {
        Ok(account) if account.logged_in => GateOutcome::Reveal,
        Ok(_) => GateOutcome::RedirectToLogin,
        Err(_) => GateOutcome::StayHidden,
    }
}

#[derive(Properties, PartialEq)]
pub struct AuthGateProps {
    pub children: Children,
    /// Receives the account before the children are shown.
    #[prop_or_default]
    pub on_account: Option<Callback<Account>>,
}

/// Renders its children only once the backend confirms a logged-in user.
#[function_component(AuthGate)]
pub fn auth_gate(props: &AuthGateProps) -> Html {
    let revealed = use_state(|| false);

    {
        let revealed = revealed.clone();
        let on_account = props.on_account.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    match api::fetch_login_status().await {
                        Ok(account) if gate_outcome(Ok(&account)) == GateOutcome::Reveal => {
                            if let Some(on_account) = on_account {
                                on_account.emit(account);
                            }
                            revealed.set(true);
                        }
                        Ok(_) => {
                            info!("not logged in, redirecting to {LOGIN_PAGE}");
                            dom::redirect(LOGIN_PAGE);
                        }
                        Err(err) => {
                            error!("login status check failed: {err}");
                            dom::alert(&err.user_message());
                        }
                    }
                });
                || ()
            },
            (),
        );
    }

    if !*revealed {
        return html! { <div class="hidden"></div> };
    }

    html! { <>{ for props.children.iter() }</> }
}

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let login_url = use_state(|| None::<String>);

    {
        let login_url = login_url.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    match api::fetch_login_status().await {
                        Ok(account) if account.logged_in => dom::redirect(INDEX_PAGE),
                        Ok(account) => login_url.set(Some(account.login_url.unwrap_or_default())),
                        Err(err) => {
                            error!("login status check failed: {err}");
                            dom::alert(&err.user_message());
                        }
                    }
                });
                || ()
            },
            (),
        );
    }

    let Some(url) = (*login_url).clone() else {
        return html! { <div class="hidden"></div> };
    };

    html! {
        <div class="min-h-screen flex items-center justify-center bg-background">
            <div class="w-full max-w-md bg-card border border-border rounded-2xl shadow-lg p-8 text-center">
                <h1 class="text-2xl font-bold text-foreground">{"Receipt Tracker"}</h1>
                <p class="text-sm text-muted-foreground mt-2">
                    {"Upload receipt photos and keep track of where your money goes."}
                </p>
                <a
                    id="login-link"
                    href={url}
                    class="mt-6 inline-block w-full bg-primary text-primary-foreground py-2 rounded-lg font-semibold hover:opacity-90 transition-opacity"
                >
                    {"Sign in"}
                </a>
            </div>
        </div>
    }
}
