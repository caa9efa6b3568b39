mod analytics;
mod api;
mod auth;
mod card;
mod config;
mod display;
mod dom;
mod edit;
mod error;
mod format;
mod models;
mod receipt_link;
mod search;
mod upload;

use yew::prelude::*;

use analytics::AnalyticsPage;
use auth::{AuthGate, LoginPage};
use config::{config, ANALYSIS_PAGE, ANALYTICS_PAGE, INDEX_PAGE, LOGIN_PAGE, UPLOAD_PAGE};
use edit::ReceiptAnalysisPage;
use models::Account;
use search::ReceiptsPage;
use upload::UploadPage;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Page {
    Receipts,
    Upload,
    ReceiptAnalysis,
    Analytics,
    Login,
}

impl Page {
    /// Every HTML page loads the same bundle; the path picks what to render.
    fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            p if p == UPLOAD_PAGE => Page::Upload,
            p if p == ANALYSIS_PAGE => Page::ReceiptAnalysis,
            p if p == ANALYTICS_PAGE => Page::Analytics,
            p if p == LOGIN_PAGE => Page::Login,
            _ => Page::Receipts,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Page::Receipts => "Receipts",
            Page::Upload => "Upload Receipt",
            Page::ReceiptAnalysis => "Receipt Analysis",
            Page::Analytics => "Spending Analytics",
            Page::Login => "Sign In",
        }
    }
}

#[derive(Properties, PartialEq)]
struct LayoutProps {
    children: Children,
    active_page: Page,
    account: Option<Account>,
}

#[function_component(Layout)]
fn layout(props: &LayoutProps) -> Html {
    html! {
        <div class="flex h-screen bg-background">
            <div class="hidden md:flex">
                <Sidebar active_page={props.active_page} account={props.account.clone()} />
            </div>

            <div class="flex-1 flex flex-col overflow-hidden">
                <Header account={props.account.clone()} />
                <main class="flex-1 overflow-y-auto">
                    { for props.children.iter() }
                </main>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct HeaderProps {
    account: Option<Account>,
}

#[function_component(Header)]
fn header(props: &HeaderProps) -> Html {
    let email = props
        .account
        .as_ref()
        .and_then(|account| account.email.clone())
        .unwrap_or_default();

    html! {
        <header class="bg-[#D8E1E8] border-b border-border h-16 flex items-center justify-between px-6">
            <div class="flex-1"></div>
            <span class="text-sm text-[#173E63] font-medium">{ email }</span>
        </header>
    }
}

struct NavItem {
    label: &'static str,
    page: Page,
    href: &'static str,
    icon: fn() -> Html,
}

#[derive(Properties, PartialEq)]
struct SidebarProps {
    active_page: Page,
    account: Option<Account>,
}

#[function_component(Sidebar)]
fn sidebar(props: &SidebarProps) -> Html {
    let nav_items = vec![
        NavItem {
            label: "Receipts",
            page: Page::Receipts,
            href: INDEX_PAGE,
            icon: icon_layout_grid,
        },
        NavItem {
            label: "Upload Receipt",
            page: Page::Upload,
            href: UPLOAD_PAGE,
            icon: icon_plus,
        },
        NavItem {
            label: "Spending Analytics",
            page: Page::Analytics,
            href: ANALYTICS_PAGE,
            icon: icon_bar_chart,
        },
    ];

    let logout_url = props
        .account
        .as_ref()
        .and_then(|account| account.logout_url.clone())
        .unwrap_or_else(|| LOGIN_PAGE.to_string());

    html! {
        <div class="w-[220px] h-screen bg-[#D8E1E8] p-4 flex flex-col">
            <div class="flex items-center gap-3 px-2 mb-8">
                <div class="w-12 h-12 bg-[#173E63] rounded-full flex items-center justify-center text-white">
                    { icon_receipt() }
                </div>
                <span class="text-[#173E63] text-xl font-black tracking-tight">{"Receipts"}</span>
            </div>

            <div class="flex-1 bg-[#173E63] rounded-[24px] flex flex-col py-6 px-3 shadow-lg">
                <nav class="flex-1 space-y-2">
                    { for nav_items.iter().map(|item| {
                        let is_active = item.page == props.active_page;
                        let class_name = if is_active {
                            "flex items-center gap-3 px-4 py-3 rounded-xl transition-all text-[13px] font-medium bg-[#B2CBDE] text-[#173E63] w-full"
                        } else {
                            "flex items-center gap-3 px-4 py-3 rounded-xl transition-all text-[13px] font-medium text-slate-300 hover:bg-white/5 hover:text-white w-full"
                        };

                        html! {
                            <a href={item.href} class={class_name}>
                                <span class="shrink-0">{ (item.icon)() }</span>
                                <span class="truncate whitespace-nowrap text-left">{ item.label }</span>
                            </a>
                        }
                    }) }
                </nav>

                <div class="mt-auto pt-4">
                    <a href={logout_url} class="flex items-center gap-3 w-full px-4 py-3 rounded-xl hover:bg-white/10 transition-colors text-[13px] font-medium text-slate-300">
                        { icon_log_out() }
                        <span>{"Log Out"}</span>
                    </a>
                </div>
            </div>
        </div>
    }
}

fn page_shell(title: &'static str, actions: Html, children: Html) -> Html {
    html! {
        <div class="p-6 max-w-7xl mx-auto">
            <div class="flex items-center justify-between pb-4 border-b border-border">
                <h1 class="text-2xl font-bold text-foreground">{ title }</h1>
                { actions }
            </div>
            <div class="pt-5 space-y-6">
                { children }
            </div>
        </div>
    }
}

#[function_component(App)]
fn app() -> Html {
    let page = Page::from_path(&dom::current_path());
    let account = use_state(|| None::<Account>);

    if page == Page::Login {
        return html! { <LoginPage /> };
    }

    let on_account = {
        let account = account.clone();
        Callback::from(move |fetched: Account| account.set(Some(fetched)))
    };

    let actions = if page == Page::Receipts {
        html! {
            <a href={UPLOAD_PAGE} class="flex items-center gap-2 px-4 py-2 rounded-lg bg-primary text-primary-foreground text-sm font-semibold">
                { icon_plus() }
                {"Upload receipt"}
            </a>
        }
    } else {
        html! {}
    };

    let content = match page {
        Page::Receipts => html! { <ReceiptsPage /> },
        Page::Upload => html! { <UploadPage /> },
        Page::ReceiptAnalysis => html! { <ReceiptAnalysisPage /> },
        Page::Analytics => html! { <AnalyticsPage /> },
        Page::Login => html! { <LoginPage /> },
    };

    html! {
        <AuthGate on_account={on_account}>
            <Layout active_page={page} account={(*account).clone()}>
                { page_shell(page.title(), actions, content) }
            </Layout>
        </AuthGate>
    }
}

fn icon_base(path: &'static str) -> Html {
    html! {
        <svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="text-foreground">
            <path d={path}></path>
        </svg>
    }
}

fn icon_layout_grid() -> Html {
    icon_base("M3 3h8v8H3zM13 3h8v8h-8zM3 13h8v8H3zM13 13h8v8h-8z")
}
fn icon_receipt() -> Html {
    icon_base("M5 3h14v18l-3-2-2 2-2-2-2 2-2-2-3 2zM9 8h6M9 12h6")
}
fn icon_bar_chart() -> Html {
    icon_base("M4 20V10M10 20V4M16 20v-6M22 20H2")
}
fn icon_log_out() -> Html {
    icon_base("M9 21H5a2 2 0 01-2-2V5a2 2 0 012-2h4M16 17l5-5-5-5M21 12H9")
}
fn icon_plus() -> Html {
    icon_base("M12 5v14M5 12h14")
}

fn main() {
    wasm_logger::init(wasm_logger::Config::new(config().log_level));
    log::info!("receipt tracker frontend starting");
    yew::Renderer::<App>::new().render();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_select_pages() {
        assert_eq!(Page::from_path("/"), Page::Receipts);
        assert_eq!(Page::from_path(""), Page::Receipts);
        assert_eq!(Page::from_path("/index.html"), Page::Receipts);
        assert_eq!(Page::from_path("/upload.html"), Page::Upload);
        assert_eq!(Page::from_path("/receipt-analysis.html"), Page::ReceiptAnalysis);
        assert_eq!(Page::from_path("/analytics.html"), Page::Analytics);
        assert_eq!(Page::from_path("/login.html"), Page::Login);
    }

    #[test]
    fn unknown_paths_fall_back_to_receipts() {
        assert_eq!(Page::from_path("/nope.html"), Page::Receipts);
    }
}
