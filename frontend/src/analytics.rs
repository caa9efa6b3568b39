use log::error;
use std::cmp::Ordering;
use std::collections::HashMap;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api;
use crate::format::{capitalize_first_letters, format_currency};

/// Per-store and per-category spending totals computed by the backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpendingAnalytics {
    pub store_totals: HashMap<String, f64>,
    pub category_totals: HashMap<String, f64>,
}

/// Totals ranked largest first, ties broken by name.
pub fn sorted_totals(totals: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = totals
        .iter()
        .map(|(name, total)| (name.clone(), *total))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}

pub fn share_of(total: f64, grand_total: f64) -> f64 {
    if grand_total > 0.0 {
        (total / grand_total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Properties, PartialEq)]
struct SpendingChartProps {
    title: &'static str,
    totals: Vec<(String, f64)>,
}

#[function_component(SpendingChart)]
fn spending_chart(props: &SpendingChartProps) -> Html {
    let grand_total: f64 = props.totals.iter().map(|(_, total)| total).sum();

    html! {
        <div class="bg-card rounded-lg p-6 border border-border space-y-4">
            <div class="flex items-center justify-between">
                <h3 class="text-lg font-bold text-foreground">{ props.title }</h3>
                <span class="text-sm text-muted-foreground">{ format_currency(grand_total) }</span>
            </div>
            if props.totals.is_empty() {
                <p class="text-sm text-muted-foreground">{"No spending recorded yet."}</p>
            }
            { for props.totals.iter().map(|(name, total)| {
                let percent = share_of(*total, grand_total) * 100.0;
                html! {
                    <div class="space-y-1">
                        <div class="flex justify-between text-sm">
                            <span class="text-foreground">{ capitalize_first_letters(name) }</span>
                            <span class="font-semibold text-foreground">{ format_currency(*total) }</span>
                        </div>
                        <div class="h-2 bg-secondary rounded-full overflow-hidden">
                            <div class="h-full bg-primary" style={format!("width: {:.1}%", percent)}></div>
                        </div>
                    </div>
                }
            }) }
        </div>
    }
}

#[function_component(AnalyticsPage)]
pub fn analytics_page() -> Html {
    let analytics = use_state(SpendingAnalytics::default);
    let loading = use_state(|| true);
    let failed = use_state(|| None::<String>);

    {
        let analytics = analytics.clone();
        let loading = loading.clone();
        let failed = failed.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    match api::compute_analytics().await {
                        Ok(result) => analytics.set(result),
                        Err(err) => {
                            error!("loading analytics failed: {err}");
                            failed.set(Some(err.user_message()));
                        }
                    }
                    loading.set(false);
                });
                || ()
            },
            (),
        );
    }

    if *loading {
        return html! { <p class="text-muted-foreground">{"Loading..."}</p> };
    }

    if let Some(message) = &*failed {
        return html! { <p class="text-sm text-red-500">{ message.clone() }</p> };
    }

    html! {
        <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
            <SpendingChart title="Spending habits by store" totals={sorted_totals(&analytics.store_totals)} />
            <SpendingChart title="Spending habits by category" totals={sorted_totals(&analytics.category_totals)} />
        </div>
    }
}
