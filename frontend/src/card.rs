use chrono_tz::Tz;
use log::{error, info};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api;
use crate::dom;
use crate::format::{capitalize_first_letters, format_currency, format_date};
use crate::models::Receipt;
use crate::receipt_link::analysis_url;

const MAX_CATEGORY_CHIPS: usize = 3;

/// Display-ready fields of a receipt card.
#[derive(Clone, Debug, PartialEq)]
pub struct CardView {
    pub date: String,
    pub store: String,
    pub total: String,
    pub categories: Vec<String>,
    pub image_url: String,
}

impl CardView {
    pub fn from_receipt(receipt: &Receipt, time_zone: Tz) -> Self {
        Self {
            date: receipt
                .timestamp
                .map(|ts| format_date(ts, time_zone))
                .unwrap_or_default(),
            store: capitalize_first_letters(&receipt.store),
            total: match receipt.price {
                Some(price) => format!("Total: {}", format_currency(price)),
                None => "Total: unknown".to_string(),
            },
            categories: receipt
                .categories
                .iter()
                .take(MAX_CATEGORY_CHIPS)
                .map(|category| capitalize_first_letters(category))
                .collect(),
            image_url: receipt.image_url.clone(),
        }
    }
}

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this receipt?";

/// Id to send to the server, or `None` when the user backed out and nothing
/// may be sent or removed.
pub fn delete_target(receipt: &Receipt, confirmed: bool) -> Option<String> {
    confirmed.then(|| receipt.id.clone())
}

#[derive(Properties, PartialEq)]
pub struct ReceiptCardProps {
    pub receipt: Receipt,
    pub time_zone: Tz,
    /// Fired with the receipt id once the server has answered the delete.
    pub on_deleted: Callback<String>,
}

#[function_component(ReceiptCard)]
pub fn receipt_card(props: &ReceiptCardProps) -> Html {
    let view = CardView::from_receipt(&props.receipt, props.time_zone);
    let deleting = use_state(|| false);

    // Both handlers capture this card's receipt, never a looked-up node.
    let on_delete = {
        let receipt = props.receipt.clone();
        let on_deleted = props.on_deleted.clone();
        let deleting = deleting.clone();
        Callback::from(move |_| {
            let Some(id) = delete_target(&receipt, dom::confirm(DELETE_PROMPT)) else {
                return;
            };
            let on_deleted = on_deleted.clone();
            let deleting = deleting.clone();
            deleting.set(true);
            spawn_local(async move {
                match api::delete_receipt(&id).await {
                    Ok(status) => {
                        info!("receipt {id} removed from view (server status {status})");
                        on_deleted.emit(id);
                    }
                    Err(err) => {
                        error!("delete of receipt {id} failed: {err}");
                        deleting.set(false);
                        dom::alert(&err.user_message());
                    }
                }
            });
        })
    };

    let on_edit = {
        let receipt = props.receipt.clone();
        Callback::from(move |_| dom::navigate(&analysis_url(&receipt)))
    };

    html! {
        <div id={props.receipt.id.clone()} class="bg-card rounded-[10px] shadow-sm border border-border overflow-hidden flex flex-col">
            <img src={view.image_url.clone()} alt="Receipt" class="w-full h-48 object-cover bg-muted" />
            <div class="p-5 flex-1 flex flex-col gap-2">
                <p class="text-xs text-muted-foreground">{ view.date.clone() }</p>
                <h3 class="text-lg font-bold text-foreground">{ view.store.clone() }</h3>
                <p class="text-sm font-semibold text-[#1D617A]">{ view.total.clone() }</p>
                <div class="flex flex-wrap gap-2">
                    { for view.categories.iter().map(|category| html! {
                        <span class="px-2 py-1 rounded-full bg-secondary text-xs text-secondary-foreground">{ category.clone() }</span>
                    }) }
                </div>
                <div class="mt-auto pt-3 flex gap-2">
                    <button type="button" class="px-3 py-1.5 rounded-lg border border-border text-sm" onclick={on_edit}>
                        {"Edit"}
                    </button>
                    <button type="button" class="px-3 py-1.5 rounded-lg bg-red-500 text-white text-sm" disabled={*deleting} onclick={on_delete}>
                        { if *deleting { "Deleting..." } else { "Delete" } }
                    </button>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt_with(categories: &[&str]) -> Receipt {
        Receipt {
            id: "9".to_string(),
            timestamp: Some(1_590_980_400_000),
            store: "whole foods market".to_string(),
            price: Some(1234.5),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            image_url: "/serve-image?blob-key=k".to_string(),
        }
    }

    #[test]
    fn at_most_three_chips_in_server_order() {
        let receipt = receipt_with(&["fast food", "lunch", "work", "travel", "misc"]);
        let view = CardView::from_receipt(&receipt, Tz::UTC);
        assert_eq!(view.categories, vec!["Fast Food", "Lunch", "Work"]);
    }

    #[test]
    fn fewer_categories_are_shown_as_is() {
        let view = CardView::from_receipt(&receipt_with(&["gas"]), Tz::UTC);
        assert_eq!(view.categories, vec!["Gas"]);
        let view = CardView::from_receipt(&receipt_with(&[]), Tz::UTC);
        assert!(view.categories.is_empty());
    }

    #[test]
    fn formats_store_total_and_date() {
        let view = CardView::from_receipt(&receipt_with(&["food"]), chrono_tz::America::Chicago);
        assert_eq!(view.store, "Whole Foods Market");
        assert_eq!(view.total, "Total: $1,234.50");
        assert_eq!(view.date, "May 31, 2020");
        assert_eq!(view.image_url, "/serve-image?blob-key=k");
    }

    #[test]
    fn cancelled_delete_targets_nothing() {
        assert_eq!(delete_target(&receipt_with(&[]), false), None);
    }

    #[test]
    fn confirmed_delete_targets_this_card() {
        assert_eq!(delete_target(&receipt_with(&[]), true).as_deref(), Some("9"));
    }

    #[test]
    fn unextracted_date_and_total_render_blank() {
        let receipt = Receipt {
            timestamp: None,
            price: None,
            ..receipt_with(&["food"])
        };
        let view = CardView::from_receipt(&receipt, Tz::UTC);
        assert_eq!(view.date, "");
        assert_eq!(view.total, "Total: unknown");
    }
}
