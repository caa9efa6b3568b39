//! Receipt analysis page: review and correct what the backend extracted.

use chrono_tz::Tz;
use log::{error, info, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, InputEvent};
use yew::prelude::*;

use crate::api;
use crate::config::INDEX_PAGE;
use crate::dom::{self, UnsavedChangesGuard};
use crate::error::AppError;
use crate::format::{
    browser_time_zone, capitalize_first_letters, convert_string_to_number,
    date_input_to_timestamp, format_currency, format_iso_date, format_price, join_categories,
    resolve_time_zone, sanitize, split_categories,
};
use crate::models::Receipt;
use crate::receipt_link::{self, analysis_url, encode_pairs};

const UNSAVED_WARNING: &str = "You have unsaved changes. Are you sure you want to leave?";

/// Raw form values as shown in the inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditForm {
    /// `YYYY-MM-DD`
    pub date: String,
    pub store: String,
    pub price: String,
    /// Comma separated.
    pub categories: String,
}

#[derive(Debug, PartialEq)]
struct NormalizedForm {
    date: String,
    store: String,
    price: Option<f64>,
    categories: String,
}

impl EditForm {
    /// Fields the backend could not extract start out empty.
    pub fn from_receipt(receipt: &Receipt, time_zone: Tz) -> Self {
        Self {
            date: receipt
                .timestamp
                .map(|ts| format_iso_date(ts, time_zone))
                .unwrap_or_default(),
            store: capitalize_first_letters(&receipt.store),
            price: receipt.price.map(format_price).unwrap_or_default(),
            categories: join_categories(&receipt.categories),
        }
    }

    fn normalized(&self) -> NormalizedForm {
        let categories: Vec<String> = split_categories(&self.categories)
            .iter()
            .map(|category| sanitize(category))
            .collect();
        NormalizedForm {
            date: self.date.trim().to_string(),
            store: sanitize(&self.store),
            price: convert_string_to_number(&self.price).map(|price| (price * 100.0).round() / 100.0),
            categories: join_categories(&categories),
        }
    }

    /// Query string for `POST /edit-receipt`.
    pub fn to_edit_query(&self, id: &str, time_zone: Tz) -> Result<String, AppError> {
        let store = self.store.trim();
        if store.is_empty() {
            return Err(AppError::Validation("Please enter a store name.".to_string()));
        }
        let price = convert_string_to_number(&self.price)
            .filter(|price| *price >= 0.0)
            .ok_or_else(|| AppError::Validation("Please enter a valid, positive price.".to_string()))?;
        let timestamp = date_input_to_timestamp(&self.date, time_zone)
            .ok_or_else(|| AppError::Validation("Please enter a valid transaction date.".to_string()))?;
        let categories = split_categories(&self.categories);
        if categories.is_empty() {
            return Err(AppError::Validation("Please enter at least one category.".to_string()));
        }

        let mut pairs = vec![
            ("id", id.to_string()),
            ("store", store.to_string()),
            ("price", format_price(price)),
            ("date", timestamp.to_string()),
        ];
        pairs.extend(categories.into_iter().map(|category| ("categories", category)));
        Ok(encode_pairs(pairs))
    }
}

/// Whether leaving the page would lose edits.
pub fn is_dirty(original: &EditForm, current: &EditForm) -> bool {
    original.normalized() != current.normalized()
}

#[function_component(ReceiptAnalysisPage)]
pub fn receipt_analysis_page() -> Html {
    let time_zone = use_state(|| resolve_time_zone(&browser_time_zone()));
    let loaded = use_state(|| {
        receipt_link::from_query(&dom::current_search()).map_err(|err| {
            warn!("could not read receipt from page address: {err}");
            err.user_message()
        })
    });

    match &*loaded {
        Ok(receipt) => html! { <EditReceiptForm receipt={receipt.clone()} time_zone={*time_zone} /> },
        Err(message) => html! {
            <div class="bg-card p-8 rounded-[10px] border border-border text-center space-y-4">
                <p class="text-muted-foreground">{ message.clone() }</p>
                <a href={INDEX_PAGE} class="text-primary font-semibold">{"Back to receipts"}</a>
            </div>
        },
    }
}

#[derive(Properties, PartialEq)]
struct EditReceiptFormProps {
    receipt: Receipt,
    time_zone: Tz,
}

#[function_component(EditReceiptForm)]
fn edit_receipt_form(props: &EditReceiptFormProps) -> Html {
    let time_zone = props.time_zone;
    let receipt = use_state(|| props.receipt.clone());
    let original = use_state(|| EditForm::from_receipt(&props.receipt, time_zone));
    let form = use_state(|| EditForm::from_receipt(&props.receipt, time_zone));
    let saving = use_state(|| false);

    let dirty = is_dirty(&original, &form);
    use_effect_with_deps(
        |dirty: &bool| {
            let guard = if *dirty {
                UnsavedChangesGuard::install(UNSAVED_WARNING)
            } else {
                None
            };
            move || drop(guard)
        },
        dirty,
    );

    let on_submit = {
        let receipt = receipt.clone();
        let original = original.clone();
        let form = form.clone();
        let saving = saving.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let query = match form.to_edit_query(&receipt.id, time_zone) {
                Ok(query) => query,
                Err(err) => {
                    dom::alert(&err.user_message());
                    return;
                }
            };

            saving.set(true);
            let receipt = receipt.clone();
            let original = original.clone();
            let form = form.clone();
            let saving = saving.clone();
            spawn_local(async move {
                match api::edit_receipt(&query).await {
                    Ok(stored) => {
                        // Repopulate from what the server stored, not what was typed.
                        let updated = stored.into_receipt();
                        info!("receipt {} updated", updated.id);
                        let fresh = EditForm::from_receipt(&updated, time_zone);
                        original.set(fresh.clone());
                        form.set(fresh);
                        if let Err(err) = dom::replace_url(&analysis_url(&updated)) {
                            error!("could not update page address: {err}");
                        }
                        receipt.set(updated);
                    }
                    Err(err) => {
                        error!("saving receipt failed: {err}");
                        dom::alert(&err.user_message());
                    }
                }
                saving.set(false);
            });
        })
    };

    let update_field = |apply: fn(&mut EditForm, String)| {
        let form = form.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*form).clone();
            apply(&mut next, input.value());
            form.set(next);
        })
    };

    let on_cancel = Callback::from(|_| dom::navigate(INDEX_PAGE));

    let chips: Vec<String> = split_categories(&form.categories)
        .iter()
        .take(3)
        .map(|category| capitalize_first_letters(category))
        .collect();
    let total = convert_string_to_number(&form.price)
        .map(format_currency)
        .unwrap_or_default();

    html! {
        <div class="grid grid-cols-1 lg:grid-cols-12 gap-6">
            <div class="lg:col-span-5 bg-card rounded-[10px] border border-border overflow-hidden">
                <img id="receipt-image" src={receipt.image_url.clone()} alt="Receipt" class="w-full object-contain" />
            </div>

            <form class="lg:col-span-7 bg-card p-6 rounded-[10px] shadow-sm border border-border space-y-4" onsubmit={on_submit}>
                <div class="space-y-1">
                    <label class="text-sm font-medium text-foreground">{"Transaction date"}</label>
                    <input type="date" class="w-full px-4 py-2 bg-input border border-input rounded-lg"
                        value={form.date.clone()} disabled={*saving}
                        oninput={update_field(|f, v| f.date = v)} />
                </div>
                <div class="space-y-1">
                    <label class="text-sm font-medium text-foreground">{"Store"}</label>
                    <input id="store-input" type="text" class="w-full px-4 py-2 bg-input border border-input rounded-lg"
                        value={form.store.clone()} disabled={*saving}
                        oninput={update_field(|f, v| f.store = v)} />
                </div>
                <div class="space-y-1">
                    <label class="text-sm font-medium text-foreground">{"Total price"}</label>
                    <input type="text" inputmode="decimal" class="w-full px-4 py-2 bg-input border border-input rounded-lg"
                        value={form.price.clone()} disabled={*saving}
                        oninput={update_field(|f, v| f.price = v)} />
                    <p class="text-xs text-muted-foreground">{ total }</p>
                </div>
                <div class="space-y-1">
                    <label class="text-sm font-medium text-foreground">{"Categories (comma separated)"}</label>
                    <input type="text" class="w-full px-4 py-2 bg-input border border-input rounded-lg"
                        value={form.categories.clone()} disabled={*saving}
                        oninput={update_field(|f, v| f.categories = v)} />
                    <div id="categories-container" class="flex flex-wrap gap-2 pt-1">
                        { for chips.iter().map(|chip| html! {
                            <span class="px-2 py-1 rounded-full bg-secondary text-xs text-secondary-foreground">{ chip.clone() }</span>
                        }) }
                    </div>
                </div>

                if dirty {
                    <p class="text-xs text-amber-600">{"You have unsaved changes."}</p>
                }

                <div class="flex gap-3">
                    <button type="submit" class="flex-1 bg-primary text-primary-foreground py-2 rounded-lg font-semibold" disabled={*saving}>
                        { if *saving { "Saving..." } else { "Save changes" } }
                    </button>
                    <button type="button" class="px-4 py-2 rounded-lg border border-border" onclick={on_cancel}>
                        {"Back"}
                    </button>
                </div>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> Receipt {
        Receipt {
            id: "42".to_string(),
            timestamp: Some(1_590_901_200_000),
            store: "whole foods".to_string(),
            price: Some(1234.5),
            categories: vec!["food".to_string(), "gas".to_string(), "travel".to_string()],
            image_url: "/serve-image?blob-key=k".to_string(),
        }
    }

    fn chicago() -> Tz {
        chrono_tz::America::Chicago
    }

    #[test]
    fn form_is_populated_from_receipt() {
        let form = EditForm::from_receipt(&receipt(), chicago());
        assert_eq!(form.date, "2020-05-31");
        assert_eq!(form.store, "Whole Foods");
        assert_eq!(form.price, "1234.50");
        assert_eq!(form.categories, "food,gas,travel");
    }

    #[test]
    fn missing_date_and_total_leave_the_inputs_empty() {
        let partial = Receipt {
            timestamp: None,
            price: None,
            ..receipt()
        };
        let form = EditForm::from_receipt(&partial, chicago());
        assert_eq!(form.date, "");
        assert_eq!(form.price, "");
        assert_eq!(form.store, "Whole Foods");
        assert!(matches!(
            form.to_edit_query("42", chicago()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn freshly_loaded_form_is_clean() {
        let form = EditForm::from_receipt(&receipt(), chicago());
        assert!(!is_dirty(&form, &form.clone()));
    }

    #[test]
    fn cosmetic_differences_are_not_changes() {
        let original = EditForm::from_receipt(&receipt(), chicago());
        let current = EditForm {
            price: "$1,234.50".to_string(),
            categories: " Food, gas ,Travel".to_string(),
            store: "whole   FOODS".to_string(),
            ..original.clone()
        };
        assert!(!is_dirty(&original, &current));
    }

    #[test]
    fn real_edits_are_changes() {
        let original = EditForm::from_receipt(&receipt(), chicago());
        for current in [
            EditForm { price: "12.00".to_string(), ..original.clone() },
            EditForm { store: "target".to_string(), ..original.clone() },
            EditForm { categories: "food,gas".to_string(), ..original.clone() },
            EditForm { date: "2020-06-01".to_string(), ..original.clone() },
        ] {
            assert!(is_dirty(&original, &current), "{current:?}");
        }
    }

    #[test]
    fn edit_query_carries_every_field() {
        let form = EditForm {
            date: "2020-05-31".to_string(),
            store: " Whole Foods ".to_string(),
            price: "$1,234.5".to_string(),
            categories: "food, date night".to_string(),
        };
        assert_eq!(
            form.to_edit_query("42", chicago()).unwrap(),
            "id=42&store=Whole%20Foods&price=1234.50&date=1590901200000\
             &categories=food&categories=date%20night"
        );
    }

    #[test]
    fn invalid_fields_never_reach_the_server() {
        let good = EditForm::from_receipt(&receipt(), chicago());
        for bad in [
            EditForm { store: "  ".to_string(), ..good.clone() },
            EditForm { price: "lots".to_string(), ..good.clone() },
            EditForm { price: "-3".to_string(), ..good.clone() },
            EditForm { date: "".to_string(), ..good.clone() },
            EditForm { categories: " , ".to_string(), ..good.clone() },
        ] {
            assert!(matches!(
                bad.to_edit_query("42", chicago()),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn server_state_round_trips_through_the_form() {
        let saved = receipt();
        let form = EditForm::from_receipt(&saved, chicago());
        let query = form.to_edit_query(&saved.id, chicago()).unwrap();
        assert!(query.contains("date=1590901200000"));
        assert!(query.contains("price=1234.50"));
    }
}
