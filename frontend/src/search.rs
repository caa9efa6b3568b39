//! Search, filter and paginate controller for the receipts page.
//!
//! Pagination rides on an opaque cursor issued by the backend. The page keeps
//! exactly one cursor, the latest one returned, inside an explicit
//! [`PageState`] rather than module-level globals.

use chrono::NaiveDate;
use log::{debug, error};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement, InputEvent};
use yew::prelude::*;

use crate::api;
use crate::display::{DisplayAction, ResultsDisplay, ResultsView};
use crate::dom;
use crate::error::AppError;
use crate::format::{browser_time_zone, date_input_to_long_date, resolve_time_zone};
use crate::models::{Receipt, SearchPage};
use crate::receipt_link::encode_pairs;

pub const CATEGORY_OPTIONS: &[&str] = &[
    "groceries",
    "restaurants",
    "gas",
    "travel",
    "entertainment",
    "shopping",
    "health",
    "utilities",
];

/// Structured filters as typed into the search form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchFilters {
    pub category: String,
    pub store: String,
    pub min_price: String,
    pub max_price: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
    pub time_zone_id: String,
}

impl SearchFilters {
    /// A date range needs both ends, in order.
    pub fn validate(&self) -> Result<(), AppError> {
        let start = self.start_date.trim();
        let end = self.end_date.trim();
        if start.is_empty() && end.is_empty() {
            return Ok(());
        }
        let parse = |date: &str| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
        let (Some(start), Some(end)) = (parse(start), parse(end)) else {
            return Err(AppError::Validation(
                "Please enter both a start and an end date.".to_string(),
            ));
        };
        if start > end {
            return Err(AppError::Validation(
                "The start date must not be after the end date.".to_string(),
            ));
        }
        Ok(())
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: &str| {
            let value = value.trim();
            if !value.is_empty() {
                pairs.push((key, value.to_string()));
            }
        };
        push("category", &self.category);
        push("store", &self.store);
        push("min", &self.min_price);
        push("max", &self.max_price);
        if let (Some(start), Some(end)) = (
            date_input_to_long_date(&self.start_date),
            date_input_to_long_date(&self.end_date),
        ) {
            push("dateRange", &format!("{start} - {end}"));
        }
        push("timeZoneId", &self.time_zone_id);
        pairs
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchCriteria {
    /// Free-text search box.
    Label(String),
    Filters(SearchFilters),
}

impl SearchCriteria {
    pub fn label(&self) -> Option<&str> {
        match self {
            SearchCriteria::Label(label) => Some(label.as_str()),
            SearchCriteria::Filters(_) => None,
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            SearchCriteria::Label(label) => vec![("label", label.trim().to_string())],
            SearchCriteria::Filters(filters) => filters.query_pairs(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageDirective {
    /// First fetch when the page opens; no filters are sent.
    PageLoad,
    NewSearch,
    NextPage,
    PreviousPage,
}

pub fn build_query(
    directive: PageDirective,
    criteria: &SearchCriteria,
    cursor: Option<&str>,
) -> String {
    if directive == PageDirective::PageLoad {
        return encode_pairs([("isPageLoad", "true".to_string())]);
    }

    let mut pairs = criteria.query_pairs();
    match directive {
        PageDirective::NewSearch => pairs.push(("isNewSearch", "true".to_string())),
        PageDirective::NextPage | PageDirective::PreviousPage => {
            let flag = if directive == PageDirective::NextPage {
                "getNextPage"
            } else {
                "getPreviousPage"
            };
            pairs.push(("isNewSearch", "false".to_string()));
            pairs.push((flag, "true".to_string()));
            // No cursor yet: the parameter is simply left out.
            if let Some(cursor) = cursor {
                pairs.push(("encodedCursor", cursor.to_string()));
            }
        }
        PageDirective::PageLoad => {}
    }
    encode_pairs(pairs)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub label: Option<String>,
    generation: u64,
}

/// Pagination state owned by the page and threaded through each request.
#[derive(Clone, Debug, PartialEq)]
pub struct PageState {
    pub cursor: Option<String>,
    pub is_first_load: bool,
    generation: u64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            cursor: None,
            is_first_load: true,
            generation: 0,
        }
    }
}

impl PageState {
    pub fn request(&mut self, directive: PageDirective, criteria: &SearchCriteria) -> SearchRequest {
        self.generation += 1;
        SearchRequest {
            query: build_query(directive, criteria, self.cursor.as_deref()),
            label: criteria.label().map(str::to_string),
            generation: self.generation,
        }
    }

    /// Whether `request` is the most recent one sent.
    pub fn is_current(&self, request: &SearchRequest) -> bool {
        request.generation == self.generation
    }

    /// Record a response. Responses to anything but the most recent request
    /// are dropped so a slow earlier page cannot overwrite a newer one.
    pub fn accept(&mut self, request: &SearchRequest, page: SearchPage) -> Option<Vec<Receipt>> {
        if !self.is_current(request) {
            debug!(
                "dropping stale search response {} (latest is {})",
                request.generation, self.generation
            );
            return None;
        }
        self.cursor = page.cursor;
        self.is_first_load = false;
        Some(page.receipts)
    }
}

fn run_search(
    page_state: Rc<RefCell<PageState>>,
    display: UseReducerHandle<ResultsDisplay>,
    loading: UseStateHandle<bool>,
    directive: PageDirective,
    criteria: SearchCriteria,
) {
    let request = page_state.borrow_mut().request(directive, &criteria);
    loading.set(true);
    spawn_local(async move {
        match api::search_receipts(&request.query).await {
            Ok(response) => {
                let accepted = page_state
                    .borrow_mut()
                    .accept(&request, response.into_page());
                if let Some(receipts) = accepted {
                    display.dispatch(DisplayAction::Show {
                        label: request.label.clone(),
                        receipts,
                    });
                    loading.set(false);
                }
            }
            Err(err) if !page_state.borrow().is_current(&request) => {
                debug!("ignoring failure of superseded search: {err}");
            }
            Err(err) => {
                error!("search failed: {err}");
                display.dispatch(DisplayAction::Clear);
                loading.set(false);
                dom::alert(&err.user_message());
            }
        }
    });
}

fn input_value(e: InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

#[function_component(ReceiptsPage)]
pub fn receipts_page() -> Html {
    let time_zone_id = use_state(browser_time_zone);
    let time_zone = resolve_time_zone(&time_zone_id);
    let display = use_reducer(ResultsDisplay::default);
    let page_state = use_mut_ref(PageState::default);
    let criteria = use_mut_ref(|| SearchCriteria::Label(String::new()));
    let loading = use_state(|| false);

    let label = use_state(String::new);
    let filters = {
        let time_zone_id = (*time_zone_id).clone();
        use_state(move || SearchFilters {
            time_zone_id,
            ..SearchFilters::default()
        })
    };

    {
        let page_state = page_state.clone();
        let display = display.clone();
        let loading = loading.clone();
        let criteria = criteria.clone();
        use_effect_with_deps(
            move |_| {
                let current = criteria.borrow().clone();
                let directive = if page_state.borrow().is_first_load {
                    PageDirective::PageLoad
                } else {
                    PageDirective::NewSearch
                };
                run_search(page_state, display, loading, directive, current);
                || ()
            },
            (),
        );
    }

    let search_with = |directive: PageDirective| {
        let page_state = page_state.clone();
        let display = display.clone();
        let loading = loading.clone();
        let criteria = criteria.clone();
        move |next: Option<SearchCriteria>| {
            if let Some(next) = next {
                *criteria.borrow_mut() = next;
            }
            let current = criteria.borrow().clone();
            run_search(
                page_state.clone(),
                display.clone(),
                loading.clone(),
                directive,
                current,
            );
        }
    };

    let on_label_search = {
        let label = label.clone();
        let search = search_with(PageDirective::NewSearch);
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            search(Some(SearchCriteria::Label((*label).clone())));
        })
    };

    let on_filter_search = {
        let filters = filters.clone();
        let search = search_with(PageDirective::NewSearch);
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if let Err(err) = filters.validate() {
                dom::alert(&err.user_message());
                return;
            }
            search(Some(SearchCriteria::Filters((*filters).clone())));
        })
    };

    let on_next = {
        let search = search_with(PageDirective::NextPage);
        Callback::from(move |_| search(None))
    };

    let on_previous = {
        let search = search_with(PageDirective::PreviousPage);
        Callback::from(move |_| search(None))
    };

    let on_deleted = {
        let display = display.clone();
        Callback::from(move |id: String| display.dispatch(DisplayAction::Remove(id)))
    };

    let update_filter = |apply: fn(&mut SearchFilters, String)| {
        let filters = filters.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*filters).clone();
            apply(&mut next, input_value(e));
            filters.set(next);
        })
    };

    let on_category = {
        let filters = filters.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let mut next = (*filters).clone();
            next.category = select.value();
            filters.set(next);
        })
    };

    html! {
        <>
            <div class="grid grid-cols-1 lg:grid-cols-12 gap-6">
                <form class="lg:col-span-4 bg-card p-5 rounded-[10px] shadow-sm border border-border space-y-3" onsubmit={on_label_search}>
                    <h3 class="text-sm font-bold text-foreground">{"Search"}</h3>
                    <input
                        id="search-input"
                        type="text"
                        placeholder="Store, category or item"
                        class="w-full px-4 py-2 bg-input border border-input rounded-lg text-foreground"
                        value={(*label).clone()}
                        oninput={{
                            let label = label.clone();
                            Callback::from(move |e: InputEvent| label.set(input_value(e)))
                        }}
                    />
                    <button type="submit" class="w-full bg-primary text-primary-foreground py-2 rounded-lg font-semibold" disabled={*loading}>
                        {"Search"}
                    </button>
                </form>

                <form class="lg:col-span-8 bg-card p-5 rounded-[10px] shadow-sm border border-border grid grid-cols-2 md:grid-cols-3 gap-3" onsubmit={on_filter_search}>
                    <h3 class="col-span-full text-sm font-bold text-foreground">{"Filter receipts"}</h3>
                    <select class="px-3 py-2 bg-input border border-input rounded-lg" onchange={on_category}>
                        <option value="" selected={filters.category.is_empty()}>{"Any category"}</option>
                        { for CATEGORY_OPTIONS.iter().map(|option| html! {
                            <option value={*option} selected={filters.category == *option}>{ crate::format::capitalize_first_letters(option) }</option>
                        }) }
                    </select>
                    <input type="text" placeholder="Store" class="px-3 py-2 bg-input border border-input rounded-lg"
                        value={filters.store.clone()}
                        oninput={update_filter(|f, v| f.store = v)} />
                    <input type="number" min="0" step="0.01" placeholder="Min price" class="px-3 py-2 bg-input border border-input rounded-lg"
                        value={filters.min_price.clone()}
                        oninput={update_filter(|f, v| f.min_price = v)} />
                    <input type="number" min="0" step="0.01" placeholder="Max price" class="px-3 py-2 bg-input border border-input rounded-lg"
                        value={filters.max_price.clone()}
                        oninput={update_filter(|f, v| f.max_price = v)} />
                    <input type="date" class="px-3 py-2 bg-input border border-input rounded-lg"
                        value={filters.start_date.clone()}
                        oninput={update_filter(|f, v| f.start_date = v)} />
                    <input type="date" class="px-3 py-2 bg-input border border-input rounded-lg"
                        value={filters.end_date.clone()}
                        oninput={update_filter(|f, v| f.end_date = v)} />
                    <button type="submit" class="col-span-full bg-primary text-primary-foreground py-2 rounded-lg font-semibold" disabled={*loading}>
                        {"Apply filters"}
                    </button>
                </form>
            </div>

            if *loading {
                <p class="text-sm text-muted-foreground">{"Loading..."}</p>
            } else if display.card_count() > 0 {
                <p class="text-sm text-muted-foreground">{ format!("Showing {} receipts", display.card_count()) }</p>
            }

            <ResultsView display={(*display).clone()} time_zone={time_zone} on_deleted={on_deleted} />

            <div class="flex justify-between">
                <button type="button" class="px-4 py-2 rounded-lg border border-border" disabled={*loading} onclick={on_previous}>
                    {"Previous page"}
                </button>
                <button type="button" class="px-4 py-2 rounded-lg border border-border" disabled={*loading} onclick={on_next}>
                    {"Next page"}
                </button>
            </div>
        </>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters() -> SearchFilters {
        SearchFilters {
            category: " Groceries ".to_string(),
            store: "trader joe's".to_string(),
            min_price: "5".to_string(),
            max_price: "100.50".to_string(),
            start_date: "2020-05-01".to_string(),
            end_date: "2020-05-31".to_string(),
            time_zone_id: "America/Chicago".to_string(),
        }
    }

    fn page(ids: &[&str], cursor: Option<&str>) -> SearchPage {
        SearchPage {
            receipts: ids
                .iter()
                .map(|id| Receipt {
                    id: id.to_string(),
                    timestamp: Some(0),
                    store: String::new(),
                    price: Some(1.0),
                    categories: Vec::new(),
                    image_url: String::new(),
                })
                .collect(),
            cursor: cursor.map(str::to_string),
        }
    }

    #[test]
    fn page_load_omits_filters() {
        let criteria = SearchCriteria::Filters(filters());
        assert_eq!(
            build_query(PageDirective::PageLoad, &criteria, Some("abc")),
            "isPageLoad=true"
        );
    }

    #[test]
    fn new_search_sends_encoded_filters() {
        let query = build_query(PageDirective::NewSearch, &SearchCriteria::Filters(filters()), None);
        assert_eq!(
            query,
            "category=Groceries&store=trader%20joe%27s&min=5&max=100.50\
             &dateRange=May%201%2C%202020%20-%20May%2031%2C%202020\
             &timeZoneId=America%2FChicago&isNewSearch=true"
        );
    }

    #[test]
    fn empty_filters_are_left_out() {
        let criteria = SearchCriteria::Filters(SearchFilters {
            time_zone_id: "UTC".to_string(),
            ..SearchFilters::default()
        });
        assert_eq!(
            build_query(PageDirective::NewSearch, &criteria, None),
            "timeZoneId=UTC&isNewSearch=true"
        );
    }

    #[test]
    fn half_a_date_range_is_rejected() {
        let start_only = SearchFilters {
            start_date: "2020-05-01".to_string(),
            ..SearchFilters::default()
        };
        let end_only = SearchFilters {
            end_date: "2020-05-31".to_string(),
            ..SearchFilters::default()
        };
        let garbled = SearchFilters {
            end_date: "someday".to_string(),
            ..filters()
        };
        for bad in [start_only, end_only, garbled] {
            assert!(matches!(bad.validate(), Err(AppError::Validation(_))), "{bad:?}");
        }
    }

    #[test]
    fn reversed_date_range_is_rejected() {
        let reversed = SearchFilters {
            start_date: "2020-06-01".to_string(),
            end_date: "2020-05-31".to_string(),
            ..filters()
        };
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn complete_or_absent_date_range_is_accepted() {
        assert!(filters().validate().is_ok());
        assert!(SearchFilters::default().validate().is_ok());
    }

    #[test]
    fn label_search_sends_the_label() {
        let criteria = SearchCriteria::Label("coffee beans".to_string());
        assert_eq!(
            build_query(PageDirective::NewSearch, &criteria, None),
            "label=coffee%20beans&isNewSearch=true"
        );
    }

    #[test]
    fn next_and_previous_carry_the_cursor() {
        let criteria = SearchCriteria::Label("gas".to_string());
        assert_eq!(
            build_query(PageDirective::NextPage, &criteria, Some("Cj0+/=")),
            "label=gas&isNewSearch=false&getNextPage=true&encodedCursor=Cj0%2B%2F%3D"
        );
        assert_eq!(
            build_query(PageDirective::PreviousPage, &criteria, Some("xyz")),
            "label=gas&isNewSearch=false&getPreviousPage=true&encodedCursor=xyz"
        );
    }

    #[test]
    fn paging_before_any_cursor_sends_no_cursor() {
        let criteria = SearchCriteria::Label(String::new());
        let query = build_query(PageDirective::NextPage, &criteria, None);
        assert!(!query.contains("encodedCursor"));
        assert!(query.contains("getNextPage=true"));
    }

    #[test]
    fn page_state_threads_the_latest_cursor() {
        let criteria = SearchCriteria::Label(String::new());
        let mut state = PageState::default();
        assert!(state.is_first_load);

        let first = state.request(PageDirective::PageLoad, &criteria);
        let receipts = state.accept(&first, page(&["1", "2"], Some("c1"))).unwrap();
        assert_eq!(receipts.len(), 2);
        assert!(!state.is_first_load);
        assert_eq!(state.cursor.as_deref(), Some("c1"));

        let next = state.request(PageDirective::NextPage, &criteria);
        assert!(next.query.ends_with("encodedCursor=c1"));
        state.accept(&next, page(&["3"], Some("c2"))).unwrap();

        let previous = state.request(PageDirective::PreviousPage, &criteria);
        assert!(previous.query.ends_with("encodedCursor=c2"));
    }

    #[test]
    fn stale_responses_are_dropped() {
        let criteria = SearchCriteria::Label(String::new());
        let mut state = PageState::default();
        let slow = state.request(PageDirective::NewSearch, &criteria);
        let fast = state.request(PageDirective::NewSearch, &criteria);

        assert!(state.accept(&fast, page(&["new"], Some("fresh"))).is_some());
        assert!(state.accept(&slow, page(&["old"], Some("stale"))).is_none());
        assert_eq!(state.cursor.as_deref(), Some("fresh"));
    }

    #[test]
    fn only_the_latest_request_is_current() {
        let criteria = SearchCriteria::Label(String::new());
        let mut state = PageState::default();
        let older = state.request(PageDirective::NewSearch, &criteria);
        assert!(state.is_current(&older));

        let newer = state.request(PageDirective::NextPage, &criteria);
        assert!(!state.is_current(&older));
        assert!(state.is_current(&newer));

        // A late failure of the older request must not touch the newer page.
        state.accept(&newer, page(&["b"], Some("c2"))).unwrap();
        assert!(!state.is_current(&older));
        assert_eq!(state.cursor.as_deref(), Some("c2"));
    }

    #[test]
    fn requests_remember_the_label() {
        let mut state = PageState::default();
        let request = state.request(PageDirective::NewSearch, &SearchCriteria::Label("tea".to_string()));
        assert_eq!(request.label.as_deref(), Some("tea"));
        let request = state.request(PageDirective::NewSearch, &SearchCriteria::Filters(filters()));
        assert_eq!(request.label, None);
    }
}
