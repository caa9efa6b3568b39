use chrono_tz::Tz;
use std::rc::Rc;
use yew::prelude::*;

use crate::card::ReceiptCard;
use crate::models::Receipt;

#[derive(Clone, Debug, PartialEq)]
pub enum DisplayEntry {
    Card(Receipt),
    Message(String),
}

/// Contents of the search results container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsDisplay {
    entries: Vec<DisplayEntry>,
}

impl ResultsDisplay {
    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    pub fn card_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, DisplayEntry::Card(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace everything with the given results, or a single message when
    /// there are none.
    pub fn show(&mut self, label: Option<&str>, receipts: Vec<Receipt>) {
        self.clear();
        if receipts.is_empty() {
            self.entries.push(DisplayEntry::Message(no_results_message(label)));
        } else {
            self.entries
                .extend(receipts.into_iter().map(DisplayEntry::Card));
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.entries
            .retain(|entry| !matches!(entry, DisplayEntry::Card(receipt) if receipt.id == id));
    }
}

pub fn no_results_message(label: Option<&str>) -> String {
    match label.map(str::trim).filter(|label| !label.is_empty()) {
        Some(label) => format!(
            "Sorry, no results found for \"{label}\". Please try your search again or try a different query."
        ),
        None => "Sorry, no matching receipts found. Please adjust your filters and try again."
            .to_string(),
    }
}

pub enum DisplayAction {
    Clear,
    Show {
        label: Option<String>,
        receipts: Vec<Receipt>,
    },
    Remove(String),
}

impl Reducible for ResultsDisplay {
    type Action = DisplayAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            DisplayAction::Clear => next.clear(),
            DisplayAction::Show { label, receipts } => next.show(label.as_deref(), receipts),
            DisplayAction::Remove(id) => next.remove(&id),
        }
        next.into()
    }
}

#[derive(Properties, PartialEq)]
pub struct ResultsViewProps {
    pub display: ResultsDisplay,
    pub time_zone: Tz,
    pub on_deleted: Callback<String>,
}

#[function_component(ResultsView)]
pub fn results_view(props: &ResultsViewProps) -> Html {
    html! {
        <div id="receipts-display" class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-3 gap-6">
            { for props.display.entries().iter().map(|entry| match entry {
                DisplayEntry::Card(receipt) => html! {
                    <ReceiptCard
                        key={receipt.id.clone()}
                        receipt={receipt.clone()}
                        time_zone={props.time_zone}
                        on_deleted={props.on_deleted.clone()}
                    />
                },
                DisplayEntry::Message(message) => html! {
                    <div class="col-span-full text-center error-message py-10">
                        <h3 class="text-lg text-muted-foreground">{ message.clone() }</h3>
                    </div>
                },
            }) }
        </div>
    }
}
