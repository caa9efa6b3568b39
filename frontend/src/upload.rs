use log::{error, info};
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, FormData, HtmlInputElement};
use yew::prelude::*;

use crate::api;
use crate::config::{config, INDEX_PAGE};
use crate::dom;
use crate::error::AppError;
use crate::format::format_price;
use crate::models::Receipt;
use crate::receipt_link::{analysis_url, query_value};

const IMAGE_FIELD: &str = "receipt-image";
/// The backend only reads JPEG photos.
const ACCEPTED_IMAGE_TYPE: &str = "image/jpeg";

/// An empty type means the browser could not tell, so the server decides.
pub fn is_accepted_image(mime: &str) -> bool {
    mime.is_empty() || mime.eq_ignore_ascii_case(ACCEPTED_IMAGE_TYPE)
}

/// Checks that run before any request is made.
pub fn validate_upload(size: Option<f64>, limit: u64) -> Result<(), AppError> {
    let size = size.ok_or_else(|| AppError::Validation("Please select a file to upload.".to_string()))?;
    if size > limit as f64 {
        let megabytes = limit as f64 / (1024.0 * 1024.0);
        return Err(AppError::Validation(format!(
            "The selected file is too large. Please choose an image under {megabytes:.0} MB."
        )));
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
pub enum UploadCheck {
    Ready,
    /// Nothing is sent. `clear_input` empties the file picker.
    Rejected { message: String, clear_input: bool },
}

pub fn check_upload(size: Option<f64>, limit: u64) -> UploadCheck {
    match validate_upload(size, limit) {
        Ok(()) => UploadCheck::Ready,
        Err(err) => UploadCheck::Rejected {
            message: err.user_message(),
            clear_input: size.is_some(),
        },
    }
}

/// Optional fields sent alongside the image. The backend extracts all of
/// these from the photo itself, so the upload page leaves them empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadMetadata {
    pub categories: Vec<String>,
    pub store: Option<String>,
    pub price: Option<f64>,
    /// Epoch milliseconds.
    pub date: Option<i64>,
}

impl UploadMetadata {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields: Vec<(&'static str, String)> = self
            .categories
            .iter()
            .map(|category| ("categories", category.clone()))
            .collect();
        if let Some(store) = &self.store {
            fields.push(("store", store.clone()));
        }
        if let Some(price) = self.price {
            fields.push(("price", format_price(price)));
        }
        if let Some(date) = self.date {
            fields.push(("date", date.to_string()));
        }
        fields
    }
}

fn build_form(image: &File, metadata: &UploadMetadata) -> Result<FormData, AppError> {
    let form = FormData::new()?;
    form.append_with_blob(IMAGE_FIELD, image)?;
    for (name, value) in metadata.fields() {
        form.append_with_str(name, &value)?;
    }
    Ok(form)
}

async fn submit_upload(image: File) -> Result<Receipt, AppError> {
    let upload_url = api::fetch_upload_url().await?;
    let form = build_form(&image, &UploadMetadata::default())?;
    let stored = api::upload_receipt(&upload_url, form).await?;
    Ok(stored.into_receipt())
}

#[function_component(UploadPage)]
pub fn upload_page() -> Html {
    let file_input = use_node_ref();
    let busy = use_state(|| false);

    use_effect_with_deps(
        |_| {
            if query_value(&dom::current_search(), "upload-error").as_deref() == Some("true") {
                dom::alert("A JPEG file was not uploaded.");
            }
            || ()
        },
        (),
    );

    let on_submit = {
        let file_input = file_input.clone();
        let busy = busy.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(input) = file_input.cast::<HtmlInputElement>() else {
                return;
            };
            let image = input.files().and_then(|files| files.get(0));

            let size = image.as_ref().map(|file| file.size());
            if let UploadCheck::Rejected { message, clear_input } =
                check_upload(size, config().max_upload_bytes)
            {
                if clear_input {
                    input.set_value("");
                }
                dom::alert(&message);
                return;
            }
            let Some(image) = image else {
                return;
            };
            if !is_accepted_image(&image.type_()) {
                input.set_value("");
                dom::alert("Please choose a JPEG image.");
                return;
            }

            busy.set(true);
            let busy = busy.clone();
            spawn_local(async move {
                match submit_upload(image).await {
                    Ok(receipt) => {
                        info!("receipt {} uploaded", receipt.id);
                        dom::navigate(&analysis_url(&receipt));
                    }
                    Err(err) => {
                        error!("upload failed: {err}");
                        busy.set(false);
                        dom::alert(&err.user_message());
                    }
                }
            });
        })
    };

    let on_cancel = Callback::from(|_| dom::navigate(INDEX_PAGE));

    html! {
        <div class={classes!("max-w-xl", "mx-auto", "bg-card", "p-8", "rounded-[10px]", "shadow-sm", "border", "border-border", busy.then_some("cursor-wait"))}>
            <form id="upload-form" class="space-y-5" onsubmit={on_submit}>
                <div class="space-y-1">
                    <label class="text-sm font-medium text-foreground">{"Receipt photo"}</label>
                    <input
                        ref={file_input}
                        type="file"
                        accept={ACCEPTED_IMAGE_TYPE}
                        class="w-full px-4 py-2 bg-input border border-input rounded-lg text-foreground"
                        disabled={*busy}
                    />
                    <p class="text-xs text-muted-foreground">
                        { format!("Store, date, total and categories are read from the photo. Maximum size {} MB.", config().max_upload_bytes / (1024 * 1024)) }
                    </p>
                </div>

                if *busy {
                    <div class="flex items-center gap-3 text-sm text-muted-foreground">
                        <span class="w-4 h-4 rounded-full border-2 border-primary border-t-transparent animate-spin"></span>
                        {"Analyzing receipt..."}
                    </div>
                }

                <div class="flex gap-3">
                    <button
                        type="submit"
                        class="flex-1 bg-primary text-primary-foreground py-2 rounded-lg font-semibold hover:opacity-90 transition-opacity"
                        disabled={*busy}
                    >
                        { if *busy { "Uploading..." } else { "Upload" } }
                    </button>
                    <button type="button" class="px-4 py-2 rounded-lg border border-border" onclick={on_cancel}>
                        {"Cancel"}
                    </button>
                </div>
            </form>
        </div>
    }
}
