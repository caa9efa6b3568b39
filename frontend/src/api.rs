//! Calls to the receipt backend.
//!
//! Every call is attempted exactly once; there are no retries and no
//! timeouts, so a hung request simply never resolves.

use gloo_net::http::{Request, Response};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use web_sys::{FormData, RequestCredentials};

use crate::analytics::SpendingAnalytics;
use crate::config::config;
use crate::error::AppError;
use crate::models::{Account, AnalyticsResponse, SearchResponse, StoredReceipt};

const LOGIN_STATUS: &str = "/login-status";
const SEARCH_RECEIPTS: &str = "/search-receipts";
const DELETE_RECEIPT: &str = "/delete-receipt";
const EDIT_RECEIPT: &str = "/edit-receipt";
const UPLOAD_RECEIPT: &str = "/upload-receipt";
const COMPUTE_ANALYTICS: &str = "/compute-analytics";

const PAYLOAD_TOO_LARGE: u16 = 413;
const BAD_REQUEST: u16 = 400;

/// Turn a non-2xx response into `AppError::Status` carrying the body text.
async fn ensure_ok(resp: Response) -> Result<Response, AppError> {
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let message = resp.text().await.unwrap_or_default();
    warn!("{} answered {}: {}", resp.url(), status, message.trim());
    Err(AppError::Status { status, message })
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, AppError> {
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}

pub async fn fetch_login_status() -> Result<Account, AppError> {
    let url = config().endpoint(LOGIN_STATUS);
    let resp = Request::get(&url)
        .credentials(RequestCredentials::Include)
        .send()
        .await?;
    let account: Account = read_json(ensure_ok(resp).await?).await?;
    debug!("login status: logged_in={}", account.logged_in);
    Ok(account)
}

/// `query` is the already encoded query string, without the leading `?`.
pub async fn search_receipts(query: &str) -> Result<SearchResponse, AppError> {
    let url = format!("{}?{}", config().endpoint(SEARCH_RECEIPTS), query);
    debug!("searching receipts: {query}");
    let resp = Request::get(&url)
        .credentials(RequestCredentials::Include)
        .send()
        .await?;
    read_json(ensure_ok(resp).await?).await
}

/// Ask the server to delete a receipt. Any completed response counts; the
/// returned status is only for logging.
pub async fn delete_receipt(id: &str) -> Result<u16, AppError> {
    let url = config().endpoint(DELETE_RECEIPT);
    info!("deleting receipt {id}");
    let resp = Request::post(&url)
        .credentials(RequestCredentials::Include)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(format!("id={}", urlencoding::encode(id)))?
        .send()
        .await?;
    if !resp.ok() {
        warn!("delete of receipt {} answered {}", id, resp.status());
    }
    Ok(resp.status())
}

pub async fn edit_receipt(query: &str) -> Result<StoredReceipt, AppError> {
    let url = format!("{}?{}", config().endpoint(EDIT_RECEIPT), query);
    info!("saving receipt edits");
    let resp = Request::post(&url)
        .credentials(RequestCredentials::Include)
        .send()
        .await?;
    read_json(ensure_ok(resp).await?).await
}

/// One-time upload target for a single multipart submission.
pub async fn fetch_upload_url() -> Result<String, AppError> {
    let url = config().endpoint(UPLOAD_RECEIPT);
    let resp = Request::get(&url)
        .credentials(RequestCredentials::Include)
        .send()
        .await?;
    let upload_url = ensure_ok(resp).await?.text().await?;
    Ok(upload_url.trim().to_string())
}

pub async fn upload_receipt(upload_url: &str, form: FormData) -> Result<StoredReceipt, AppError> {
    info!("uploading receipt image");
    let resp = Request::post(upload_url)
        .credentials(RequestCredentials::Include)
        .body(form)?
        .send()
        .await?;

    match resp.status() {
        PAYLOAD_TOO_LARGE => Err(AppError::Status {
            status: PAYLOAD_TOO_LARGE,
            message: "The selected file is too large. Please choose a smaller image.".to_string(),
        }),
        BAD_REQUEST => Err(AppError::Status {
            status: BAD_REQUEST,
            message: "The selected file is not a supported image type.".to_string(),
        }),
        _ => read_json(ensure_ok(resp).await?).await,
    }
}

pub async fn compute_analytics() -> Result<SpendingAnalytics, AppError> {
    let url = config().endpoint(COMPUTE_ANALYTICS);
    let resp = Request::get(&url)
        .credentials(RequestCredentials::Include)
        .send()
        .await?;
    let analytics: AnalyticsResponse = read_json(ensure_ok(resp).await?).await?;
    Ok(analytics.into_analytics())
}
