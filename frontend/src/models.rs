use serde::de::{Error as _, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::analytics::SpendingAnalytics;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    /// Epoch milliseconds. Absent when no date could be read off the image.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub store: String,
    /// Absent when no total could be read off the image.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub image_url: String,
}

/// Receipt ids are opaque; the backend emits them as numbers but we never do
/// arithmetic on them.
fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!("unsupported receipt id: {other}"))),
    }
}

/// Body of `GET /login-status`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub logged_in: bool,
    pub login_url: Option<String>,
    pub logout_url: Option<String>,
    pub email: Option<String>,
}

/// Body of `GET /search-receipts`. Older backends answer with a bare list or
/// mapping; current ones always send the cursor envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Page {
        #[serde(rename = "matchingReceipts")]
        matching_receipts: Vec<Receipt>,
        #[serde(rename = "encodedCursor", default)]
        encoded_cursor: Option<String>,
    },
    List(Vec<Receipt>),
    Map(#[serde(deserialize_with = "receipts_in_document_order")] Vec<Receipt>),
}

/// Id-keyed mapping read as a list, keeping the order the server wrote.
fn receipts_in_document_order<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Receipt>, D::Error> {
    struct ReceiptsVisitor;

    impl<'de> Visitor<'de> for ReceiptsVisitor {
        type Value = Vec<Receipt>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping of receipt id to receipt")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut receipts = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((_id, receipt)) = map.next_entry::<String, Receipt>()? {
                receipts.push(receipt);
            }
            Ok(receipts)
        }
    }

    deserializer.deserialize_map(ReceiptsVisitor)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchPage {
    pub receipts: Vec<Receipt>,
    pub cursor: Option<String>,
}

impl SearchResponse {
    pub fn into_page(self) -> SearchPage {
        match self {
            SearchResponse::Page {
                matching_receipts,
                encoded_cursor,
            } => SearchPage {
                receipts: matching_receipts,
                cursor: encoded_cursor.filter(|cursor| !cursor.is_empty()),
            },
            SearchResponse::List(receipts) => SearchPage {
                receipts,
                cursor: None,
            },
            SearchResponse::Map(receipts) => SearchPage {
                receipts,
                cursor: None,
            },
        }
    }
}

/// Datastore entity echoed back by the upload and edit endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct StoredReceipt {
    pub key: EntityKey,
    #[serde(rename = "propertyMap")]
    pub property_map: ReceiptProperties,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EntityKey {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptProperties {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub image_url: String,
}

impl StoredReceipt {
    pub fn into_receipt(self) -> Receipt {
        let props = self.property_map;
        Receipt {
            id: self.key.id,
            timestamp: props.timestamp,
            store: props.store,
            price: props.price,
            categories: props.categories,
            image_url: props.image_url,
        }
    }
}

/// Body of `GET /compute-analytics`. The oldest backend sent a bare
/// `[stores, categories]` pair.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AnalyticsResponse {
    Totals {
        #[serde(rename = "storeAnalytics")]
        store_analytics: HashMap<String, f64>,
        #[serde(rename = "categoryAnalytics")]
        category_analytics: HashMap<String, f64>,
    },
    Legacy(HashMap<String, f64>, HashMap<String, f64>),
}

impl AnalyticsResponse {
    pub fn into_analytics(self) -> SpendingAnalytics {
        match self {
            AnalyticsResponse::Totals {
                store_analytics,
                category_analytics,
            }
            | AnalyticsResponse::Legacy(store_analytics, category_analytics) => SpendingAnalytics {
                store_totals: store_analytics,
                category_totals: category_analytics,
            },
        }
    }
}
