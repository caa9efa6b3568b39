//! Query-string hand-off between the list/upload pages and the analysis page.
//!
//! A receipt travels as `id`, `timestamp`, `store`, `price`, `categories`
//! (comma joined) and `image-url`. A receipt whose date or total could not be
//! read travels with that parameter empty.

use crate::config::ANALYSIS_PAGE;
use crate::error::AppError;
use crate::format::{convert_string_to_number, join_categories, split_categories};
use crate::models::Receipt;

pub fn encode_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
        .collect::<Vec<String>>()
        .join("&")
}

/// Decode `location.search` (leading `?` optional) into key/value pairs.
pub fn parse_query(search: &str) -> Vec<(String, String)> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// First value for `key`, if any.
pub fn query_value(search: &str, key: &str) -> Option<String> {
    parse_query(search)
        .into_iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
}

pub fn to_query(receipt: &Receipt) -> String {
    encode_pairs([
        ("id", receipt.id.clone()),
        (
            "timestamp",
            receipt.timestamp.map(|ts| ts.to_string()).unwrap_or_default(),
        ),
        ("store", receipt.store.clone()),
        (
            "price",
            receipt.price.map(|price| price.to_string()).unwrap_or_default(),
        ),
        ("categories", join_categories(&receipt.categories)),
        ("image-url", receipt.image_url.clone()),
    ])
}

pub fn analysis_url(receipt: &Receipt) -> String {
    format!("{}?{}", ANALYSIS_PAGE, to_query(receipt))
}

pub fn from_query(search: &str) -> Result<Receipt, AppError> {
    let params = parse_query(search);
    let get = |name: &str| {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };
    let invalid = |name: &str| AppError::Validation(format!("The page address has no valid {name}."));
    // Only the id, date and total are trimmed. A blank date or total is
    // allowed, an unparseable one is not.
    let trimmed = |name: &str| get(name).map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty());

    let id = trimmed("id").ok_or_else(|| invalid("id"))?;
    let timestamp = trimmed("timestamp")
        .map(|raw| raw.parse::<i64>().map_err(|_| invalid("timestamp")))
        .transpose()?;
    let price = trimmed("price")
        .map(|raw| convert_string_to_number(&raw).ok_or_else(|| invalid("price")))
        .transpose()?;

    Ok(Receipt {
        id,
        timestamp,
        store: get("store").unwrap_or_default(),
        price,
        categories: get("categories")
            .map(|raw| split_categories(&raw))
            .unwrap_or_default(),
        image_url: get("image-url").unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Receipt {
        Receipt {
            id: "5629499534213120".to_string(),
            timestamp: Some(1_590_980_400_000),
            store: " trader joe's & co ".to_string(),
            price: Some(1234.56),
            categories: vec!["food".to_string(), "date night".to_string()],
            image_url: "/serve-image?blob-key=abc=".to_string(),
        }
    }

    #[test]
    fn receipt_survives_the_url_round_trip() {
        let receipt = sample();
        let url = analysis_url(&receipt);
        assert!(url.starts_with("/receipt-analysis.html?id=5629499534213120&"));

        let search = &url[url.find('?').unwrap()..];
        assert_eq!(from_query(search).unwrap(), receipt);
    }

    #[test]
    fn currency_formatted_price_is_normalized() {
        let receipt = from_query("id=1&timestamp=0&price=%241%2C234.56&categories=a").unwrap();
        assert_eq!(receipt.price, Some(1234.56));
    }

    #[test]
    fn blank_date_and_total_survive_the_round_trip() {
        let receipt = Receipt {
            timestamp: None,
            price: None,
            ..sample()
        };
        let url = analysis_url(&receipt);
        assert!(url.contains("&timestamp=&"));
        assert!(url.contains("&price=&"));

        let search = &url[url.find('?').unwrap()..];
        assert_eq!(from_query(search).unwrap(), receipt);
        assert_eq!(from_query("id=1").unwrap().price, None);
    }

    #[test]
    fn store_keeps_surrounding_spaces_but_numbers_are_trimmed() {
        let receipt = from_query("id=+7+&timestamp=+0+&price=+3+&store=+cvs+").unwrap();
        assert_eq!(receipt.id, "7");
        assert_eq!(receipt.timestamp, Some(0));
        assert_eq!(receipt.price, Some(3.0));
        assert_eq!(receipt.store, " cvs ");
    }

    #[test]
    fn plus_signs_decode_as_spaces() {
        let receipt = from_query("?id=1&timestamp=0&price=3&store=whole+foods").unwrap();
        assert_eq!(receipt.store, "whole foods");
    }

    #[test]
    fn missing_categories_become_empty() {
        let receipt = from_query("id=1&timestamp=0&price=3").unwrap();
        assert!(receipt.categories.is_empty());
        assert_eq!(receipt.image_url, "");
    }

    #[test]
    fn required_fields_are_enforced() {
        assert!(matches!(
            from_query("timestamp=0&price=3"),
            Err(AppError::Validation(_))
        ));
        assert!(from_query("id=1&timestamp=soon&price=3").is_err());
        assert!(from_query("id=1&timestamp=0&price=free").is_err());
        assert!(from_query("").is_err());
        assert!(from_query("id=+&timestamp=0").is_err());
    }

    #[test]
    fn query_value_finds_first_match() {
        assert_eq!(
            query_value("?upload-error=true&x=1", "upload-error").as_deref(),
            Some("true")
        );
        assert_eq!(query_value("?x=1", "upload-error"), None);
    }
}
