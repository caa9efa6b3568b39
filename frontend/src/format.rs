use chrono::offset::LocalResult;
use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;

const LONG_DATE: &str = "%B %-d, %Y";
const INPUT_DATE: &str = "%Y-%m-%d";

/// Capitalize the first letter of each space-separated word.
pub fn capitalize_first_letters(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Parse a currency string such as `"$1,234.56"` into a number.
pub fn convert_string_to_number(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    digits.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn format_with_commas(value: i64) -> String {
    let is_negative = value < 0;
    let s = value.unsigned_abs().to_string().chars().rev().collect::<Vec<char>>();
    let mut out = Vec::new();
    for (i, ch) in s.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    let formatted: String = out.into_iter().rev().collect();
    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Amounts past the `u64` cent range are shown at that limit.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    let dollars = i64::try_from(cents / 100).unwrap_or(i64::MAX);
    format!("{}${}.{:02}", sign, format_with_commas(dollars), cents % 100)
}

/// Plain two-decimal amount for form inputs and query strings.
pub fn format_price(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Split a comma-separated category list, trimming each entry.
pub fn split_categories(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_categories<S: AsRef<str>>(categories: &[S]) -> String {
    categories
        .iter()
        .map(|category| category.as_ref().trim())
        .filter(|category| !category.is_empty())
        .collect::<Vec<&str>>()
        .join(",")
}

/// Lowercase with single spaces between words, the form the backend stores.
pub fn sanitize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

/// Long, human readable date (`October 19, 2026`) in the given zone.
pub fn format_date(timestamp_ms: i64, tz: Tz) -> String {
    match tz.timestamp_millis_opt(timestamp_ms) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.format(LONG_DATE).to_string(),
        LocalResult::None => String::new(),
    }
}

/// `YYYY-MM-DD`, the value format of `<input type="date">`.
pub fn format_iso_date(timestamp_ms: i64, tz: Tz) -> String {
    match tz.timestamp_millis_opt(timestamp_ms) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.format(INPUT_DATE).to_string(),
        LocalResult::None => String::new(),
    }
}

/// Local midnight of a `YYYY-MM-DD` date as epoch milliseconds.
pub fn date_input_to_timestamp(date: &str, tz: Tz) -> Option<i64> {
    let naive = NaiveDate::parse_from_str(date.trim(), INPUT_DATE)
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.timestamp_millis()),
        LocalResult::None => None,
    }
}

/// Re-render a `YYYY-MM-DD` date as `Month D, YYYY` for the search date range.
pub fn date_input_to_long_date(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date.trim(), INPUT_DATE)
        .ok()
        .map(|day| day.format(LONG_DATE).to_string())
}

pub fn resolve_time_zone(id: &str) -> Tz {
    id.parse::<Tz>().unwrap_or(Tz::UTC)
}

/// IANA zone id the browser is running in.
pub fn browser_time_zone() -> String {
    let options = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new())
        .resolved_options();
    js_sys::Reflect::get(&options, &"timeZone".into())
        .ok()
        .and_then(|zone| zone.as_string())
        .unwrap_or_else(|| "UTC".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(capitalize_first_letters("whole foods market"), "Whole Foods Market");
        assert_eq!(capitalize_first_letters("cvs"), "Cvs");
        assert_eq!(capitalize_first_letters(""), "");
        assert_eq!(capitalize_first_letters("two  spaces"), "Two  Spaces");
    }

    #[test]
    fn converts_currency_strings() {
        assert_eq!(convert_string_to_number("$1,234.56"), Some(1234.56));
        assert_eq!(convert_string_to_number("12"), Some(12.0));
        assert_eq!(convert_string_to_number(" $0.99 "), Some(0.99));
        assert_eq!(convert_string_to_number("free"), None);
        assert_eq!(convert_string_to_number(""), None);
    }

    #[test]
    fn formats_currency_with_separators() {
        assert_eq!(format_currency(1234.56), "$1,234.56");
        assert_eq!(format_currency(5.0), "$5.00");
        assert_eq!(format_currency(0.1 + 0.2), "$0.30");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-42.5), "-$42.50");
        assert_eq!(format_with_commas(-1234), "-1,234");
    }

    #[test]
    fn extreme_amounts_do_not_overflow() {
        let typed = convert_string_to_number("-99999999999999999999").unwrap();
        assert_eq!(format_currency(typed), "-$184,467,440,737,095,516.15");
        assert_eq!(format_currency(f64::MAX), "$184,467,440,737,095,516.15");
        assert_eq!(format_currency(-0.001), "$0.00");
        assert_eq!(format_with_commas(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn currency_round_trips_through_conversion() {
        let shown = format_currency(98765.43);
        assert_eq!(convert_string_to_number(&shown), Some(98765.43));
    }

    #[test]
    fn splits_categories_trimmed_in_order() {
        assert_eq!(split_categories("food, gas,Travel"), vec!["food", "gas", "Travel"]);
        assert_eq!(split_categories(" , lunch ,,"), vec!["lunch"]);
        assert!(split_categories("").is_empty());
    }

    #[test]
    fn joins_categories_canonically() {
        assert_eq!(join_categories(&["food", " gas ", ""]), "food,gas");
        assert_eq!(join_categories(&split_categories("a , b")), "a,b");
    }

    #[test]
    fn sanitizes_like_the_backend() {
        assert_eq!(sanitize("  Trader   Joe's \n"), "trader joe's");
    }

    #[test]
    fn formats_dates_in_the_requested_zone() {
        // 2020-06-01T03:00:00Z is still May 31st in Chicago.
        let ts = 1_590_980_400_000;
        assert_eq!(format_date(ts, Tz::UTC), "June 1, 2020");
        assert_eq!(format_date(ts, chrono_tz::America::Chicago), "May 31, 2020");
        assert_eq!(format_iso_date(ts, chrono_tz::America::Chicago), "2020-05-31");
    }

    #[test]
    fn date_inputs_become_local_midnight() {
        let chicago = chrono_tz::America::Chicago;
        let ts = date_input_to_timestamp("2020-05-31", chicago).unwrap();
        assert_eq!(ts, 1_590_901_200_000);
        assert_eq!(format_iso_date(ts, chicago), "2020-05-31");
        assert_eq!(date_input_to_timestamp("31/05/2020", chicago), None);
    }

    #[test]
    fn date_inputs_become_long_dates() {
        assert_eq!(date_input_to_long_date("2020-01-05").as_deref(), Some("January 5, 2020"));
        assert_eq!(date_input_to_long_date("yesterday"), None);
    }

    #[test]
    fn unknown_zones_fall_back_to_utc() {
        assert_eq!(resolve_time_zone("America/Chicago"), chrono_tz::America::Chicago);
        assert_eq!(resolve_time_zone(""), Tz::UTC);
        assert_eq!(resolve_time_zone("Mars/Olympus"), Tz::UTC);
    }
}
