//! Command phrase parsing helpers.

use voxweb_protocols::browser::{ScrollAmount, ScrollDirection};

/// Navigation trigger keywords, checked in order.
pub const NAVIGATE_KEYWORDS: &[&str] = &["navigate to", "go to", "open"];

/// Description trigger keywords.
pub const DESCRIBE_KEYWORDS: &[&str] = &["describe", "explain", "tell me about"];

/// Content-reading trigger keywords.
pub const READ_KEYWORDS: &[&str] = &["read", "summarize", "main content"];

/// Whether any of the keywords occurs in `text`.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Extract the navigation target following the first matching keyword.
///
/// Returns `Some` whenever a navigation keyword is present, even if nothing
/// follows it - the command still belongs to the navigation category, and an
/// empty target is the browser driver's error to report.
pub fn navigation_target(text: &str) -> Option<String> {
    for keyword in NAVIGATE_KEYWORDS {
        if let Some((_, rest)) = text.split_once(keyword) {
            return Some(rest.trim().to_string());
        }
    }
    None
}

/// Strip the click prefixes ("click on", then "click") and trim.
///
/// An empty result means no target was specified.
pub fn click_target(text: &str) -> String {
    text.replace("click on", "")
        .replace("click", "")
        .trim()
        .to_string()
}

/// Parse a scroll phrase into direction and magnitude.
///
/// "to top"/"to bottom" fix both the magnitude and the direction; otherwise
/// the presence of "up" selects the direction and the amount is one viewport.
pub fn parse_scroll(text: &str) -> (ScrollDirection, ScrollAmount) {
    if text.contains("to top") {
        (ScrollDirection::Up, ScrollAmount::Top)
    } else if text.contains("to bottom") {
        (ScrollDirection::Down, ScrollAmount::Bottom)
    } else if text.contains("up") {
        (ScrollDirection::Up, ScrollAmount::Page)
    } else {
        (ScrollDirection::Down, ScrollAmount::Page)
    }
}
