//! Injected page scripts.

use voxweb_protocols::browser::{ScrollAmount, ScrollDirection};

/// Script that finds and clicks the best-scoring visible interactive element.
///
/// Scoring: exact text match 100, substring 80, all words present 60; a
/// match must score above 30 to be clicked. Returns the clicked element's
/// label, or null when nothing matched.
pub(crate) fn click_script(search: &str) -> String {
    // serde_json string encoding doubles as JS string escaping
    let quoted = serde_json::to_string(&search.trim().to_lowercase()).unwrap_or_default();
    format!(
        r#"(() => {{
  const search = {quoted};
  const nodes = [...document.querySelectorAll('button, a, [onclick], [role="button"], [role="link"]')];
  let best = null, bestScore = 0;
  for (const el of nodes) {{
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden' || el.disabled) continue;
    const rect = el.getBoundingClientRect();
    if (rect.width === 0 || rect.height === 0) continue;
    let text = (el.innerText || '').trim().toLowerCase();
    if (!text) text = (el.getAttribute('aria-label') || '').trim().toLowerCase();
    if (!text) continue;
    let score = 0;
    if (text === search) score = 100;
    else if (text.includes(search)) score = 80;
    else if (search.split(/\s+/).every(w => text.includes(w))) score = 60;
    if (score > bestScore) {{ bestScore = score; best = el; }}
  }}
  if (!best || bestScore <= 30) return null;
  best.scrollIntoView({{block: 'center'}});
  const label = (best.innerText || best.getAttribute('aria-label') || 'element').trim();
  best.click();
  return label;
}})()"#
    )
}

/// Script that clicks a cookie consent button if one is visible.
/// Returns true when something was clicked.
pub(crate) const COOKIE_SCRIPT: &str = r#"(() => {
  const words = ['accept', 'i agree', 'agree', 'allow', 'got it', 'ok'];
  const nodes = [...document.querySelectorAll('button, a, [role="button"]')];
  for (const el of nodes) {
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') continue;
    const label = ((el.innerText || '') + ' ' + (el.getAttribute('aria-label') || '')).toLowerCase();
    const attrs = ((el.id || '') + ' ' + (typeof el.className === 'string' ? el.className : '')).toLowerCase();
    if (words.some(w => label.includes(w)) || attrs.includes('accept') || attrs.includes('cookie')) {
      el.click();
      return true;
    }
  }
  return false;
})()"#;

/// Script for a scroll action.
pub(crate) fn scroll_script(direction: ScrollDirection, amount: ScrollAmount) -> &'static str {
    match amount {
        ScrollAmount::Top => "window.scrollTo(0, 0);",
        ScrollAmount::Bottom => "window.scrollTo(0, document.body.scrollHeight);",
        ScrollAmount::Page => match direction {
            ScrollDirection::Up => "window.scrollBy(0, -window.innerHeight);",
            ScrollDirection::Down => "window.scrollBy(0, window.innerHeight);",
        },
    }
}

/// Spoken confirmation for a scroll action.
pub(crate) fn scroll_message(direction: ScrollDirection, amount: ScrollAmount) -> &'static str {
    match (direction, amount) {
        (_, ScrollAmount::Top) => "Scrolled to top",
        (_, ScrollAmount::Bottom) => "Scrolled to bottom",
        (ScrollDirection::Up, ScrollAmount::Page) => "Scrolled up",
        (ScrollDirection::Down, ScrollAmount::Page) => "Scrolled down",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_script_embeds_lowercased_target() {
        let script = click_script("The LOGIN Button");
        assert!(script.contains(r#""the login button""#));
    }

    #[test]
    fn test_click_script_escapes_quotes() {
        let script = click_script(r#"say "hello""#);
        assert!(script.contains(r#"\"hello\""#));
    }

    #[test]
    fn test_scroll_script_selection() {
        assert_eq!(
            scroll_script(ScrollDirection::Up, ScrollAmount::Top),
            "window.scrollTo(0, 0);"
        );
        assert_eq!(
            scroll_script(ScrollDirection::Down, ScrollAmount::Bottom),
            "window.scrollTo(0, document.body.scrollHeight);"
        );
        assert!(scroll_script(ScrollDirection::Up, ScrollAmount::Page).contains("-window.innerHeight"));
        assert!(!scroll_script(ScrollDirection::Down, ScrollAmount::Page).contains('-'));
    }

    #[test]
    fn test_scroll_messages() {
        assert_eq!(
            scroll_message(ScrollDirection::Up, ScrollAmount::Top),
            "Scrolled to top"
        );
        assert_eq!(
            scroll_message(ScrollDirection::Down, ScrollAmount::Page),
            "Scrolled down"
        );
    }
}
