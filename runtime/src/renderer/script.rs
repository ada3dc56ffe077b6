// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Compiles locators and predicates into page scripts.
//!
//! Every script is a self-contained expression that evaluates to a JSON
//! value. Missing elements yield `null` rather than `undefined` so results
//! always deserialize.

use record_scout::document::{Locator, Predicate};

/// Escape a string for inclusion in a single-quoted JavaScript literal.
pub fn sanitize_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{2028}' => result.push_str("\\u2028"),
            '\u{2029}' => result.push_str("\\u2029"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}

/// A quoted JavaScript string literal.
pub fn js_string(s: &str) -> String {
    format!("'{}'", sanitize_js_string(s))
}

const VISIBLE_FN: &str = "(e => !!e && !!(e.offsetWidth || e.offsetHeight || e.getClientRects().length) \
     && getComputedStyle(e).visibility !== 'hidden')";

/// CSS selector that finds candidates for an ARIA role, explicit or implicit.
fn role_selector(role: &str) -> String {
    let explicit = format!("[role=\"{}\"]", role.replace('"', ""));
    match role {
        "button" => format!("button,{explicit}"),
        "link" => format!("a[href],{explicit}"),
        "row" => format!("tr,{explicit}"),
        "cell" => format!("td,{explicit}"),
        _ => explicit,
    }
}

/// Expression evaluating to an array of the elements matched by `locator`.
pub fn elements(locator: &Locator) -> String {
    match locator {
        Locator::Css { selector } => {
            format!("Array.from(document.querySelectorAll({}))", js_string(selector))
        }
        Locator::Role { role, name } => format!(
            "Array.from(document.querySelectorAll({})).filter(e => \
             ((e.getAttribute('aria-label') || e.innerText || e.textContent || '') + '')\
             .toLowerCase().includes({}))",
            js_string(&role_selector(role)),
            js_string(&name.to_lowercase())
        ),
    }
}

/// Wrap `body` in a function receiving the `index`-th match as `e`
/// (`undefined` when absent).
fn with_element(locator: &Locator, index: usize, body: &str) -> String {
    format!(
        "(() => {{ const e = {}[{index}]; {body} }})()",
        elements(locator)
    )
}

pub fn count(locator: &Locator) -> String {
    format!("{}.length", elements(locator))
}

pub fn text(locator: &Locator, index: usize) -> String {
    with_element(
        locator,
        index,
        "return e ? (e.innerText ?? e.textContent ?? null) : null;",
    )
}

pub fn attribute(locator: &Locator, index: usize, name: &str) -> String {
    with_element(
        locator,
        index,
        &format!("return e ? e.getAttribute({}) : null;", js_string(name)),
    )
}

/// Returns `true` when clicked, `false` when the element is missing.
pub fn click(locator: &Locator, index: usize) -> String {
    with_element(
        locator,
        index,
        "if (!e) return false; e.scrollIntoView({block: 'center'}); e.click(); return true;",
    )
}

/// `null` when the element is missing.
pub fn is_visible(locator: &Locator, index: usize) -> String {
    with_element(
        locator,
        index,
        &format!("return e ? {VISIBLE_FN}(e) : null;"),
    )
}

/// `null` when the element is missing.
pub fn is_enabled(locator: &Locator, index: usize) -> String {
    with_element(
        locator,
        index,
        "return e ? !(e.disabled || e.hasAttribute('disabled') \
         || e.getAttribute('aria-disabled') === 'true') : null;",
    )
}

/// `null` when the element is missing.
pub fn has_ancestor_class(locator: &Locator, index: usize, class: &str) -> String {
    with_element(
        locator,
        index,
        &format!(
            "return e ? !!e.closest('.' + CSS.escape({})) : null;",
            js_string(class)
        ),
    )
}

/// True once at least one element matches (and is visible, if requested).
pub fn any_present(locator: &Locator, visible: bool) -> String {
    if visible {
        format!("{}.some({VISIBLE_FN})", elements(locator))
    } else {
        format!("{}.length > 0", elements(locator))
    }
}

pub fn predicate(predicate: &Predicate) -> String {
    match predicate {
        Predicate::UrlOrAttributeChanged {
            url,
            locator,
            attribute,
            value,
        } => {
            let expected = value.as_deref().map_or("null".to_string(), js_string);
            format!(
                "(location.href !== {}) || ({} !== {expected})",
                js_string(url),
                self::attribute(locator, 0, attribute)
            )
        }
        Predicate::CountAbove { locator, count } => {
            format!("{} > {count}", self::count(locator))
        }
    }
}

pub const READY_STATE_COMPLETE: &str = "document.readyState === 'complete'";

pub const SCROLL_TO_BOTTOM: &str =
    "(() => { window.scrollTo(0, document.body ? document.body.scrollHeight : 0); return true; })()";

pub const CURRENT_URL: &str = "location.href";
