//! Page script builders
//!
//! Every engine primitive is one self-contained expression. Arguments are
//! embedded as JSON literals, and the expression always evaluates to a
//! `{ status: ... }` object.

use locator_core::{ElementRef, Scope};

/// Page global holding the token registry. Matched elements are tracked
/// here instead of being marked in the DOM.
pub const REGISTRY_GLOBAL: &str = "__probeRefs";

const PRELUDE: &str = r#"
    const stale = { stale: true };
    const registry = window.__probeRefs ||
        (window.__probeRefs = { byToken: new Map(), byElement: new WeakMap(), seq: 0 });
    const byRef = (token) => {
        const el = registry.byToken.get(token);
        if (!el || !el.isConnected) throw stale;
        return el;
    };
    const inDocOrder = (nodes) => Array.from(new Set(nodes)).sort((a, b) => {
        if (a === b) return 0;
        return (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING) ? -1 : 1;
    });
    const within = (roots, selector) =>
        inDocOrder(roots.flatMap((root) => Array.from(root.querySelectorAll(selector))));
    const firstWithin = (roots, selector) =>
        inDocOrder(roots.map((root) => root.querySelector(selector)).filter(Boolean))[0] || null;
    const isVisible = (el) => {
        const style = window.getComputedStyle(el);
        if (style.visibility === 'hidden' || style.display === 'none') return false;
        const rect = el.getBoundingClientRect();
        return rect.width > 0 || rect.height > 0 || el.getClientRects().length > 0;
    };
    const isEnabled = (el) =>
        !el.disabled && !el.closest('fieldset[disabled]') && el.getAttribute('aria-disabled') !== 'true';
"#;

/// JSON string literal for embedding into a script
pub fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Expression evaluating to the array of search roots for `scope`
pub fn scope_roots(scope: &Scope) -> String {
    match scope {
        Scope::Document => "[document]".to_string(),
        Scope::Element(element) => format!("[byRef({})]", js_str(element.as_str())),
        Scope::Collection { parent, expression } => {
            format!("within({}, {})", scope_roots(parent), js_str(expression.as_str()))
        }
    }
}

fn wrap(token_prefix: &str, body: &str) -> String {
    format!(
        r#"(() => {{
    const tokenPrefix = {prefix};
    {prelude}
    const tag = (el) => {{
        let token = registry.byElement.get(el);
        if (!token) {{
            token = tokenPrefix + '-' + (registry.seq++);
            registry.byElement.set(el, token);
            registry.byToken.set(token, el);
        }}
        return token;
    }};
    try {{
        {body}
    }} catch (err) {{
        if (err === stale) return {{ status: 'stale' }};
        return {{
            status: 'error',
            name: String((err && err.name) || 'Error'),
            message: String((err && err.message) || err),
        }};
    }}
}})()"#,
        prefix = js_str(token_prefix),
        prelude = PRELUDE,
        body = body,
    )
}

pub fn query_first(token_prefix: &str, scope: &Scope, selector: &str) -> String {
    wrap(
        token_prefix,
        &format!(
            "const found = firstWithin({roots}, {selector});
        if (!found) return {{ status: 'none' }};
        return {{ status: 'ok', refs: [tag(found)] }};",
            roots = scope_roots(scope),
            selector = js_str(selector),
        ),
    )
}

pub fn query_all(token_prefix: &str, scope: &Scope, selector: &str) -> String {
    wrap(
        token_prefix,
        &format!(
            "return {{ status: 'ok', refs: within({roots}, {selector}).map(tag) }};",
            roots = scope_roots(scope),
            selector = js_str(selector),
        ),
    )
}

pub fn count(scope: &Scope, selector: &str) -> String {
    wrap(
        "",
        &format!(
            "return {{ status: 'ok', count: within({roots}, {selector}).length }};",
            roots = scope_roots(scope),
            selector = js_str(selector),
        ),
    )
}

pub fn all_text_contents(scope: &Scope, selector: &str) -> String {
    wrap(
        "",
        &format!(
            "return {{ status: 'ok', texts: within({roots}, {selector}).map((el) => el.textContent || '') }};",
            roots = scope_roots(scope),
            selector = js_str(selector),
        ),
    )
}

pub fn is_visible(element: &ElementRef) -> String {
    wrap(
        "",
        &format!(
            "return {{ status: 'ok', value: isVisible(byRef({})) }};",
            js_str(element.as_str())
        ),
    )
}

pub fn is_enabled(element: &ElementRef) -> String {
    wrap(
        "",
        &format!(
            "return {{ status: 'ok', value: isEnabled(byRef({})) }};",
            js_str(element.as_str())
        ),
    )
}

pub fn text_content(element: &ElementRef) -> String {
    wrap(
        "",
        &format!(
            "return {{ status: 'ok', text: byRef({}).textContent }};",
            js_str(element.as_str())
        ),
    )
}
