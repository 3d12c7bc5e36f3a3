//! Sequential-focus (tab) eligibility.

use crate::document::Document;
use crate::element::ElementDescriptor;

/// Check whether an element can be reached with Tab.
///
/// Eligible: anchors and areas with `href`, enabled buttons, selects,
/// textareas and non-hidden inputs, iframes, `details`, any element with a
/// non-negative `tabindex`, and `contenteditable` elements. A negative
/// `tabindex` excludes the element regardless of its kind.
pub fn is_tabbable(element: &ElementDescriptor) -> bool {
    match element.tab_index() {
        Some(index) => index >= 0,
        None => natively_focusable(element) || is_content_editable(element),
    }
}

fn natively_focusable(element: &ElementDescriptor) -> bool {
    match element.tag.as_str() {
        "a" | "area" => element.has_attribute("href"),
        "button" | "select" | "textarea" => !element.is_disabled(),
        "input" => {
            !element.is_disabled()
                && !element
                    .attribute("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        }
        "iframe" | "details" => true,
        _ => false,
    }
}

fn is_content_editable(element: &ElementDescriptor) -> bool {
    element
        .attribute("contenteditable")
        .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
}

/// Tabbable descendants of `root` in document order.
///
/// Recomputed on every call so it always reflects the current tree.
pub fn tabbable_descendants<D: Document + ?Sized>(
    document: &D,
    root: &D::Element,
) -> Vec<D::Element> {
    document
        .descendants(root)
        .into_iter()
        .filter(|el| document.describe(el).is_some_and(|d| is_tabbable(&d)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str) -> ElementDescriptor {
        ElementDescriptor::new(tag)
    }

    #[test]
    fn test_links() {
        assert!(is_tabbable(&el("a").with_attribute("href", "#")));
        assert!(!is_tabbable(&el("a")));
        assert!(is_tabbable(&el("area").with_attribute("href", "/x")));
    }

    #[test]
    fn test_form_controls() {
        assert!(is_tabbable(&el("button")));
        assert!(!is_tabbable(&el("button").with_attribute("disabled", "")));
        assert!(is_tabbable(&el("input").with_attribute("type", "text")));
        assert!(!is_tabbable(&el("input").with_attribute("type", "Hidden")));
        assert!(is_tabbable(&el("select")));
        assert!(is_tabbable(&el("textarea")));
    }

    #[test]
    fn test_tab_index() {
        assert!(is_tabbable(&el("div").with_attribute("tabindex", "0")));
        assert!(is_tabbable(&el("span").with_attribute("tabindex", "3")));
        assert!(!is_tabbable(&el("div").with_attribute("tabindex", "-1")));
        assert!(!is_tabbable(&el("button").with_attribute("tabindex", "-1")));
        assert!(!is_tabbable(&el("div")));
    }

    #[test]
    fn test_content_editable() {
        assert!(is_tabbable(&el("div").with_attribute("contenteditable", "true")));
        assert!(is_tabbable(&el("div").with_attribute("contenteditable", "")));
        assert!(!is_tabbable(&el("div").with_attribute("contenteditable", "false")));
        assert!(!is_tabbable(
            &el("div")
                .with_attribute("contenteditable", "true")
                .with_attribute("tabindex", "-1")
        ));
    }

    #[test]
    fn test_embedded() {
        assert!(is_tabbable(&el("iframe")));
        assert!(is_tabbable(&el("details")));
    }
}
