// Keyscan Input Layer - Focus Target Filtering
// Decides whether a key event came from a free-typing surface

use super::event::InputTarget;

/// Predicate supplied by the host UI layer.
///
/// Returns `true` when the event's origin is a surface where the user
/// types freely, so the decoder must leave the keystroke alone.
pub trait TargetFilter {
    fn is_text_entry(&self, target: &InputTarget) -> bool;
}

impl<F> TargetFilter for F
where
    F: Fn(&InputTarget) -> bool,
{
    fn is_text_entry(&self, target: &InputTarget) -> bool {
        self(target)
    }
}

/// Element names treated as text entry by [`TextEntryFilter`]
const TEXT_ENTRY_ELEMENTS: &[&str] = &["input", "textarea", "select", "contenteditable"];

/// Default filter: `TextEntry` targets and the usual form elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEntryFilter;

impl TargetFilter for TextEntryFilter {
    fn is_text_entry(&self, target: &InputTarget) -> bool {
        match target {
            InputTarget::Document => false,
            InputTarget::TextEntry => true,
            InputTarget::Element(name) => TEXT_ENTRY_ELEMENTS
                .iter()
                .any(|candidate| name.trim().eq_ignore_ascii_case(candidate)),
        }
    }
}

/// Filter that never suppresses, for hosts with no notion of focus
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTextEntry;

impl TargetFilter for NoTextEntry {
    fn is_text_entry(&self, _target: &InputTarget) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = TextEntryFilter;
        assert!(!filter.is_text_entry(&InputTarget::Document));
        assert!(filter.is_text_entry(&InputTarget::TextEntry));
        assert!(filter.is_text_entry(&InputTarget::element("INPUT")));
        assert!(filter.is_text_entry(&InputTarget::element("textarea")));
        assert!(filter.is_text_entry(&InputTarget::element("Select")));
        assert!(!filter.is_text_entry(&InputTarget::element("BUTTON")));
        assert!(!filter.is_text_entry(&InputTarget::element("div")));
    }

    #[test]
    fn test_closure_filter() {
        let only_search_box =
            |target: &InputTarget| matches!(target, InputTarget::Element(name) if name == "search");
        assert!(only_search_box.is_text_entry(&InputTarget::element("search")));
        assert!(!only_search_box.is_text_entry(&InputTarget::TextEntry));
    }

    #[test]
    fn test_no_text_entry() {
        assert!(!NoTextEntry.is_text_entry(&InputTarget::TextEntry));
    }
}
