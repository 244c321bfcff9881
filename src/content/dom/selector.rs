//! CSS selector subset used by the page contract.
//!
//! Supports what the player selectors need:
//!
//! | Syntax | Example |
//! |--------|---------|
//! | Type | `video` |
//! | Id | `#movie_player` |
//! | Class | `.ytp-right-controls` |
//! | Compound | `button.ytp-button` |
//! | Descendant | `.ytp-next-button svg` |
//! | List | `.ytp-ad-skip-button, .ytp-ad-skip-button-modern` |
//!
//! The universal selector, attribute selectors, pseudo-classes and the
//! `>`, `+`, `~` combinators are rejected.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// Element View
// ============================================================================

/// What matching needs to know about an element.
pub trait ElementView {
    /// Lowercase tag name.
    fn tag(&self) -> &str;

    /// Value of the `id` attribute.
    fn id(&self) -> Option<&str>;

    /// Whether the class list contains `class`.
    fn has_class(&self, class: &str) -> bool;
}

// ============================================================================
// Compound
// ============================================================================

/// A sequence of simple selectors with no combinator, e.g. `button.a.b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Required tag, `None` for any.
    pub tag: Option<String>,
    /// Required id.
    pub id: Option<String>,
    /// Required classes.
    pub classes: Vec<String>,
}

impl Compound {
    /// Returns `true` if `element` satisfies every part.
    #[must_use]
    pub fn matches<E: ElementView + ?Sized>(&self, element: &E) -> bool {
        if let Some(tag) = &self.tag
            && tag != element.tag()
        {
            return false;
        }

        if let Some(id) = &self.id
            && element.id() != Some(id.as_str())
        {
            return false;
        }

        self.classes.iter().all(|class| element.has_class(class))
    }

    fn parse(raw: &str) -> Result<Self> {
        let mut compound = Self::default();
        let mut rest = raw;

        // Leading type selector.
        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        let (tag, tail) = rest.split_at(tag_end);
        match tag {
            "" => {}
            _ if tag.chars().all(is_name_char) => compound.tag = Some(tag.to_ascii_lowercase()),
            _ => return Err(unsupported(raw)),
        }
        rest = tail;

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];

            if name.is_empty() || !name.chars().all(is_name_char) {
                return Err(unsupported(raw));
            }

            match marker {
                '#' if compound.id.is_none() => compound.id = Some(name.to_string()),
                '.' => compound.classes.push(name.to_string()),
                _ => return Err(unsupported(raw)),
            }
            rest = &body[end..];
        }

        Ok(compound)
    }
}

// ============================================================================
// Complex Selector
// ============================================================================

/// Compounds joined by descendant combinators, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    compounds: Vec<Compound>,
}

impl ComplexSelector {
    /// Returns `true` if `element` matches, given its ancestors from
    /// nearest to farthest.
    pub fn matches<'a, E, I>(&self, element: &E, ancestors: I) -> bool
    where
        E: ElementView + ?Sized + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let Some((subject, outer)) = self.compounds.split_last() else {
            return false;
        };

        if !subject.matches(element) {
            return false;
        }

        // Descendant-only chains can be matched greedily: the nearest
        // ancestor satisfying each compound is always a valid choice.
        let mut remaining = outer.iter().rev().peekable();
        for ancestor in ancestors {
            match remaining.peek() {
                Some(compound) if compound.matches(ancestor) => {
                    remaining.next();
                }
                Some(_) => {}
                None => break,
            }
        }

        remaining.peek().is_none()
    }
}

// ============================================================================
// SelectorList
// ============================================================================

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parses `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dom`] for empty input or syntax outside the
    /// supported subset.
    pub fn parse(raw: &str) -> Result<Self> {
        let selectors = raw
            .split(',')
            .map(|part| {
                let compounds = part
                    .split_whitespace()
                    .map(Compound::parse)
                    .collect::<Result<Vec<_>>>()?;

                if compounds.is_empty() {
                    return Err(unsupported(raw));
                }
                Ok(ComplexSelector { compounds })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { selectors })
    }

    /// Returns `true` if any selector in the list matches.
    pub fn matches<'a, E, I>(&self, element: &E, ancestors: I) -> bool
    where
        E: ElementView + ?Sized + 'a,
        I: IntoIterator<Item = &'a E> + Clone,
    {
        self.selectors
            .iter()
            .any(|selector| selector.matches(element, ancestors.clone()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn unsupported(raw: &str) -> Error {
    Error::dom(format!("unsupported selector: {raw:?}"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct El {
        tag: &'static str,
        id: Option<&'static str>,
        classes: &'static [&'static str],
    }

    impl ElementView for El {
        fn tag(&self) -> &str {
            self.tag
        }

        fn id(&self) -> Option<&str> {
            self.id
        }

        fn has_class(&self, class: &str) -> bool {
            self.classes.contains(&class)
        }
    }

    const SVG: El = El {
        tag: "svg",
        id: None,
        classes: &[],
    };
    const NEXT: El = El {
        tag: "a",
        id: None,
        classes: &["ytp-next-button", "ytp-button"],
    };
    const PLAYER: El = El {
        tag: "div",
        id: Some("movie_player"),
        classes: &["html5-video-player", "ad-showing"],
    };

    #[test]
    fn test_parse_compound() {
        let list = SelectorList::parse("button.ytp-button#skip").expect("parse");
        let compound = &list.selectors[0].compounds[0];

        assert_eq!(compound.tag.as_deref(), Some("button"));
        assert_eq!(compound.id.as_deref(), Some("skip"));
        assert_eq!(compound.classes, vec!["ytp-button".to_string()]);
    }

    #[test]
    fn test_descendant_match() {
        let list = SelectorList::parse(".ytp-next-button svg").expect("parse");

        assert!(list.matches(&SVG, [&NEXT, &PLAYER]));
        assert!(!list.matches(&SVG, [&PLAYER]));
        assert!(!list.matches(&NEXT, [&PLAYER]));
    }

    #[test]
    fn test_non_adjacent_ancestor_match() {
        let list = SelectorList::parse("#movie_player svg").expect("parse");
        assert!(list.matches(&SVG, [&NEXT, &PLAYER]));
    }

    #[test]
    fn test_list_match() {
        let list = SelectorList::parse(".missing, .ad-showing").expect("parse");
        assert!(list.matches(&PLAYER, []));
    }

    #[test]
    fn test_rejects_unsupported_syntax() {
        for raw in ["", "*", "a > b", "[data-x]", "a:hover", ".", "a, ", "#a#b"] {
            assert!(SelectorList::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}
