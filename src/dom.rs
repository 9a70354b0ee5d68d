//! Document queries used by the extractor
//!
//! The extractor only needs a handful of primitives, so it is written against
//! the [`Dom`] trait. [`HtmlPage`] implements it on top of `scraper`.

use crate::error::ExtractError;
use scraper::{ElementRef, Html, Selector};

pub trait Dom {
    type Node<'a>: Copy + PartialEq
    where
        Self: 'a;

    /// All elements matching `css`, in document order
    fn select<'a>(&'a self, css: &str) -> Result<Vec<Self::Node<'a>>, ExtractError>;

    /// Descendants of `scope` matching `css`, in document order
    fn select_within<'a>(
        &'a self,
        scope: Self::Node<'a>,
        css: &str,
    ) -> Result<Vec<Self::Node<'a>>, ExtractError>;

    /// First element with a direct text child containing `needle`
    fn find_label<'a>(&'a self, needle: &str, tag: Option<&str>) -> Option<Self::Node<'a>>;

    /// Following siblings of `node` matching `css`
    fn next_siblings<'a>(
        &'a self,
        node: Self::Node<'a>,
        css: &str,
    ) -> Result<Vec<Self::Node<'a>>, ExtractError>;

    /// Concatenated text of the element and its descendants, untrimmed
    fn text<'a>(&'a self, node: Self::Node<'a>) -> String;

    fn attr<'a>(&'a self, node: Self::Node<'a>, name: &str) -> Option<String>;
}

/// A parsed HTML document
pub struct HtmlPage {
    doc: Html,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

impl Dom for HtmlPage {
    type Node<'a> = ElementRef<'a>;

    fn select<'a>(&'a self, css: &str) -> Result<Vec<ElementRef<'a>>, ExtractError> {
        let selector = parse_selector(css)?;
        Ok(self.doc.select(&selector).collect())
    }

    fn select_within<'a>(
        &'a self,
        scope: ElementRef<'a>,
        css: &str,
    ) -> Result<Vec<ElementRef<'a>>, ExtractError> {
        let selector = parse_selector(css)?;
        Ok(scope.select(&selector).collect())
    }

    fn find_label<'a>(&'a self, needle: &str, tag: Option<&str>) -> Option<ElementRef<'a>> {
        self.doc
            .root_element()
            .descendants()
            .filter(|node| {
                node.value()
                    .as_text()
                    .is_some_and(|text| text.contains(needle))
            })
            .filter_map(|node| node.parent().and_then(ElementRef::wrap))
            .find(|el| tag.map_or(true, |t| el.value().name() == t))
    }

    fn next_siblings<'a>(
        &'a self,
        node: ElementRef<'a>,
        css: &str,
    ) -> Result<Vec<ElementRef<'a>>, ExtractError> {
        let selector = parse_selector(css)?;
        Ok(node
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|el| selector.matches(el))
            .collect())
    }

    fn text<'a>(&'a self, node: ElementRef<'a>) -> String {
        node.text().collect()
    }

    fn attr<'a>(&'a self, node: ElementRef<'a>, name: &str) -> Option<String> {
        node.value().attr(name).map(String::from)
    }
}
