//! Element locators
//!
//! A `Locator` names an element selection strategy and its query string,
//! and maps onto the W3C `using`/`value` pair sent to the driver.

use std::borrow::Cow;
use std::fmt;

/// Selection strategy for locating elements on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector (e.g., "button.submit-btn")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Element id attribute
    Id(String),
    /// Exact link text
    LinkText(String),
    /// Tag name
    TagName(String),
}

impl Locator {
    /// Create a CSS selector locator
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath locator
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create an id locator
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a link text locator
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Create a tag name locator
    pub fn tag_name(name: impl Into<String>) -> Self {
        Self::TagName(name.into())
    }

    /// The W3C location strategy string
    pub(crate) fn using(&self) -> &'static str {
        match self {
            Self::Css(_) | Self::Id(_) => "css selector",
            Self::XPath(_) => "xpath",
            Self::LinkText(_) => "link text",
            Self::TagName(_) => "tag name",
        }
    }

    /// The W3C selector value. Id locators are expressed as CSS, which is
    /// how the protocol models them.
    pub(crate) fn value(&self) -> Cow<'_, str> {
        match self {
            Self::Css(s) | Self::XPath(s) | Self::LinkText(s) | Self::TagName(s) => {
                Cow::Borrowed(s)
            }
            Self::Id(id) => Cow::Owned(format!("#{}", id)),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={}", s),
            Self::XPath(s) => write!(f, "xpath={}", s),
            Self::Id(s) => write!(f, "id={}", s),
            Self::LinkText(s) => write!(f, "link_text={}", s),
            Self::TagName(s) => write!(f, "tag={}", s),
        }
    }
}
