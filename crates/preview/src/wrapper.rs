//! Wrapper tokens that mark enabled output for the rendered surface.

use std::collections::BTreeMap;

use crate::processor::Token;

/// Class carried by the wrapper element.
pub const WRAPPER_CLASS: &str = "do-co-authoring-toolkit-wrapper";

/// Attribute holding the stylesheet locator.
pub const CSS_URI_ATTR: &str = "data-css-uri";

const WRAPPER_TAG: &str = "div";

/// Open/close marker pair bracketing enabled output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wrapper {
    data: BTreeMap<String, String>,
}

impl Wrapper {
    /// A wrapper with no data attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a data attribute. Keys without a `data-` prefix gain one.
    pub fn with_data(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        let key = key.as_ref();
        let key = if key.starts_with("data-") {
            key.to_string()
        } else {
            format!("data-{key}")
        };
        self.data.insert(key, value.into());
        self
    }

    /// Attach the stylesheet locator.
    pub fn with_css_uri(self, uri: impl Into<String>) -> Self {
        self.with_data(CSS_URI_ATTR, uri)
    }

    /// Data attributes, sorted by key.
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Leading marker token.
    pub fn open_token(&self) -> Token {
        let mut attrs = Vec::with_capacity(self.data.len() + 1);
        attrs.push(("class".to_string(), WRAPPER_CLASS.to_string()));
        attrs.extend(self.data.iter().map(|(k, v)| (k.clone(), v.clone())));
        Token::WrapperOpen {
            tag: WRAPPER_TAG.to_string(),
            attrs,
        }
    }

    /// Trailing marker token.
    pub fn close_token(&self) -> Token {
        Token::WrapperClose {
            tag: WRAPPER_TAG.to_string(),
        }
    }

    /// Bracket `tokens` with the marker pair.
    pub fn wrap(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut wrapped = Vec::with_capacity(tokens.len() + 2);
        wrapped.push(self.open_token());
        wrapped.extend(tokens);
        wrapped.push(self.close_token());
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_tokens() {
        let wrapper = Wrapper::new().with_css_uri("file:///tmp/do.css");
        let tokens = wrapper.wrap(vec![Token::Html {
            content: "<p>x</p>".into(),
        }]);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2], wrapper.close_token());

        let mut html = String::new();
        for token in &tokens {
            token.render_into(&mut html);
        }
        insta::assert_snapshot!(html, @r#"<div class="do-co-authoring-toolkit-wrapper" data-css-uri="file:///tmp/do.css"><p>x</p></div>"#);
    }

    #[test]
    fn prefixes_data_keys() {
        let wrapper = Wrapper::new().with_data("mode", "draft");
        assert_eq!(wrapper.data().get("data-mode").map(String::as_str), Some("draft"));
    }
}
