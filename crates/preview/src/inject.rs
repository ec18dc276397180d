//! Stylesheet injection for rendered preview documents.
//!
//! The rendered surface cannot ask the resolver anything, so it treats the
//! wrapper element as the enablement signal: when present, its
//! `data-css-uri` stylesheet gets linked once.

use doco_core::DocoError;
use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use std::borrow::Cow;
use std::cell::{Cell, RefCell};

use crate::wrapper::{CSS_URI_ATTR, WRAPPER_CLASS};

#[derive(Debug, Default)]
struct Survey {
    css_uri: Option<String>,
    linked: Vec<String>,
    has_head: bool,
}

/// Link the wrapper's stylesheet into `html` unless it is linked already.
///
/// The link goes at the end of `<head>`, or right before the wrapper when
/// the document has no head. Documents without a wrapper come back as-is.
pub fn inject_stylesheet(html: &str) -> Result<Cow<'_, str>, DocoError> {
    let survey = survey(html)?;
    let Some(uri) = survey.css_uri.filter(|uri| !uri.is_empty()) else {
        return Ok(Cow::Borrowed(html));
    };
    if survey.linked.iter().any(|href| *href == uri) {
        log::debug!("stylesheet {uri} already linked");
        return Ok(Cow::Borrowed(html));
    }

    let link = format!(
        "<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\" data-is-injected=\"true\">",
        html_escape::encode_double_quoted_attribute(&uri)
    );
    let inserted = Cell::new(false);
    let wrapper_selector = format!(".{WRAPPER_CLASS}");

    let handler = if survey.has_head {
        element!("head", |el| {
            if !inserted.replace(true) {
                el.append(&link, ContentType::Html);
            }
            Ok(())
        })
    } else {
        element!(wrapper_selector, |el| {
            if !inserted.replace(true) {
                el.before(&link, ContentType::Html);
            }
            Ok(())
        })
    };

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![handler],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| DocoError::render_error(err.to_string()))?;
    Ok(Cow::Owned(output))
}

fn survey(html: &str) -> Result<Survey, DocoError> {
    let survey = RefCell::new(Survey::default());
    let wrapper_selector = format!(".{WRAPPER_CLASS}");

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(wrapper_selector, |el| {
                    let mut survey = survey.borrow_mut();
                    if survey.css_uri.is_none() {
                        survey.css_uri = el.get_attribute(CSS_URI_ATTR);
                    }
                    Ok(())
                }),
                element!("link[href]", |el| {
                    if let Some(href) = el.get_attribute("href") {
                        survey.borrow_mut().linked.push(href);
                    }
                    Ok(())
                }),
                element!("head", |_el| {
                    survey.borrow_mut().has_head = true;
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| DocoError::render_error(err.to_string()))?;

    Ok(survey.into_inner())
}
