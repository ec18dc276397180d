//! Markdown parsing adapter over markdown-rs and text transform hooks.

use crate::{DocoError, SourceLocation};
use markdown::message::{Message, Place};
use std::borrow::Cow;

/// Construct switches used to build markdown-rs options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// GFM tables.
    pub table: bool,
    /// GFM strikethrough (`~~text~~`).
    pub strikethrough: bool,
    /// Block-level raw HTML.
    pub html_flow: bool,
    /// Inline raw HTML.
    pub html_text: bool,
    /// Inline math (`$x$`).
    pub math_text: bool,
    /// Block math (`$$ ... $$`).
    pub math_flow: bool,
}

impl ParseOptions {
    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let constructs = markdown::Constructs {
            gfm_table: self.table,
            gfm_strikethrough: self.strikethrough,
            html_flow: self.html_flow,
            html_text: self.html_text,
            math_text: self.math_text,
            math_flow: self.math_flow,
            ..markdown::Constructs::default()
        };

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math_text,
            ..markdown::ParseOptions::default()
        }
    }

    /// Convert to full markdown-rs `Options`, passing raw HTML through on compile.
    pub fn to_html_options(self) -> markdown::Options {
        markdown::Options {
            parse: self.to_markdown(),
            compile: markdown::CompileOptions {
                allow_dangerous_html: self.html_flow || self.html_text,
                ..markdown::CompileOptions::default()
            },
        }
    }
}

/// Trait for preprocessing raw markdown text before parsing.
pub trait TextTransform {
    /// Transform the input markdown text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Compile markdown straight to HTML.
pub fn render_html(input: &str, options: &ParseOptions) -> Result<String, DocoError> {
    markdown::to_html_with_options(input, &options.to_html_options())
        .map_err(|err| adapter_error(&err))
}

fn adapter_error(message: &Message) -> DocoError {
    DocoError::MarkdownAdapter {
        message: message.to_string(),
        location: message_location(message),
    }
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}
