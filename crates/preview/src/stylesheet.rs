//! Preview stylesheet transform and rebuild.
//!
//! The site stylesheet targets page-level containers that do not exist in a
//! preview, and the preview's own stylesheet uses high-specificity selectors.
//! The transform remaps the containers onto `html`/`body`, adds local
//! overrides, and scopes every rule under a selector only the preview
//! document matches.

use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Selector matching only the editor's rendered preview document.
pub const PREVIEW_SCOPE_PREFIX: &str = r#"html[style*="--markdown-font-family"]"#;

const OVERRIDES_BANNER: &str = "\n\n/* Preview overrides below: */\n\n";
const SITE_BANNER: &str = "\n\n/* DO CSS */\n\n";

static RULE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{}]+?)(\{[^{}]+?\})").expect("rule block regex"));

static CONTAINER_REWRITES: LazyLock<[(Regex, &'static str); 3]> = LazyLock::new(|| {
    [
        (r"(?i)\.tutorial-single", "html"),
        (r"(?i)\.section-content", "body"),
        (r"(?i)\.content-body", "body"),
    ]
    .map(|(pattern, replacement)| {
        (Regex::new(pattern).expect("container regex"), replacement)
    })
});

/// Errors raised while rebuilding the preview stylesheet.
#[derive(Debug, Error)]
pub enum StylesheetError {
    /// The raw stylesheet could not be obtained.
    #[error("stylesheet source failed: {0}")]
    Source(String),
    /// Reading or writing a stylesheet file failed.
    #[error("stylesheet io error: {0}")]
    Io(#[from] io::Error),
}

/// Supplies the raw site stylesheet.
pub trait StylesheetSource {
    /// Fetch the stylesheet text.
    fn raw_stylesheet(&self) -> Result<String, StylesheetError>;
}

impl<F> StylesheetSource for F
where
    F: Fn() -> Result<String, StylesheetError>,
{
    fn raw_stylesheet(&self) -> Result<String, StylesheetError> {
        self()
    }
}

/// A previously downloaded stylesheet on disk.
#[derive(Debug, Clone)]
pub struct CachedStylesheet {
    path: PathBuf,
}

impl CachedStylesheet {
    /// Read the stylesheet cached at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StylesheetSource for CachedStylesheet {
    fn raw_stylesheet(&self) -> Result<String, StylesheetError> {
        Ok(fs::read_to_string(&self.path)?)
    }
}

/// Prefix the selector of every `selector{declarations}` pair.
///
/// Leading whitespace and comments stay attached to the selector, after the
/// prefix. Nested blocks such as `@media` only get their inner rules prefixed.
pub fn prefix_css_lines(css: &str, prefix: &str) -> String {
    RULE_BLOCK
        .replace_all(css, |caps: &regex::Captures<'_>| {
            format!("{prefix} {}{}", &caps[1], &caps[2])
        })
        .into_owned()
}

/// Turn the raw site stylesheet into the preview stylesheet.
pub fn transform_stylesheet(raw: &str, overrides: &str) -> String {
    let mut fixed = raw.to_string();
    for (pattern, replacement) in CONTAINER_REWRITES.iter() {
        fixed = pattern.replace_all(&fixed, *replacement).into_owned();
    }

    let combined = format!("{OVERRIDES_BANNER}{overrides}{SITE_BANNER}{fixed}");
    prefix_css_lines(&combined, PREVIEW_SCOPE_PREFIX)
}

/// Regenerate the preview stylesheet at `output`.
///
/// The file is replaced only once the new stylesheet is complete, so a failed
/// rebuild leaves the previous output usable.
pub fn rebuild_stylesheet(
    source: &dyn StylesheetSource,
    overrides: &str,
    output: &Path,
) -> Result<PathBuf, StylesheetError> {
    let raw = source.raw_stylesheet()?;
    let css = transform_stylesheet(&raw, overrides);

    let mut staging = output.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    fs::write(&staging, css)?;
    if let Err(err) = fs::rename(&staging, output) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }
    log::debug!("rebuilt preview stylesheet at {}", output.display());
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Per-test directory, removed on drop.
    struct Scratch(PathBuf);

    impl Scratch {
        fn new(test: &str) -> Self {
            static NEXT: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
            let seq = NEXT.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock")
                .as_nanos();
            let dir = std::env::temp_dir().join(format!(
                "doco-stylesheet-{}-{test}-{nanos}-{seq}",
                std::process::id()
            ));
            fs::create_dir_all(&dir).expect("scratch dir");
            Self(dir)
        }

        fn file(&self, name: &str) -> PathBuf {
            self.0.join(name)
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn prefixes_each_rule() {
        assert_eq!(
            prefix_css_lines("body{margin:0}\n.note{color:red}", "P"),
            "P body{margin:0}P \n.note{color:red}"
        );
    }

    #[test]
    fn prefixes_inside_media_blocks() {
        assert_eq!(
            prefix_css_lines("@media print{.a{b:c}}", "P"),
            "@media print{P .a{b:c}}"
        );
    }

    #[test]
    fn remaps_page_containers() {
        let out = transform_stylesheet(".Tutorial-Single .content-body{x:y}", "");
        assert!(out.ends_with("html body{x:y}"), "{out}");
    }

    #[test]
    fn overrides_come_first() {
        let out = transform_stylesheet(".a{b:c}", "pre{d:e}");
        let prefix = PREVIEW_SCOPE_PREFIX;
        assert_eq!(
            out,
            format!(
                "{prefix} \n\n/* Preview overrides below: */\n\npre{{d:e}}{prefix} \n\n/* DO CSS */\n\n.a{{b:c}}"
            )
        );
    }

    #[test]
    fn rebuild_writes_output() {
        let scratch = Scratch::new("rebuild");
        let output = scratch.file("ok.css");
        let source = || Ok::<_, StylesheetError>(".a{b:c}".to_string());
        let path = rebuild_stylesheet(&source, "", &output).expect("rebuild");
        let written = fs::read_to_string(&path).expect("read");
        assert!(written.ends_with(".a{b:c}"));
    }

    #[test]
    fn failed_rebuild_keeps_previous_output() {
        let scratch = Scratch::new("keep");
        let output = scratch.file("keep.css");
        fs::write(&output, "previous").expect("seed");
        let source = || Err::<String, _>(StylesheetError::Source("offline".into()));
        assert!(rebuild_stylesheet(&source, "", &output).is_err());
        assert_eq!(fs::read_to_string(&output).expect("read"), "previous");
    }

    #[test]
    fn cached_source_reads_file() {
        let scratch = Scratch::new("cached");
        let raw = scratch.file("raw.css");
        fs::write(&raw, ".tutorial-single{a:b}").expect("seed");
        let css = CachedStylesheet::new(&raw).raw_stylesheet().expect("read");
        assert_eq!(css, ".tutorial-single{a:b}");
    }

    #[test]
    fn scratch_dirs_are_unique_and_removed() {
        let first = Scratch::new("cleanup");
        let second = Scratch::new("cleanup");
        assert_ne!(first.0, second.0);

        let dir = first.0.clone();
        fs::write(first.file("x.css"), "a").expect("seed");
        drop(first);
        assert!(!dir.exists());
    }
}
