//! Stylesheet generation for the highlight classes.
//!
//! The preview surface needs CSS for the `hl-` classes emitted by
//! `code_pretty`; generating it from a syntect theme keeps the two in sync.

use syntect::highlighting::ThemeSet;
use syntect::html::css_for_theme_with_class_style;

use crate::RenderError;
use crate::code_pretty::CLASS_STYLE;

/// Generate CSS for the classes `code_pretty` emits, from a named default
/// theme (e.g. `"InspiredGitHub"` or `"base16-ocean.dark"`).
pub fn highlight_stylesheet(theme: &str) -> Result<String, RenderError> {
    let themes = ThemeSet::load_defaults();
    let theme = themes
        .themes
        .get(theme)
        .ok_or_else(|| RenderError::UnknownTheme {
            name: theme.to_owned(),
        })?;
    css_for_theme_with_class_style(theme, CLASS_STYLE).map_err(|err| RenderError::Stylesheet {
        message: err.to_string(),
    })
}
