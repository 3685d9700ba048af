//! LaTeX math rendering via pulldown-latex -> MathML.
//!
//! The pipeline per call: empty-input placeholder, environment compat
//! rewrites, macro expansion against the fixed table (see `macros`), then
//! MathML generation. A conflicting `\newcommand` is auto-converted to
//! `\renewcommand` and retried, at most once per macro name per call, so an
//! interactively edited formula that redefines its own macros still renders.

use std::collections::HashSet;
use std::sync::LazyLock;

use pulldown_latex::{
    Parser, Storage, config::DisplayMode, config::RenderConfig, mathml::push_mathml,
};
use regex::Regex;

use crate::macros;

/// Result of attempting to render LaTeX math.
#[derive(Debug)]
pub enum MathResult {
    /// Successfully rendered MathML.
    Html(String),
    /// Rendering failed; the message is shown inline by the caller.
    Error(String),
}

/// Substitute for empty input: an empty fragment cannot be seen or selected
/// in the preview.
const EMPTY_PLACEHOLDER: &str = "\\text{LaTeX}";

const RENEW_SUFFIX: &str = "use \\renewcommand";

static BEGIN_EQNARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\{eqnarray\*?\}").unwrap());
static END_EQNARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\end\{eqnarray\*?\}").unwrap());

/// Render a LaTeX source string in inline or display mode.
pub fn render_math(latex: &str, display_mode: bool) -> MathResult {
    let mut rewritten = HashSet::new();
    render_inner(latex, display_mode, &mut rewritten)
}

/// Render a span that still carries its delimiters: `$$...$$` is display
/// math, `$...$` is inline, anything else is rendered as display.
pub fn render_math_delimited(source: &str) -> MathResult {
    if let Some(body) = source.strip_prefix("$$") {
        let body = body.strip_suffix("$$").unwrap_or(body);
        render_math(body, true)
    } else if let Some(body) = source.strip_prefix('$') {
        let body = body.strip_suffix('$').unwrap_or(body);
        render_math(body, false)
    } else {
        render_math(source, true)
    }
}

fn render_inner(latex: &str, display_mode: bool, rewritten: &mut HashSet<String>) -> MathResult {
    let source = if latex.trim().is_empty() {
        EMPTY_PLACEHOLDER.to_owned()
    } else {
        latex.to_owned()
    };
    let source = compat_rewrites(&source);

    let expanded = match macros::expand(&source) {
        Ok(expanded) => expanded,
        Err(message) => return retry_or_error(&source, display_mode, message, rewritten),
    };

    match render_mathml(&expanded, display_mode) {
        Ok(mathml) => MathResult::Html(mathml),
        Err(message) => MathResult::Error(message),
    }
}

/// Handle a macro-pass failure: a redefinition conflict is healed by
/// rewriting the conflicting `\newcommand` to `\renewcommand` and retrying,
/// once per macro name per top-level call. Anything else surfaces as-is.
fn retry_or_error(
    source: &str,
    display_mode: bool,
    message: String,
    rewritten: &mut HashSet<String>,
) -> MathResult {
    if message.ends_with(RENEW_SUFFIX) {
        if let Some(name) = redefined_macro_name(&message) {
            if !rewritten.contains(&name) && macros::is_defined_by(source, &name) {
                if let Some(healed) = macros::renew_conflicting(source, &name) {
                    tracing::debug!(
                        target: "inkpad::math",
                        %name,
                        "converting newcommand to renewcommand and retrying"
                    );
                    rewritten.insert(name);
                    return render_inner(&healed, display_mode, rewritten);
                }
            }
        }
    }
    MathResult::Error(message)
}

/// Parse the offending macro name out of the error text: between
/// `redefine ` and the final `;`.
fn redefined_macro_name(message: &str) -> Option<String> {
    let start = message.find("redefine ")? + "redefine ".len();
    let end = message.rfind(';')?;
    (start < end).then(|| message[start..end].to_owned())
}

/// Rewrite `eqnarray`/`eqnarray*` to an array with the same three
/// left/center/right columns; the MathML renderer has no native support for
/// the environment.
fn compat_rewrites(math: &str) -> String {
    if !math.contains("\\begin{eqnarray") {
        return math.to_owned();
    }
    let math = BEGIN_EQNARRAY.replace_all(math, r"\begin{array}{rcl}");
    END_EQNARRAY.replace_all(&math, r"\end{array}").into_owned()
}

fn render_mathml(latex: &str, display_mode: bool) -> Result<String, String> {
    let storage = Storage::new();
    let parser = Parser::new(latex, &storage);
    let config = RenderConfig {
        display_mode: if display_mode {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        },
        ..Default::default()
    };

    let mut mathml = String::new();

    // Collect events first so parse errors can be reported together.
    let events: Vec<_> = parser.collect();
    let errors: Vec<String> = events
        .iter()
        .filter_map(|e| e.as_ref().err().map(|err| err.to_string()))
        .collect();

    if !errors.is_empty() {
        return Err(errors.join("; "));
    }
    push_mathml(&mut mathml, events.into_iter(), config).map_err(|e| e.to_string())?;
    Ok(mathml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_inline_math() {
        let result = render_math("x^2", false);
        let MathResult::Html(mathml) = result else {
            panic!("expected success");
        };
        assert!(mathml.contains("<math"));
        assert!(mathml.contains("</math>"));
    }

    #[test]
    fn renders_display_math() {
        let result = render_math(r"\frac{a}{b}", true);
        let MathResult::Html(mathml) = result else {
            panic!("expected success");
        };
        assert!(mathml.contains("<mfrac"));
    }

    #[test]
    fn handles_invalid_latex() {
        let result = render_math(r"\frac{a", false);
        let MathResult::Error(message) = result else {
            panic!("expected error");
        };
        assert!(!message.is_empty());
    }

    #[test]
    fn empty_input_renders_placeholder() {
        let result = render_math("   ", false);
        assert!(matches!(result, MathResult::Html(_)));
    }

    #[test]
    fn table_macros_render() {
        let result = render_math(r"\ZZ \oplus \QQbar", false);
        assert!(matches!(result, MathResult::Html(_)));
    }

    #[test]
    fn delimited_entry_point_strips_dollars() {
        let inline = render_math_delimited("$x$");
        assert!(matches!(inline, MathResult::Html(_)));
        let display = render_math_delimited("$$x$$");
        assert!(matches!(display, MathResult::Html(_)));
    }

    #[test]
    fn eqnarray_is_rewritten_to_array() {
        let rewritten = compat_rewrites(r"\begin{eqnarray}a &=& b\end{eqnarray}");
        assert_eq!(rewritten, r"\begin{array}{rcl}a &=& b\end{array}");

        let starred = compat_rewrites(r"\begin{eqnarray*}x\end{eqnarray*}");
        assert_eq!(starred, r"\begin{array}{rcl}x\end{array}");
    }

    #[test]
    fn second_definition_is_healed() {
        let source = r"\newcommand{\foo}{a}\foo + \newcommand{\foo}{b}\foo";
        assert!(matches!(render_math(source, false), MathResult::Html(_)));
    }

    #[test]
    fn table_conflict_is_healed() {
        let source = r"\newcommand{\RR}{\mathbb{R}}\RR";
        assert!(matches!(render_math(source, false), MathResult::Html(_)));
    }

    #[test]
    fn third_redefinition_surfaces_an_error() {
        let source = r"\newcommand{\f}{1}\newcommand{\f}{2}\newcommand{\f}{3}\f";
        let MathResult::Error(message) = render_math(source, false) else {
            panic!("expected error");
        };
        assert!(message.ends_with(RENEW_SUFFIX), "{message}");
    }

    #[test]
    fn redefined_name_is_parsed_from_message() {
        let message = "Error: attempting to redefine \\foo; use \\renewcommand";
        assert_eq!(redefined_macro_name(message).as_deref(), Some("\\foo"));
    }
}
