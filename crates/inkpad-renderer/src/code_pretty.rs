//! Classed syntax highlighting for fenced code spans.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::RenderError;
use crate::utils::escape_html;

/// Class prefix shared between highlighted output and the stylesheet
/// generator.
pub const CSS_PREFIX: &str = "hl-";

pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: CSS_PREFIX };

/// Highlight `code` and write a `<pre><code>` fragment into `output`.
///
/// Unknown language tokens fall back to the plain-text syntax, so every
/// input produces a fragment; unrecognized tokens within a known language
/// are the tokenizer's problem and come back as plain spans.
pub fn highlight(
    syntax_set: &SyntaxSet,
    language: Option<&str>,
    code: &str,
    output: &mut String,
) -> Result<(), RenderError> {
    let token = language.unwrap_or("text");
    let syntax =
        find_syntax(syntax_set, token).unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut source = code.to_owned();
    if !source.ends_with('\n') {
        source.push('\n');
    }

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, CLASS_STYLE);
    for line in LinesWithEndings::from(source.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| RenderError::Highlight {
                language: token.to_owned(),
                message: err.to_string(),
            })?;
    }

    output.push_str("<pre class=\"hl-code\"><code class=\"language-");
    escape_html(output, token);
    output.push_str("\">");
    output.push_str(&generator.finalize());
    output.push_str("</code></pre>");
    Ok(())
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}
