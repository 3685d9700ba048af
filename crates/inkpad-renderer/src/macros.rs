//! The fixed macro table and the expansion pass applied before math
//! rendering.
//!
//! The MathML renderer processes each formula from a clean slate, so user
//! macros (`\newcommand` and friends) are resolved here: definitions are
//! consumed left to right and invocations are substituted textually, with a
//! bound on total substitutions so a self-referential definition cannot hang
//! a render pass. A `\newcommand` that collides with an existing definition
//! produces the error shape the retry path in `math` recognizes.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Macros available to every formula: blackboard-bold aliases plus a couple
/// of compatibility aliases the underlying renderer lacks.
pub static MACRO_TABLE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("\\Bold", "\\mathbb{#1}"),
        ("\\ZZ", "\\Bold{Z}"),
        ("\\NN", "\\Bold{N}"),
        ("\\RR", "\\Bold{R}"),
        ("\\CC", "\\Bold{C}"),
        ("\\FF", "\\Bold{F}"),
        ("\\QQ", "\\Bold{Q}"),
        ("\\QQbar", "\\overline{\\QQ}"),
        ("\\CDF", "\\Bold{C}"),
        ("\\CIF", "\\Bold{C}"),
        ("\\CLF", "\\Bold{C}"),
        ("\\RDF", "\\Bold{R}"),
        ("\\RIF", "\\Bold{I} \\Bold{R}"),
        ("\\RLF", "\\Bold{R}"),
        ("\\CFF", "\\Bold{CFF}"),
        ("\\GF", "\\Bold{F}_{#1}"),
        ("\\Zp", "\\ZZ_{#1}"),
        ("\\Qp", "\\QQ_{#1}"),
        ("\\Zmod", "\\ZZ/#1\\ZZ"),
        ("\\mbox", "\\text"),
    ])
});

/// Total substitutions allowed per call; exceeding this means a definition
/// cycle.
const EXPANSION_LIMIT: usize = 512;

/// Error shape for a conflicting `\newcommand`. The suffix and the
/// `redefine <name>;` segment are load-bearing: the retry path in `math`
/// parses the macro name back out of this message.
pub(crate) fn redefine_error(name: &str) -> String {
    format!("Error: attempting to redefine {name}; use \\renewcommand")
}

/// Expand all macro invocations in `source`, consuming definition commands.
///
/// Definitions (`\newcommand`, `\renewcommand`, `\providecommand`,
/// `\DeclareMathOperator`) are removed from the output and take effect for
/// the remainder of the formula. Unknown control words pass through for the
/// renderer to handle.
pub fn expand(source: &str) -> Result<String, String> {
    let mut defs: HashMap<String, String> = HashMap::new();
    let mut rest = source.to_owned();
    let mut out = String::with_capacity(source.len());
    let mut substitutions = 0usize;

    loop {
        let Some(slash) = rest.find('\\') else {
            out.push_str(&rest);
            return Ok(out);
        };
        out.push_str(&rest[..slash]);
        rest.replace_range(..slash, "");

        let word: String = rest[1..]
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        if word.is_empty() {
            // "\\", "\{", "\$" and friends: copy the backslash and the next
            // char verbatim so they never re-match.
            let next_len = rest[1..].chars().next().map_or(0, char::len_utf8);
            out.push_str(&rest[..1 + next_len]);
            rest.replace_range(..1 + next_len, "");
            continue;
        }

        let name_len = 1 + word.len();
        match word.as_str() {
            "newcommand" | "renewcommand" | "providecommand" => {
                let Some((target, after_target)) = read_group(&rest[name_len..]) else {
                    out.push_str(&rest[..name_len]);
                    rest.replace_range(..name_len, "");
                    continue;
                };
                let mut consumed = name_len + after_target;
                consumed += skip_optional_bracket(&rest[consumed..]);
                let Some((body, after_body)) = read_group(&rest[consumed..]) else {
                    out.push_str(&rest[..name_len]);
                    rest.replace_range(..name_len, "");
                    continue;
                };
                consumed += after_body;

                let target = target.trim().to_owned();
                match word.as_str() {
                    "newcommand" => {
                        if is_defined(&defs, &target) {
                            return Err(redefine_error(&target));
                        }
                        defs.insert(target, body);
                    }
                    "renewcommand" => {
                        defs.insert(target, body);
                    }
                    _ => {
                        if !is_defined(&defs, &target) {
                            defs.insert(target, body);
                        }
                    }
                }
                rest.replace_range(..consumed, "");
            }
            "DeclareMathOperator" => {
                let Some((target, after_target)) = read_group(&rest[name_len..]) else {
                    out.push_str(&rest[..name_len]);
                    rest.replace_range(..name_len, "");
                    continue;
                };
                let mut consumed = name_len + after_target;
                let Some((operator, after_operator)) = read_group(&rest[consumed..]) else {
                    out.push_str(&rest[..name_len]);
                    rest.replace_range(..name_len, "");
                    continue;
                };
                consumed += after_operator;

                let target = target.trim().to_owned();
                if !is_defined(&defs, &target) {
                    defs.insert(target, format!("\\operatorname{{{operator}}}"));
                }
                rest.replace_range(..consumed, "");
            }
            _ => {
                let name = format!("\\{word}");
                let body = defs
                    .get(&name)
                    .cloned()
                    .or_else(|| MACRO_TABLE.get(name.as_str()).map(|s| (*s).to_owned()));
                match body {
                    Some(body) => {
                        substitutions += 1;
                        if substitutions > EXPANSION_LIMIT {
                            return Err(format!(
                                "macro expansion limit exceeded while expanding {name}"
                            ));
                        }
                        let arity = arity_of(&body);
                        let mut consumed = name_len;
                        let mut args = Vec::with_capacity(arity);
                        for _ in 0..arity {
                            match read_argument(&rest[consumed..]) {
                                Some((arg, used)) => {
                                    consumed += used;
                                    args.push(arg);
                                }
                                None => args.push(String::new()),
                            }
                        }
                        // Splice the substitution back in so it is itself
                        // re-expanded.
                        let replacement = substitute(&body, &args);
                        rest.replace_range(..consumed, &replacement);
                    }
                    None => {
                        out.push_str(&rest[..name_len]);
                        rest.replace_range(..name_len, "");
                    }
                }
            }
        }
    }
}

/// Whether `name` has a definition visible to `source`: either the fixed
/// table or a definition command inside the source itself. Explicit lookup,
/// no ambient state.
pub(crate) fn is_defined_by(source: &str, name: &str) -> bool {
    MACRO_TABLE.contains_key(name) || !defining_positions(source, name).is_empty()
}

/// Rewrite the first `\newcommand{name...}` that actually conflicts - the
/// first occurrence at which `name` is already defined in left-to-right
/// order - into `\renewcommand{name...}`.
pub(crate) fn renew_conflicting(source: &str, name: &str) -> Option<String> {
    let mut defined = MACRO_TABLE.contains_key(name);
    for (at, is_new) in defining_positions(source, name) {
        if is_new && defined {
            let mut healed = String::with_capacity(source.len() + 2);
            healed.push_str(&source[..at]);
            healed.push_str("\\renewcommand{");
            healed.push_str(name);
            healed.push_str(&source[at + "\\newcommand{".len() + name.len()..]);
            return Some(healed);
        }
        defined = true;
    }
    None
}

/// Positions at which `name` gains a definition, in document order. The
/// second element marks `\newcommand` (the only form that can conflict).
fn defining_positions(source: &str, name: &str) -> Vec<(usize, bool)> {
    let mut events: Vec<(usize, bool)> = Vec::new();
    for (form, is_new) in [
        ("\\newcommand{", true),
        ("\\renewcommand{", false),
        ("\\providecommand{", false),
        ("\\DeclareMathOperator{", false),
    ] {
        let needle = format!("{form}{name}");
        let mut from = 0;
        while let Some(rel) = source[from..].find(&needle) {
            let at = from + rel;
            let tail = &source[at + needle.len()..];
            // Reject prefix collisions such as \f matching \fbar.
            if !tail.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                events.push((at, is_new));
            }
            from = at + needle.len();
        }
    }
    events.sort_unstable();
    events
}

fn is_defined(defs: &HashMap<String, String>, name: &str) -> bool {
    defs.contains_key(name) || MACRO_TABLE.contains_key(name)
}

/// Read a `{...}` group (nested braces allowed) after optional whitespace.
/// Returns the body and the total bytes consumed.
fn read_group(input: &str) -> Option<(String, usize)> {
    let skipped = input.len() - input.trim_start().len();
    let rest = &input[skipped..];
    if !rest.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((rest[1..i].to_owned(), skipped + i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Read one macro argument: a brace group, a control word, or a single char.
fn read_argument(input: &str) -> Option<(String, usize)> {
    if let Some(group) = read_group(input) {
        return Some(group);
    }
    let skipped = input.len() - input.trim_start().len();
    let rest = &input[skipped..];
    let first = rest.chars().next()?;
    if first == '\\' {
        let word: String = rest[1..]
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        if !word.is_empty() {
            return Some((format!("\\{word}"), skipped + 1 + word.len()));
        }
        let escaped = rest[1..].chars().next()?;
        let len = 1 + escaped.len_utf8();
        return Some((rest[..len].to_owned(), skipped + len));
    }
    Some((first.to_string(), skipped + first.len_utf8()))
}

/// Skip a `[...]` option after optional whitespace, if present.
fn skip_optional_bracket(input: &str) -> usize {
    let skipped = input.len() - input.trim_start().len();
    let rest = &input[skipped..];
    if !rest.starts_with('[') {
        return 0;
    }
    match rest.find(']') {
        Some(end) => skipped + end + 1,
        None => 0,
    }
}

/// Highest `#n` parameter referenced by a macro body.
fn arity_of(body: &str) -> usize {
    let mut arity = 0usize;
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '#' {
            if let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                arity = arity.max(d as usize);
            }
        }
    }
    arity
}

fn substitute(body: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '#' {
            if let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                chars.next();
                if let Some(arg) = args.get(d as usize - 1) {
                    out.push_str(arg);
                }
                continue;
            }
        }
        out.push(c);
    }
    out
}
