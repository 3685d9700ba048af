//! Inline formatting wrappers.
//!
//! Nesting order is fixed regardless of how the attributes were set:
//! bold innermost, then italics, underline, font family, font size, and
//! color outermost. Absent attributes contribute no layer.

use crate::document::TextRun;

pub(crate) fn wrap_marks(run: &TextRun, span: String) -> String {
    let mut out = span;
    if run.bold {
        out = format!("<strong>{out}</strong>");
    }
    if run.italics {
        out = format!("<em>{out}</em>");
    }
    if run.underline {
        out = format!("<u>{out}</u>");
    }
    if let Some(font) = &run.font {
        out = format!("<span style=\"font-family: {font}\">{out}</span>");
    }
    if let Some(size) = &run.size {
        out = format!("<span style=\"font-size: {size}\">{out}</span>");
    }
    if let Some(color) = &run.color {
        out = format!("<span style=\"color: {color}\">{out}</span>");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_marks_is_identity() {
        let run = TextRun::new("ignored");
        assert_eq!(wrap_marks(&run, "abc".into()), "abc");
    }

    #[test]
    fn bold_is_innermost_color_outermost() {
        let run = TextRun::new("")
            .with_bold()
            .with_color("#ff0000")
            .with_font("Arial");
        assert_eq!(
            wrap_marks(&run, "x".into()),
            "<span style=\"color: #ff0000\">\
             <span style=\"font-family: Arial\">\
             <strong>x</strong></span></span>"
        );
    }

    #[test]
    fn all_layers_nest_in_fixed_order() {
        let run = TextRun::new("")
            .with_bold()
            .with_italics()
            .with_underline()
            .with_font("Georgia")
            .with_size("16px")
            .with_color("#333333");
        assert_eq!(
            wrap_marks(&run, "t".into()),
            "<span style=\"color: #333333\">\
             <span style=\"font-size: 16px\">\
             <span style=\"font-family: Georgia\">\
             <u><em><strong>t</strong></em></u></span></span></span>"
        );
    }
}
