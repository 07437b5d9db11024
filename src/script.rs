//! Piecewise expression script generation plus the two marker scans.
//!
//! The generated script is a fixed micro-grammar (`if/else if/else` buckets
//! assigning `$a=map('...')`), not a language: this module only ever emits it
//! and pattern-matches two narrow markers in pre-existing scripts. No parser.

use lazy_static::lazy_static;
use regex::Regex;

use crate::cache::FrameRange;
use crate::error::{BakeError, BakeResult};

/// Sentinel variable every map-driven expression assigns.
pub const DEFAULT_EXPRESSION: &str = "$a";

/// Banner emitted ahead of the generated conditionals.
const HEADER: &[&str] = &[
    "# This script has been generated by the animated maps baker.",
    "# You're free to modify it as you please, just remember to do that with care.",
    "# You may be surprised by the enormous size of the script, considering the alleged ability to",
    "# assign multiple expression variables within strings, yet this is the safest way of",
    "# providing animated maps to procedural channels.",
    "",
];

lazy_static! {
    /// `=map('<path>'` on a line that is not a comment.
    static ref ASSIGNED_MAP: Regex =
        Regex::new(r"(?m)^[^#\r\n]*=\s*map\('([^']*)'").expect("static regex");
}

/// Map path currently assigned in `script`, with the `${DESC}` placeholder
/// stripped. None means no map is assigned and baking must not start.
pub fn assigned_map(script: &str) -> Option<String> {
    ASSIGNED_MAP
        .captures(script)
        .map(|caps| caps[1].replace("${DESC}", ""))
}

/// Last line of `script` containing the `$a` sentinel, scanned from the end.
/// Used to carry the previous script's trailing expression across a re-bake.
pub fn previous_expression(script: &str) -> Option<String> {
    script
        .lines()
        .rev()
        .find(|line| line.contains(DEFAULT_EXPRESSION))
        .map(str::to_owned)
}

/// Trailing fallback line: user override first, then the previous script's
/// `$a` line, then the bare sentinel.
pub fn fallback_expression(override_expr: Option<&str>, previous_script: &str) -> String {
    override_expr
        .map(str::to_owned)
        .or_else(|| previous_expression(previous_script))
        .unwrap_or_else(|| DEFAULT_EXPRESSION.to_owned())
}

/// Accumulates one conditional bucket per baked frame, in bake order.
///
/// Phases are strictly Header -> Body -> Footer: the banner is emitted on
/// construction, [`push_frame`](Self::push_frame) appends body buckets in
/// ascending frame order, and [`finish`](Self::finish) seals the script with
/// exactly one fallback line.
///
/// Bucket shape over `[start, end)`: the first frame opens with
/// `if ($frame <= start)`, the last frame (`end - 1`) becomes the inclusive
/// `else` bucket, everything between is `else if`. A single-frame range emits
/// a lone `if`; later frames then fall through to the fallback line.
#[derive(Debug)]
pub struct ExpressionCompiler {
    range: FrameRange,
    lines: Vec<String>,
    last_frame: Option<i32>,
}

impl ExpressionCompiler {
    pub fn new(range: FrameRange) -> Self {
        Self {
            range,
            lines: HEADER.iter().map(|s| s.to_string()).collect(),
            last_frame: None,
        }
    }

    /// Number of body fragments appended so far.
    pub fn frame_count(&self) -> usize {
        self.lines.len().saturating_sub(HEADER.len()) / 3
    }

    /// Append the conditional bucket for one baked frame.
    ///
    /// `map_ref` is the `${DESC}`-rooted artifact reference; resolution of
    /// the placeholder belongs to the host.
    ///
    /// Frames outside the range are rejected; together with the ascending
    /// order check this means no bucket can ever follow the final `else`.
    pub fn push_frame(&mut self, frame: i32, map_ref: &str) -> BakeResult<()> {
        if !self.range.contains(frame) {
            return Err(BakeError::FrameOutOfRange {
                frame,
                start: self.range.start(),
                end: self.range.end(),
            });
        }
        if let Some(last) = self.last_frame {
            if frame <= last {
                return Err(BakeError::OutOfOrder { got: frame, last });
            }
        }

        if frame == self.range.start() {
            self.lines.push(format!("if ($frame <= {}) {{", frame));
        } else if Some(frame) == self.range.last() {
            self.lines.push("else {".to_owned());
        } else {
            self.lines.push(format!("else if ($frame <= {}) {{", frame));
        }
        self.lines.push(format!("\t$a=map('{}');", map_ref));
        self.lines.push("}".to_owned());

        self.last_frame = Some(frame);
        Ok(())
    }

    /// Seal the script with the trailing fallback expression.
    ///
    /// Fails with [`BakeError::EmptyScript`] if nothing was baked; an empty
    /// conditional chain would leave the attribute without a map and must be
    /// surfaced upstream instead of committed.
    pub fn finish(mut self, fallback: &str) -> BakeResult<String> {
        if self.last_frame.is_none() {
            return Err(BakeError::EmptyScript);
        }
        self.lines.push(fallback.to_owned());
        let mut script = self.lines.join("\n");
        script.push('\n');
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_three() -> String {
        let range = FrameRange::new(0, 3);
        let mut compiler = ExpressionCompiler::new(range);
        for frame in range.frames() {
            compiler
                .push_frame(frame, &format!("${{DESC}}/paintmaps/length/head.{}.ptx", frame))
                .unwrap();
        }
        compiler.finish("$a").unwrap()
    }

    #[test]
    fn test_three_frames_emit_if_elseif_else() {
        let script = compile_three();
        let body: Vec<&str> = script
            .lines()
            .filter(|l| !l.starts_with('#') && !l.is_empty())
            .collect();
        assert_eq!(
            body,
            vec![
                "if ($frame <= 0) {",
                "\t$a=map('${DESC}/paintmaps/length/head.0.ptx');",
                "}",
                "else if ($frame <= 1) {",
                "\t$a=map('${DESC}/paintmaps/length/head.1.ptx');",
                "}",
                "else {",
                "\t$a=map('${DESC}/paintmaps/length/head.2.ptx');",
                "}",
                "$a",
            ]
        );
    }

    #[test]
    fn test_header_banner_precedes_body() {
        let script = compile_three();
        assert!(script.starts_with('#'));
        let first_code = script.lines().find(|l| !l.starts_with('#') && !l.is_empty());
        assert_eq!(first_code, Some("if ($frame <= 0) {"));
    }

    #[test]
    fn test_footer_uses_override() {
        let range = FrameRange::new(0, 1);
        let mut compiler = ExpressionCompiler::new(range);
        compiler.push_frame(0, "${DESC}/paintmaps/a/m.0.ptx").unwrap();
        let script = compiler.finish("$a * $noise").unwrap();
        assert_eq!(script.lines().last(), Some("$a * $noise"));
    }

    #[test]
    fn test_single_frame_range_emits_lone_if() {
        let range = FrameRange::new(4, 5);
        let mut compiler = ExpressionCompiler::new(range);
        compiler.push_frame(4, "${DESC}/paintmaps/a/m.4.ptx").unwrap();
        let script = compiler.finish("$a").unwrap();
        assert!(script.contains("if ($frame <= 4) {"));
        assert!(!script.contains("else"));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut compiler = ExpressionCompiler::new(FrameRange::new(0, 5));
        compiler.push_frame(0, "x").unwrap();
        compiler.push_frame(2, "x").unwrap();
        assert!(matches!(
            compiler.push_frame(1, "x"),
            Err(BakeError::OutOfOrder { got: 1, last: 2 })
        ));
    }

    #[test]
    fn test_frame_outside_range_rejected() {
        let mut compiler = ExpressionCompiler::new(FrameRange::new(2, 5));
        assert!(matches!(
            compiler.push_frame(1, "x"),
            Err(BakeError::FrameOutOfRange { frame: 1, .. })
        ));
        assert!(matches!(
            compiler.push_frame(5, "x"),
            Err(BakeError::FrameOutOfRange { frame: 5, .. })
        ));
    }

    #[test]
    fn test_nothing_follows_the_else_bucket() {
        let mut compiler = ExpressionCompiler::new(FrameRange::new(0, 3));
        for frame in 0..3 {
            compiler.push_frame(frame, "x").unwrap();
        }
        // The `else` bucket is sealed; a further frame cannot sneak in an
        // unreachable `else if` after it.
        assert!(matches!(
            compiler.push_frame(3, "x"),
            Err(BakeError::FrameOutOfRange { frame: 3, .. })
        ));
        let script = compiler.finish("$a").unwrap();
        assert_eq!(script.matches("else").count(), 2); // one `else if`, one `else`
    }

    #[test]
    fn test_zero_frames_is_an_error() {
        let compiler = ExpressionCompiler::new(FrameRange::new(0, 3));
        assert!(matches!(compiler.finish("$a"), Err(BakeError::EmptyScript)));
    }

    #[test]
    fn test_frame_count() {
        let mut compiler = ExpressionCompiler::new(FrameRange::new(0, 3));
        assert_eq!(compiler.frame_count(), 0);
        compiler.push_frame(0, "x").unwrap();
        compiler.push_frame(1, "x").unwrap();
        assert_eq!(compiler.frame_count(), 2);
    }

    #[test]
    fn test_assigned_map_detection() {
        let script = "# painted by hand\n$a=map('${DESC}/paintmaps/length/base.ptx');\n$a\n";
        assert_eq!(
            assigned_map(script).as_deref(),
            Some("/paintmaps/length/base.ptx")
        );
    }

    #[test]
    fn test_assigned_map_ignores_comment_lines() {
        let script = "# $a=map('${DESC}/old.ptx');\n$b = 1;\n";
        assert_eq!(assigned_map(script), None);
    }

    #[test]
    fn test_generated_script_passes_assigned_map_check() {
        // A re-bake over a previously generated script must not trip the
        // "no map assigned" precondition.
        let script = compile_three();
        assert!(assigned_map(&script).is_some());
    }

    #[test]
    fn test_previous_expression_scans_backward() {
        let script = "$a=map('x');\n$a * 2\n# trailing comment\n";
        assert_eq!(previous_expression(script).as_deref(), Some("$a * 2"));
    }

    #[test]
    fn test_fallback_priority() {
        let prev = "$a=map('x');\n$a * 2\n";
        assert_eq!(fallback_expression(Some("$a + 1"), prev), "$a + 1");
        assert_eq!(fallback_expression(None, prev), "$a * 2");
        assert_eq!(fallback_expression(None, "nothing here"), "$a");
    }
}
