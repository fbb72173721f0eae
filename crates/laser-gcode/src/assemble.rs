//! Artifact assembly.
//!
//! The engrave artifact keeps its header (units, positioning mode) and loses
//! its footer; the cut artifact loses its header and keeps its footer, so the
//! combined program has one preamble and one shutdown sequence.

use crate::line::parse_line;

/// Outer rule of the separator banner.
pub const BANNER_RULE: &str = "; ==========================================";

/// Middle line of the separator banner.
pub const BANNER_TRANSITION: &str = "; Layer transition: Engrave -> Cut";

/// The three banner lines, in output order.
pub const BANNER: [&str; 3] = [BANNER_RULE, BANNER_TRANSITION, BANNER_RULE];

/// Remove the laser-off footer from an artifact.
///
/// Every laser-off line switches into footer mode and is dropped. While in
/// footer mode, blank lines and rapid moves back to the origin are dropped
/// too. The first other line leaves footer mode and is kept. Applying this to
/// its own output changes nothing.
pub fn strip_footer(artifact: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut in_footer = false;

    for raw in artifact.lines() {
        let trimmed = raw.trim();
        let line = parse_line(trimmed);

        if line.is_laser_off() {
            in_footer = true;
            continue;
        }
        if in_footer && (trimmed.is_empty() || line.is_rapid_to_origin()) {
            continue;
        }

        in_footer = false;
        result.push(raw.to_string());
    }

    result
}

/// Remove everything up to and including the first unit declaration.
///
/// Lines after it are kept verbatim, footer included. Without a unit
/// declaration nothing is kept.
pub fn strip_header(artifact: &str) -> Vec<String> {
    artifact
        .lines()
        .skip_while(|raw| !parse_line(raw).is_unit_declaration())
        .skip(1)
        .map(str::to_string)
        .collect()
}

/// A combined engrave + cut program, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CombinedProgram {
    lines: Vec<String>,
}

impl CombinedProgram {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of separator banners in the program (0 or 1).
    pub fn banner_count(&self) -> usize {
        self.lines
            .windows(BANNER.len())
            .filter(|window| window.iter().zip(BANNER).all(|(line, expected)| line == expected))
            .count()
    }

    /// Render as text, every line newline-terminated
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Assemble the engrave artifact (if any) and the cut artifact.
///
/// Engrave always precedes cut. The banner appears exactly once, and only
/// when an engrave artifact is present.
pub fn assemble(engrave: Option<&str>, cut: &str) -> CombinedProgram {
    let mut lines = Vec::new();

    if let Some(engrave) = engrave {
        lines.extend(strip_footer(engrave));
        lines.push(String::new());
        lines.extend(BANNER.iter().map(|s| s.to_string()));
        lines.push(String::new());
    }

    lines.extend(strip_header(cut));

    CombinedProgram { lines }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGRAVE: &str = "M5;\nG90;\nG21;\nG0 X10 Y10;\nM3 S75;\nG1 X20 Y10 F1000;\nG1 X20 Y20;\nM5;\nG0 X0 Y0;\n";
    const CUT: &str = "M5;\nG90;\nG21;\nG0 X5 Y5;\nM3 S255;\nG1 X50 Y5 F250;\nG1 X50 Y50;\nM5;\n\nG0 X0 Y0;\n";

    fn joined(lines: &[String]) -> String {
        lines.join("\n")
    }

    #[test]
    fn test_strip_footer_removes_trailer() {
        let lines = strip_footer(ENGRAVE);
        assert_eq!(
            lines,
            vec!["G90;", "G21;", "G0 X10 Y10;", "M3 S75;", "G1 X20 Y10 F1000;", "G1 X20 Y20;"]
        );
    }

    #[test]
    fn test_strip_footer_keeps_line_after_footer() {
        let text = "G21\nG1 X1 Y1\nM5\n\nG0 X0 Y0 Z0\nG1 X2 Y2\n";
        let lines = strip_footer(text);
        assert_eq!(lines, vec!["G21", "G1 X1 Y1", "G1 X2 Y2"]);
    }

    #[test]
    fn test_strip_footer_origin_move_outside_footer_kept() {
        let text = "G0 X0 Y0\nG1 X1 Y1\n";
        assert_eq!(strip_footer(text), vec!["G0 X0 Y0", "G1 X1 Y1"]);
    }

    #[test]
    fn test_strip_footer_idempotent() {
        let once = strip_footer(ENGRAVE);
        let twice = strip_footer(&joined(&once));
        assert_eq!(once, twice);

        let text = "G21\nG1 X1 Y1\nM5\nG0 X5 Y5\nM5\n\n";
        let once = strip_footer(text);
        assert_eq!(strip_footer(&joined(&once)), once);
    }

    #[test]
    fn test_strip_header() {
        let lines = strip_header(CUT);
        assert_eq!(lines.first().map(String::as_str), Some("G0 X5 Y5;"));
        assert_eq!(lines.last().map(String::as_str), Some("G0 X0 Y0;"));
        assert!(lines.iter().any(|l| l == "M5;"));
    }

    #[test]
    fn test_strip_header_without_unit_is_empty() {
        assert!(strip_header("G90;\nG1 X1 Y1;\n").is_empty());
    }

    #[test]
    fn test_strip_header_only_first_unit_declaration() {
        let lines = strip_header("G21\nG1 X1 Y1\nG20\nG1 X2 Y2\n");
        assert_eq!(lines, vec!["G1 X1 Y1", "G20", "G1 X2 Y2"]);
    }

    #[test]
    fn test_header_then_footer_strip() {
        let body = strip_header(CUT);
        assert!(body.iter().any(|l| l == "G0 X0 Y0;"));

        let stripped = strip_footer(&joined(&body));
        assert_eq!(stripped, vec!["G0 X5 Y5;", "M3 S255;", "G1 X50 Y5 F250;", "G1 X50 Y50;"]);
    }

    #[test]
    fn test_assemble_cut_only() {
        let program = assemble(None, CUT);
        assert_eq!(program.lines(), strip_header(CUT).as_slice());
        assert_eq!(program.banner_count(), 0);
        assert!(!program.render().contains("Layer transition"));
    }

    #[test]
    fn test_assemble_engrave_and_cut() {
        let program = assemble(Some(ENGRAVE), CUT);
        let engrave = strip_footer(ENGRAVE);
        let cut = strip_header(CUT);

        assert_eq!(&program.lines()[..engrave.len()], engrave.as_slice());
        assert_eq!(&program.lines()[program.line_count() - cut.len()..], cut.as_slice());
        assert_eq!(program.banner_count(), 1);
        assert_eq!(program.line_count(), engrave.len() + 5 + cut.len());

        let banner_start = engrave.len();
        assert_eq!(program.lines()[banner_start], "");
        assert_eq!(program.lines()[banner_start + 2], BANNER_TRANSITION);
        assert_eq!(program.lines()[banner_start + 4], "");
    }

    #[test]
    fn test_render_terminates_every_line() {
        let program = assemble(Some(ENGRAVE), CUT);
        let rendered = program.render();
        assert_eq!(rendered.lines().count(), program.line_count());
        assert!(rendered.ends_with("G0 X0 Y0;\n"));
    }

    #[test]
    fn test_strip_footer_keeps_raised_return() {
        let lines = strip_footer("G1 X5 Y5;\nM5;\nG0 X0 Y0 Z5;\n");
        assert_eq!(lines, vec!["G1 X5 Y5;", "G0 X0 Y0 Z5;"]);
    }
}
