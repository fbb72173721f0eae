//! G-code line tokenizer.
//!
//! Splits a single line into address words (`G1`, `X10.5`, `S255`), skipping
//! `;` end-of-line comments and `( ... )` inline comments. Packed words such
//! as `G1X10Y10` and whitespace between a letter and its number are accepted.

/// A single address word: letter plus numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Word {
    pub letter: char,
    pub value: f64,
}

/// A parsed G-code line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GcodeLine {
    words: Vec<Word>,
}

/// Axis and arc words that make a motion command actually move.
const COORDINATE_LETTERS: &[char] = &['X', 'Y', 'Z', 'I', 'J', 'R'];

/// Parse a line into its words. Malformed words are skipped.
pub fn parse_line(line: &str) -> GcodeLine {
    let bytes = line.as_bytes();
    let mut words = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if b == b';' {
            break;
        }
        if b == b'(' {
            while i < bytes.len() && bytes[i] != b')' {
                i += 1;
            }
            i += 1;
            continue;
        }
        if !b.is_ascii_alphabetic() {
            i += 1;
            continue;
        }

        let letter = b.to_ascii_uppercase() as char;
        i += 1;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }

        let start = i;
        while i < bytes.len() && matches!(bytes[i], b'0'..=b'9' | b'.' | b'+' | b'-') {
            i += 1;
        }

        if let Ok(value) = line[start..i].parse::<f64>() {
            words.push(Word { letter, value });
        }
    }

    GcodeLine { words }
}

impl GcodeLine {
    /// All words in line order
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Value of the first word with the given letter
    pub fn value(&self, letter: char) -> Option<f64> {
        self.words.iter().find(|w| w.letter == letter).map(|w| w.value)
    }

    pub fn has_word(&self, letter: char) -> bool {
        self.value(letter).is_some()
    }

    /// The leading G or M command, normalized (`G01` -> `('G', 1)`).
    pub fn command(&self) -> Option<(char, u32)> {
        let word = self.words.iter().find(|w| w.letter == 'G' || w.letter == 'M')?;
        if word.value < 0.0 || word.value.fract() != 0.0 {
            return None;
        }
        Some((word.letter, word.value as u32))
    }

    /// True when the line is exactly the given command with no parameters.
    fn is_bare(&self, letter: char, code: u32) -> bool {
        self.words.len() == 1 && self.command() == Some((letter, code))
    }

    /// `G20` (inches) or `G21` (millimetres) on its own.
    pub fn is_unit_declaration(&self) -> bool {
        self.is_bare('G', 20) || self.is_bare('G', 21)
    }

    /// `M5` on its own.
    pub fn is_laser_off(&self) -> bool {
        self.is_bare('M', 5)
    }

    /// `M3`/`M4` carrying an `S` power word.
    pub fn is_laser_on(&self) -> bool {
        matches!(self.command(), Some(('M', 3)) | Some(('M', 4))) && self.has_word('S')
    }

    /// `G1`/`G2`/`G3` with at least one coordinate or arc word.
    ///
    /// A feed-rate-only directive such as `G1 F500` does not move the head
    /// and is not a cutting motion.
    pub fn is_cutting_motion(&self) -> bool {
        matches!(self.command(), Some(('G', 1..=3)))
            && self
                .words
                .iter()
                .any(|w| COORDINATE_LETTERS.contains(&w.letter))
    }

    /// `G0 X0 Y0`, optionally with `Z0` and a feed rate.
    pub fn is_rapid_to_origin(&self) -> bool {
        if self.command() != Some(('G', 0)) {
            return false;
        }

        let at_zero = |letter| self.value(letter) == Some(0.0);
        if !at_zero('X') || !at_zero('Y') {
            return false;
        }

        self.words.iter().all(|w| match w.letter {
            'G' | 'X' | 'Y' | 'Z' => w.value == 0.0,
            'F' => true,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spaced_words() {
        let line = parse_line("G1 X10.5 Y-3 F1000");
        assert_eq!(line.words().len(), 4);
        assert_eq!(line.command(), Some(('G', 1)));
        assert_eq!(line.value('X'), Some(10.5));
        assert_eq!(line.value('Y'), Some(-3.0));
        assert_eq!(line.value('F'), Some(1000.0));
    }

    #[test]
    fn test_parse_packed_words() {
        let line = parse_line("g1x10y20");
        assert_eq!(line.command(), Some(('G', 1)));
        assert_eq!(line.value('X'), Some(10.0));
        assert_eq!(line.value('Y'), Some(20.0));
    }

    #[test]
    fn test_comments_ignored() {
        let line = parse_line("G0 (travel) X5 ; move away");
        assert_eq!(line.words().len(), 2);
        assert_eq!(line.value('X'), Some(5.0));

        assert!(parse_line("; just a comment").words().is_empty());
    }

    #[test]
    fn test_leading_zero_codes() {
        assert_eq!(parse_line("G01 X1").command(), Some(('G', 1)));
        assert!(parse_line("M05").is_laser_off());
    }

    #[test]
    fn test_unit_declaration() {
        assert!(parse_line("G21").is_unit_declaration());
        assert!(parse_line("G21;").is_unit_declaration());
        assert!(parse_line("G20;").is_unit_declaration());
        assert!(!parse_line("G90").is_unit_declaration());
        assert!(!parse_line("G2 X1 Y1 I1 J0").is_unit_declaration());
    }

    #[test]
    fn test_laser_on_requires_power() {
        assert!(parse_line("M3 S255;").is_laser_on());
        assert!(parse_line("M4 S10").is_laser_on());
        assert!(!parse_line("M3").is_laser_on());
        assert!(!parse_line("M5;").is_laser_on());
    }

    #[test]
    fn test_cutting_motion() {
        assert!(parse_line("G1 X10 Y10").is_cutting_motion());
        assert!(parse_line("G2 X5 Y5 I2.5 J0").is_cutting_motion());
        assert!(parse_line("G1 Z-1").is_cutting_motion());
        assert!(!parse_line("G1 F500").is_cutting_motion());
        assert!(!parse_line("G0 X10 Y10").is_cutting_motion());
        assert!(!parse_line("G21").is_cutting_motion());
        assert!(!parse_line("G17").is_cutting_motion());
    }

    #[test]
    fn test_rapid_to_origin() {
        assert!(parse_line("G0 X0 Y0").is_rapid_to_origin());
        assert!(parse_line("G0 X0 Y0 Z0").is_rapid_to_origin());
        assert!(parse_line("G00 X0.0 Y0 F3000;").is_rapid_to_origin());
        assert!(!parse_line("G0 X0 Y0.5").is_rapid_to_origin());
        assert!(!parse_line("G0 X0 Y0 Z5").is_rapid_to_origin());
        assert!(!parse_line("G1 X0 Y0").is_rapid_to_origin());
        assert!(!parse_line("G0 X0").is_rapid_to_origin());
    }
}
