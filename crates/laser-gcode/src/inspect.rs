//! Artifact inspection.
//!
//! Decides whether a generated layer artifact contains any real cutting or
//! engraving work, or only the boilerplate header and footer the generator
//! emits for every layer.

use crate::line::parse_line;

/// Classification of a layer artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Only header/footer boilerplate, nothing to cut
    Empty,
    /// At least one cutting motion or laser-on command
    NonEmpty,
}

impl ArtifactKind {
    pub fn is_empty(self) -> bool {
        self == ArtifactKind::Empty
    }
}

/// Classify an artifact by scanning for work lines.
pub fn classify(artifact: &str) -> ArtifactKind {
    if count_work_lines(artifact) == 0 {
        ArtifactKind::Empty
    } else {
        ArtifactKind::NonEmpty
    }
}

/// Count lines that move the head while cutting or switch the laser on.
pub fn count_work_lines(artifact: &str) -> usize {
    artifact
        .lines()
        .map(parse_line)
        .filter(|line| line.is_cutting_motion() || line.is_laser_on())
        .count()
}
