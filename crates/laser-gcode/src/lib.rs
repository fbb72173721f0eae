//! Inspection and assembly of per-layer laser G-code artifacts.
//!
//! A layer artifact is the G-code text an external converter produces for a
//! single drawing layer. This crate decides whether such an artifact holds any
//! real work and stitches an engrave artifact and a cut artifact together into
//! one program. It performs no I/O.

mod assemble;
mod inspect;
mod line;

pub use assemble::{
    assemble, strip_footer, strip_header, CombinedProgram, BANNER, BANNER_RULE,
    BANNER_TRANSITION,
};
pub use inspect::{classify, count_work_lines, ArtifactKind};
pub use line::{parse_line, GcodeLine, Word};
