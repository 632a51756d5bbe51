use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two timed exam parts.
///
/// The exam always runs Reading & Writing first, then Math, each with its
/// own question set and hard time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    ReadingWriting,
    Math,
}

impl Section {
    /// The fixed order in which sections are taken.
    pub const ORDER: [Section; 2] = [Section::ReadingWriting, Section::Math];

    /// Hard time limit for this section, in seconds.
    #[must_use]
    pub const fn duration_secs(self) -> u32 {
        match self {
            // 64 minutes for Reading & Writing, 70 for Math.
            Section::ReadingWriting => 3840,
            Section::Math => 4200,
        }
    }

    /// Human-readable section name, matching the wire tag.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Section::ReadingWriting => "Reading and Writing",
            Section::Math => "Math",
        }
    }

    /// The section that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Section> {
        match self {
            Section::ReadingWriting => Some(Section::Math),
            Section::Math => None,
        }
    }

    /// Maps a wire-format section tag to a `Section`.
    ///
    /// A record belongs to `Math` iff its tag equals `"Math"`; every other
    /// tag falls into `ReadingWriting`. Total by construction so loading
    /// never drops a record over an unexpected tag.
    #[must_use]
    pub fn from_wire(tag: &str) -> Self {
        if tag == "Math" {
            Section::Math
        } else {
            Section::ReadingWriting
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_match_section_limits() {
        assert_eq!(Section::ReadingWriting.duration_secs(), 3840);
        assert_eq!(Section::Math.duration_secs(), 4200);
    }

    #[test]
    fn order_is_reading_writing_then_math() {
        assert_eq!(Section::ORDER, [Section::ReadingWriting, Section::Math]);
        assert_eq!(Section::ReadingWriting.next(), Some(Section::Math));
        assert_eq!(Section::Math.next(), None);
    }

    #[test]
    fn wire_tag_partitions_math_from_everything_else() {
        assert_eq!(Section::from_wire("Math"), Section::Math);
        assert_eq!(
            Section::from_wire("Reading and Writing"),
            Section::ReadingWriting
        );
        assert_eq!(Section::from_wire("math"), Section::ReadingWriting);
        assert_eq!(Section::from_wire(""), Section::ReadingWriting);
    }
}
