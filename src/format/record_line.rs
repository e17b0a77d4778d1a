use colored::ColoredString;
use nonempty_collections::{NEVec, nev};

/// One display line built from colored parts, joined by single spaces.
pub struct FormattedRecord {
    parts: NEVec<ColoredString>,
}

impl FormattedRecord {
    pub fn new(first: ColoredString) -> Self {
        Self { parts: nev![first] }
    }

    pub fn push(&mut self, part: ColoredString) {
        self.parts.push(part);
    }
}

impl std::fmt::Display for FormattedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}
