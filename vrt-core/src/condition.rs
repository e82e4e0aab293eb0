use serde::{Deserialize, Serialize};
use std::fmt;

/// Stimulus variant assigned to a trial: the direction the arrow points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Left,
    Right,
}

impl Condition {
    pub const ALL: [Condition; 2] = [Condition::Left, Condition::Right];

    /// Label used in exported tables and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Left => "left",
            Condition::Right => "right",
        }
    }

    /// Heading used by the one-line summary ("Left Mean", "Right Mean").
    pub fn title(&self) -> &'static str {
        match self {
            Condition::Left => "Left",
            Condition::Right => "Right",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_export_format() {
        assert_eq!(Condition::Left.label(), "left");
        assert_eq!(Condition::Right.to_string(), "right");
        assert_eq!(serde_json::to_string(&Condition::Left).unwrap(), "\"left\"");
    }

    #[test]
    fn ordering_puts_left_first() {
        let mut all = vec![Condition::Right, Condition::Left];
        all.sort();
        assert_eq!(all, Condition::ALL.to_vec());
    }
}
