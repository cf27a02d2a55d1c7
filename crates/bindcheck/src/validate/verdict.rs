use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tag {
    Error,
    Warn,
    Passed,
}

impl Tag {
    pub const ALL: [Tag; 3] = [Tag::Error, Tag::Warn, Tag::Passed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Error => "ERROR",
            Tag::Warn => "WARN",
            Tag::Passed => "PASSED",
        }
    }

    /// ERROR and PASSED close a verdict; WARN lines only annotate it.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Tag::Warn)
    }

    /// Recognizes the tag prefix (`ERROR:`, `WARN:`, `PASSED:`) of a report line.
    pub fn from_line(line: &str) -> Option<Tag> {
        Tag::ALL.into_iter().find(|tag| {
            line.strip_prefix(tag.as_str())
                .is_some_and(|rest| rest.starts_with(':'))
        })
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictLine {
    pub tag: Tag,
    pub message: String,
}

impl Display for VerdictLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.tag, self.message)
    }
}

/// Classified outcome of one validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    lines: Vec<VerdictLine>,
}

impl Verdict {
    pub fn warn(&mut self, message: String) {
        self.push(Tag::Warn, message);
    }

    pub fn error(&mut self, message: String) {
        self.push(Tag::Error, message);
    }

    pub fn passed(&mut self, message: String) {
        self.push(Tag::Passed, message);
    }

    /// Closes the verdict with a leading ERROR, replacing any terminal line
    /// recorded so far. WARN lines are kept.
    pub fn fail(&mut self, message: String) {
        self.lines.retain(|line| {
            if line.tag.is_terminal() {
                log::info!("Superseded verdict line: {line}");
            }
            !line.tag.is_terminal()
        });
        self.lines.insert(
            0,
            VerdictLine {
                tag: Tag::Error,
                message,
            },
        );
    }

    fn push(&mut self, tag: Tag, message: String) {
        debug_assert!(
            !tag.is_terminal() || self.terminal().is_none(),
            "verdict already has a terminal line"
        );
        self.lines.push(VerdictLine { tag, message });
    }

    pub fn lines(&self) -> &[VerdictLine] {
        &self.lines
    }

    pub fn terminal(&self) -> Option<&VerdictLine> {
        self.lines.iter().find(|line| line.tag.is_terminal())
    }

    pub fn count(&self, tag: Tag) -> usize {
        self.lines.iter().filter(|line| line.tag == tag).count()
    }

    pub fn is_passed(&self) -> bool {
        self.terminal().is_some_and(|line| line.tag == Tag::Passed)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Tag, Verdict};

    #[test]
    fn test_tag_from_line() {
        assert_eq!(Tag::from_line("ERROR: out of cpus"), Some(Tag::Error));
        assert_eq!(Tag::from_line("WARN: more hosts"), Some(Tag::Warn));
        assert_eq!(Tag::from_line("PASSED: {0}"), Some(Tag::Passed));
        assert_eq!(Tag::from_line("PASSED"), None);
        assert_eq!(Tag::from_line("ERRORS: x"), None);
        assert_eq!(Tag::from_line(" ERROR: indented"), None);
    }

    #[test]
    fn test_verdict_display() {
        let mut verdict = Verdict::default();
        verdict.warn("a".to_string());
        verdict.passed("b".to_string());
        assert_eq!(verdict.to_string(), "WARN: a\nPASSED: b\n");
        assert!(verdict.is_passed());
        assert_eq!(verdict.count(Tag::Warn), 1);
    }

    #[test]
    fn test_fail_replaces_terminal() {
        let mut verdict = Verdict::default();
        verdict.warn("a".to_string());
        verdict.passed("b".to_string());
        verdict.fail("c".to_string());
        assert_eq!(verdict.to_string(), "ERROR: c\nWARN: a\n");
        assert!(!verdict.is_passed());
        assert_eq!(verdict.count(Tag::Error), 1);
        assert_eq!(verdict.count(Tag::Passed), 0);
    }
}
