use regex::{Regex, RegexBuilder};

/// Compiled, case-insensitive sensitive-topic matchers.
#[derive(Debug, Clone, Default)]
pub struct SensitivePatterns {
    patterns: Vec<(String, Regex)>,
}

impl SensitivePatterns {
    /// Each entry is tried as a regex first; entries that fail to compile are
    /// matched as literal substrings instead.
    pub fn compile<S: AsRef<str>>(raw: &[S]) -> Self {
        let mut patterns = Vec::with_capacity(raw.len());
        for source in raw.iter().map(AsRef::as_ref) {
            let source = source.trim();
            if source.is_empty() {
                continue;
            }
            let compiled = build(source).or_else(|err| {
                tracing::warn!(
                    pattern = %source,
                    error = %err,
                    "sensitive pattern is not a valid regex, matching literally"
                );
                build(&regex::escape(source))
            });
            match compiled {
                Ok(re) => patterns.push((source.to_string(), re)),
                Err(err) => {
                    tracing::error!(pattern = %source, error = %err, "dropping sensitive pattern")
                }
            }
        }
        Self { patterns }
    }

    /// Source text of the first pattern matching `text`.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(source, _)| source.as_str())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(s, _)| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn build(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}
