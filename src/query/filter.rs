use crate::error::{Result, ViewerError};
use regex::{Regex, RegexBuilder};

/// Maximum allowed regex pattern length
const REGEX_SIZE_LIMIT: usize = 1024;

/// Maximum DFA size to prevent memory explosion
const DFA_SIZE_LIMIT: usize = 1 << 20; // 1MB

/// Options carried by a `/body/flags` expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub ignore_whitespace: bool,
}

/// Compiled message predicate, matched against a record's raw line
#[derive(Debug, Clone)]
pub enum MessagePattern {
    Literal { needle: String, case_sensitive: bool },
    Regex(Regex),
}

impl MessagePattern {
    /// Compile a message filter as typed by the user.
    ///
    /// - blank: no message filtering (`Ok(None)`)
    /// - `/body/flags`: a regular expression literal
    /// - anything else: a regular expression, or a plain substring when it
    ///   has no regex metacharacters
    pub fn compile(spec: &str, case_insensitive: bool) -> Result<Option<Self>> {
        if spec.trim().is_empty() {
            return Ok(None);
        }

        if spec.starts_with('/') {
            let (body, mut flags) = parse_regex_literal(spec.trim_end())?;
            flags.case_insensitive |= case_insensitive;
            return compile_with_flags(&body, flags).map(|re| Some(Self::Regex(re)));
        }

        if should_use_plain_search(spec) {
            validate_pattern_length(spec)?;
            let needle = if case_insensitive { spec.to_lowercase() } else { spec.to_string() };
            return Ok(Some(Self::Literal {
                needle,
                case_sensitive: !case_insensitive,
            }));
        }

        compile_user_regex(spec, case_insensitive).map(|re| Some(Self::Regex(re)))
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Literal { needle, case_sensitive: true } => text.contains(needle.as_str()),
            Self::Literal { needle, case_sensitive: false } => text.to_lowercase().contains(needle.as_str()),
            Self::Regex(re) => re.is_match(text),
        }
    }
}

/// Split `/body/flags` into its body and options.
///
/// Only the literal form is understood; the text is never evaluated.
pub fn parse_regex_literal(expr: &str) -> Result<(String, PatternFlags)> {
    let rest = expr
        .strip_prefix('/')
        .ok_or_else(|| ViewerError::FilterConfig(format!("not a regular expression literal: {}", expr)))?;
    let close = rest
        .rfind('/')
        .ok_or_else(|| ViewerError::FilterConfig(format!("unterminated regular expression literal: {}", expr)))?;

    let body = rest[..close].replace("\\/", "/");
    if body.is_empty() {
        return Err(ViewerError::FilterConfig("empty regular expression literal".to_string()));
    }

    let mut flags = PatternFlags::default();
    for flag in rest[close + 1..].chars() {
        match flag {
            'i' => flags.case_insensitive = true,
            'm' => flags.multi_line = true,
            's' => flags.dot_matches_new_line = true,
            'x' => flags.ignore_whitespace = true,
            // global/unicode/sticky/indices change nothing for a yes/no match
            'g' | 'u' | 'y' | 'd' => {}
            other => {
                return Err(ViewerError::FilterConfig(format!(
                    "unsupported regular expression flag '{}'",
                    other
                )))
            }
        }
    }

    Ok((body, flags))
}

fn validate_pattern_length(pattern: &str) -> Result<()> {
    if pattern.len() > REGEX_SIZE_LIMIT {
        return Err(ViewerError::FilterConfig(format!(
            "Pattern too long: {} > {} characters",
            pattern.len(),
            REGEX_SIZE_LIMIT
        )));
    }
    Ok(())
}

/// Compile a user-provided regex pattern with size limits
pub fn compile_user_regex(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    compile_with_flags(
        pattern,
        PatternFlags {
            case_insensitive,
            ..Default::default()
        },
    )
}

fn compile_with_flags(pattern: &str, flags: PatternFlags) -> Result<Regex> {
    validate_pattern_length(pattern)?;

    RegexBuilder::new(pattern)
        .case_insensitive(flags.case_insensitive)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_matches_new_line)
        .ignore_whitespace(flags.ignore_whitespace)
        .size_limit(DFA_SIZE_LIMIT)
        .dfa_size_limit(DFA_SIZE_LIMIT)
        .build()
        .map_err(ViewerError::from)
}

/// Check if a plain text search should be performed instead of regex
pub fn should_use_plain_search(pattern: &str) -> bool {
    // If pattern contains no regex metacharacters, use plain search
    let metacharacters = ['.', '*', '+', '?', '[', ']', '(', ')', '{', '}', '|', '^', '$', '\\'];
    !pattern.chars().any(|c| metacharacters.contains(&c))
}
