//! Reference transcript (`insent`) lines: `<text> (<utt_id>)`

use regex::Regex;
use std::sync::OnceLock;

fn utt_id_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)\s*$").expect("valid regex"))
}

/// One transcript line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    /// Transcript text without the utterance id
    pub text: String,
    /// Utterance id from the trailing parentheses, if present
    pub utt_id: Option<String>,
}

impl Transcript {
    /// Splits a transcript line into its text and trailing utterance id
    pub fn parse(line: &str) -> Self {
        match utt_id_suffix().captures(line) {
            Some(caps) => {
                let whole = caps.get(0).map_or(line.len(), |m| m.start());
                Self {
                    text: line[..whole].trim().to_string(),
                    utt_id: Some(caps[1].trim().to_string()),
                }
            }
            None => Self {
                text: line.trim().to_string(),
                utt_id: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcript() {
        let transcript = Transcript::parse("the cat sat (utt5)");
        assert_eq!(transcript.text, "the cat sat");
        assert_eq!(transcript.utt_id.as_deref(), Some("utt5"));
    }

    #[test]
    fn test_only_trailing_parentheses_are_the_id() {
        let transcript = Transcript::parse("read(2) aloud (utt7-8)  ");
        assert_eq!(transcript.text, "read(2) aloud");
        assert_eq!(transcript.utt_id.as_deref(), Some("utt7-8"));

        let missing = Transcript::parse("no id here");
        assert_eq!(missing.text, "no id here");
        assert!(missing.utt_id.is_none());
    }
}
