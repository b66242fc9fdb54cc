use std::cmp::Reverse;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Every rewrite compiles down to a batch of these. Intelligence lives in
/// span acquisition, not application: bytes outside the spans are copied
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to insert at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("before-text verification failed at {byte_start}..{byte_end}: found {found:?}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range [{byte_start}, {byte_end}) in text of length {text_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        text_len: usize,
    },

    #[error("edits overlap at {first_start}..{first_end} and {second_start}..{second_end}")]
    Overlap {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("edit boundary {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },
}

impl Edit {
    /// Create a replacement, recording the text currently at the span.
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl AsRef<str>,
    ) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before.as_ref()),
        }
    }

    /// Zero-width insertion at `offset`.
    pub fn insert(offset: usize, new_text: impl Into<String>) -> Self {
        Self::new(offset, offset, new_text, "")
    }

    pub fn is_insertion(&self) -> bool {
        self.byte_start == self.byte_end
    }

    /// Check the span against `source` and return the text currently there.
    fn validate<'a>(&self, source: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > source.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                text_len: source.len(),
            });
        }

        for offset in [self.byte_start, self.byte_end] {
            if !source.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        let current = &source[self.byte_start..self.byte_end];
        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }

        Ok(current)
    }

    /// Apply this edit to `source`, returning the new text.
    pub fn apply_to(&self, source: &str) -> Result<String, EditError> {
        Self::apply_all(source, std::slice::from_ref(self))
    }

    /// Apply a batch of non-overlapping edits to `source` in one pass.
    ///
    /// Edits are applied bottom-to-top so earlier offsets stay valid.
    /// Insertions sharing an offset keep their batch order, and an insertion
    /// at the start of a replaced span lands before the replacement.
    pub fn apply_all(source: &str, edits: &[Edit]) -> Result<String, EditError> {
        if edits.is_empty() {
            return Ok(source.to_string());
        }

        for edit in edits {
            edit.validate(source)?;
        }

        let mut ordered: Vec<(usize, &Edit)> = edits.iter().enumerate().collect();
        ordered.sort_by_key(|(seq, edit)| {
            (Reverse(edit.byte_start), Reverse(edit.byte_end), Reverse(*seq))
        });

        // Sorted descending: for non-overlapping regions the earlier edit's
        // end must not pass the later edit's start.
        for window in ordered.windows(2) {
            let (later, earlier) = (window[0].1, window[1].1);
            if earlier.byte_end > later.byte_start {
                return Err(EditError::Overlap {
                    first_start: earlier.byte_start,
                    first_end: earlier.byte_end,
                    second_start: later.byte_start,
                    second_end: later.byte_end,
                });
            }
        }

        let mut text = source.to_string();
        for (_, edit) in ordered {
            text.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_verification_exact_match() {
        let verify = EditVerification::ExactMatch("hello world".to_string());
        assert!(verify.matches("hello world"));
        assert!(!verify.matches("hello"));
    }

    #[test]
    fn test_edit_verification_hash() {
        let text = "hello world";
        let verify = EditVerification::Hash(xxh3_64(text.as_bytes()));
        assert!(verify.matches(text));
        assert!(!verify.matches("goodbye world"));
    }

    #[test]
    fn test_edit_verification_from_text_large() {
        let text = "x".repeat(2000);
        assert!(matches!(
            EditVerification::from_text(&text),
            EditVerification::Hash(_)
        ));
        assert!(matches!(
            EditVerification::from_text("small"),
            EditVerification::ExactMatch(_)
        ));
    }

    #[test]
    fn test_edit_invalid_range() {
        let edit = Edit::new(5, 20, "replacement", "");
        assert!(matches!(
            edit.apply_to("hello world"),
            Err(EditError::InvalidByteRange { .. })
        ));
    }

    #[test]
    fn test_edit_inverted_range() {
        let edit = Edit::new(10, 5, "replacement", "");
        assert!(matches!(
            edit.apply_to("hello world"),
            Err(EditError::InvalidByteRange { .. })
        ));
    }

    #[test]
    fn test_edit_before_text_mismatch() {
        let edit = Edit::new(0, 5, "HELLO", "world");
        assert!(matches!(
            edit.apply_to("hello world"),
            Err(EditError::BeforeTextMismatch { .. })
        ));
    }

    #[test]
    fn test_batch_edits_preserve_untouched_bytes() {
        let source = "line1\nline2\nline3\n";
        let edits = vec![
            Edit::new(0, 5, "LINE1", "line1"),
            Edit::new(12, 17, "LINE3", "line3"),
        ];
        let result = Edit::apply_all(source, &edits).unwrap();
        assert_eq!(result, "LINE1\nline2\nLINE3\n");
    }

    #[test]
    fn test_overlapping_edits_rejected() {
        let edits = vec![Edit::new(0, 5, "a", "hello"), Edit::new(3, 8, "b", "lo wo")];
        assert!(matches!(
            Edit::apply_all("hello world", &edits),
            Err(EditError::Overlap { .. })
        ));
    }

    #[test]
    fn test_insertions_at_same_offset_keep_order() {
        let edits = vec![Edit::insert(5, "A"), Edit::insert(5, "B")];
        let result = Edit::apply_all("hello world", &edits).unwrap();
        assert_eq!(result, "helloAB world");
    }

    #[test]
    fn test_insertion_before_replacement() {
        let edits = vec![Edit::new(6, 11, "there", "world"), Edit::insert(6, ">")];
        let result = Edit::apply_all("hello world", &edits).unwrap();
        assert_eq!(result, "hello >there");
    }

    #[test]
    fn test_empty_batch_is_identity() {
        assert_eq!(Edit::apply_all("abc", &[]).unwrap(), "abc");
    }
}
