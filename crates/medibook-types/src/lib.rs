/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when parsing a slot time.
#[derive(Debug, thiserror::Error)]
pub enum SlotTimeError {
    /// The input was not of the form `HH:MM`
    #[error("Slot time must be of the form HH:MM, got {0:?}")]
    Malformed(String),
    /// Hours or minutes were outside the 24-hour clock range
    #[error("Slot time out of range: {0:?}")]
    OutOfRange(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A time-of-day slot in canonical 24-hour `HH:MM` form.
///
/// Both components must be zero-padded to two digits, so the lexicographic
/// ordering of the inner string matches chronological ordering. Availability
/// templates and booked sets only ever hold values of this type, which keeps
/// "09:00" and "9:00" from silently referring to different slots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(String);

impl SlotTime {
    /// Parses a slot time from its canonical `HH:MM` representation.
    ///
    /// # Returns
    ///
    /// Returns `Ok(SlotTime)` for a zero-padded 24-hour clock time,
    /// `Err(SlotTimeError::Malformed)` when the shape is wrong, or
    /// `Err(SlotTimeError::OutOfRange)` when hours exceed 23 or minutes 59.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, SlotTimeError> {
        let raw = input.as_ref();

        let (hh, mm) = raw
            .split_once(':')
            .ok_or_else(|| SlotTimeError::Malformed(raw.to_owned()))?;
        if hh.len() != 2
            || mm.len() != 2
            || !hh.bytes().all(|b| b.is_ascii_digit())
            || !mm.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(SlotTimeError::Malformed(raw.to_owned()));
        }

        // Unwraps cannot fail: both halves are exactly two ASCII digits.
        let hours: u8 = hh.parse().unwrap();
        let minutes: u8 = mm.parse().unwrap();
        if hours > 23 || minutes > 59 {
            return Err(SlotTimeError::OutOfRange(raw.to_owned()));
        }

        Ok(Self(raw.to_owned()))
    }

    /// Returns the canonical `HH:MM` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SlotTime {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for SlotTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SlotTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SlotTime::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_and_accepts() {
        let text = NonEmptyText::new("  doc1  ").expect("should accept non-empty input");
        assert_eq!(text.as_str(), "doc1");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace_only() {
        let err = NonEmptyText::new("   ").expect_err("whitespace-only input should fail");
        assert!(matches!(err, TextError::Empty));
    }

    #[test]
    fn test_slot_time_accepts_canonical_form() {
        let time = SlotTime::parse("09:00").expect("canonical time should parse");
        assert_eq!(time.as_str(), "09:00");
        assert_eq!(time.to_string(), "09:00");
    }

    #[test]
    fn test_slot_time_rejects_unpadded_hours() {
        let err = SlotTime::parse("9:00").expect_err("unpadded hours should fail");
        assert!(matches!(err, SlotTimeError::Malformed(_)));
    }

    #[test]
    fn test_slot_time_rejects_missing_separator() {
        let err = SlotTime::parse("0900").expect_err("missing colon should fail");
        assert!(matches!(err, SlotTimeError::Malformed(_)));
    }

    #[test]
    fn test_slot_time_rejects_out_of_range() {
        let err = SlotTime::parse("24:00").expect_err("hour 24 should fail");
        assert!(matches!(err, SlotTimeError::OutOfRange(_)));

        let err = SlotTime::parse("12:60").expect_err("minute 60 should fail");
        assert!(matches!(err, SlotTimeError::OutOfRange(_)));
    }

    #[test]
    fn test_slot_time_ordering_is_chronological() {
        let morning = SlotTime::parse("09:30").unwrap();
        let afternoon = SlotTime::parse("14:00").unwrap();
        assert!(morning < afternoon);
    }

    #[test]
    fn test_slot_time_serde_round_trip() {
        let time = SlotTime::parse("10:15").unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"10:15\"");

        let back: SlotTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time);
    }

    #[test]
    fn test_slot_time_deserialization_rejects_invalid() {
        let result: Result<SlotTime, _> = serde_json::from_str("\"25:00\"");
        assert!(result.is_err(), "out-of-range time should not deserialize");
    }
}
