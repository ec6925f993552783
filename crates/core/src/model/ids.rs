use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ─── Content Identifiers ───────────────────────────────────────────────────────

/// Error type for parsing an identifier from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

/// Content ids are human-readable slugs (`ondas-formacao`, `q1-plancton`).
/// They must be non-empty and contain no whitespace.
fn parse_slug(raw: &str, kind: &'static str) -> Result<String, ParseIdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(ParseIdError { kind });
    }
    Ok(trimmed.to_owned())
}

macro_rules! slug_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates the id from a slug.
            ///
            /// # Errors
            ///
            /// Returns `ParseIdError` if the slug is empty or contains whitespace.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, ParseIdError> {
                parse_slug(raw.as_ref(), stringify!($name)).map(Self)
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

slug_id!(
    /// Unique identifier for a Subject (`fisica`, `biologica`, ...)
    SubjectId
);
slug_id!(
    /// Unique identifier for a Lesson
    LessonId
);
slug_id!(
    /// Identifier for a Question, unique within its lesson quiz
    QuestionId
);
slug_id!(
    /// Unique identifier for a weekly challenge variant
    ChallengeId
);

// ─── Session Identifier ────────────────────────────────────────────────────────

/// Identifier for a single quiz attempt. Only used for correlation in logs and
/// the completion log; sessions are never looked up by id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_id_display() {
        let id = LessonId::new("ondas-formacao").unwrap();
        assert_eq!(id.to_string(), "ondas-formacao");
    }

    #[test]
    fn lesson_id_trims_input() {
        let id: LessonId = "  mares  ".parse().unwrap();
        assert_eq!(id.as_str(), "mares");
    }

    #[test]
    fn slug_rejects_empty_and_inner_whitespace() {
        assert!(SubjectId::new("   ").is_err());
        assert!(QuestionId::new("q 1").is_err());
    }

    #[test]
    fn parse_error_names_the_kind() {
        let err = ChallengeId::new("").unwrap_err();
        assert_eq!(err.to_string(), "failed to parse ChallengeId from string");
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }
}
