use handle_errors::Error;
use serde::{Deserialize, Serialize};

/// Shortest content a note may hold, counted in characters.
pub const MIN_CONTENT_LENGTH: usize = 5;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub content: String,
    pub important: bool,
}

/// Body of a create request, before validation.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewNote {
    pub content: Option<String>,
    pub important: Option<bool>,
}

/// A validated note that has not been given an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub content: String,
    pub important: bool,
}

/// Body of an update request. Absent fields are left untouched.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NoteUpdate {
    pub content: Option<String>,
    pub important: Option<bool>,
}

fn check_content(content: &str) -> Result<(), Error> {
    if content.chars().count() < MIN_CONTENT_LENGTH {
        return Err(Error::ValidationError(format!(
            "content is shorter than the minimum allowed length ({})",
            MIN_CONTENT_LENGTH
        )));
    }
    Ok(())
}

impl NewNote {
    pub fn validate(self) -> Result<NoteDraft, Error> {
        let content = match self.content {
            Some(content) => content,
            None => return Err(Error::ValidationError("content missing".to_string())),
        };
        check_content(&content)?;
        Ok(NoteDraft {
            content,
            important: self.important.unwrap_or(false),
        })
    }
}

impl NoteUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        match self.content {
            Some(ref content) => check_content(content),
            None => Ok(()),
        }
    }

    pub fn apply(&self, note: &mut Note) {
        if let Some(ref content) = self.content {
            note.content = content.clone();
        }
        if let Some(important) = self.important {
            note.important = important;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_content_is_rejected() {
        let err = NewNote::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "content missing");
    }

    #[test]
    fn short_content_is_rejected() {
        let note = NewNote {
            content: Some("hi".to_string()),
            important: None,
        };
        assert!(matches!(note.validate(), Err(Error::ValidationError(_))));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // four characters, twelve bytes
        let note = NewNote {
            content: Some("筆記筆記".to_string()),
            important: None,
        };
        assert!(note.validate().is_err());

        let note = NewNote {
            content: Some("筆記筆記本".to_string()),
            important: None,
        };
        assert!(note.validate().is_ok());
    }

    #[test]
    fn important_defaults_to_false() {
        let draft = NewNote {
            content: Some("Buy milk".to_string()),
            important: None,
        }
        .validate()
        .unwrap();
        assert!(!draft.important);
    }

    #[test]
    fn update_only_touches_supplied_fields() {
        let mut note = Note {
            id: "1".to_string(),
            content: "HTML is easy".to_string(),
            important: false,
        };
        let update = NoteUpdate {
            content: None,
            important: Some(true),
        };
        update.validate().unwrap();
        update.apply(&mut note);
        assert_eq!(note.content, "HTML is easy");
        assert!(note.important);
    }

    #[test]
    fn update_revalidates_content() {
        let update = NoteUpdate {
            content: Some("".to_string()),
            important: None,
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn non_boolean_important_does_not_deserialize() {
        let parsed = serde_json::from_str::<NewNote>(r#"{"content":"Buy milk","important":"yes"}"#);
        assert!(parsed.is_err());
    }
}
