//! Editable module text field.
//!
//! Each box hosts one field. The user types freely; as soon as the text
//! contains a complete command token the field locks, its content is
//! replaced by exactly that token, and the classified command is handed
//! back once. Text without a token leaves the field editable.

use patch_core::parser::{ModuleCommand, classify, recognize};

/// A token accepted by a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    pub token: String,
    pub command: ModuleCommand,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleField {
    text: String,
    locked: bool,
}

impl ModuleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editable(&self) -> bool {
        !self.locked
    }

    /// Locked fields are rendered as valid.
    pub fn is_valid(&self) -> bool {
        self.locked
    }

    /// Displayed content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Feed the field's full current content after an edit.
    pub fn input(&mut self, text: &str) -> Option<Accepted> {
        if self.locked {
            return None;
        }
        let Some(token) = recognize(text) else {
            self.text = text.to_string();
            return None;
        };
        self.locked = true;
        self.text = token.to_string();
        Some(Accepted {
            token: self.text.clone(),
            command: classify(token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patch_core::parser::Waveform;

    #[test]
    fn typing_locks_on_first_token() {
        let mut field = ModuleField::new();
        assert_eq!(field.input("s"), None);
        assert_eq!(field.input("si"), None);
        assert!(field.is_editable());

        let accepted = field.input("sin").unwrap();
        assert_eq!(accepted.token, "sin");
        assert_eq!(accepted.command, ModuleCommand::Osc(Waveform::Sine));
        assert!(!field.is_editable());
        assert!(field.is_valid());
    }

    #[test]
    fn accepted_text_is_normalized() {
        let mut field = ModuleField::new();
        field.input("  out  \n").unwrap();
        assert_eq!(field.text(), "out");
    }

    #[test]
    fn locked_field_accepts_only_once() {
        let mut field = ModuleField::new();
        assert!(field.input("4.2").is_some());
        assert_eq!(field.input("sq"), None);
        assert_eq!(field.text(), "4.2");
    }

    #[test]
    fn negative_frequency_locks_with_sign() {
        let mut field = ModuleField::new();
        assert_eq!(field.input("-"), None);
        assert_eq!(field.input("-4"), None);
        let accepted = field.input("-4.2").unwrap();
        assert_eq!(accepted.command, ModuleCommand::Freq(-4.2));
        assert_eq!(field.text(), "-4.2");
    }

    #[test]
    fn invalid_text_stays_editable() {
        let mut field = ModuleField::new();
        assert_eq!(field.input("bogus"), None);
        assert!(field.is_editable());
        assert!(!field.is_valid());
        assert_eq!(field.text(), "bogus");
    }
}
