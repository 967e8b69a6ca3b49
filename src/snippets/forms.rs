use serde::Deserialize;

use crate::validation::Validator;

fn default_expires() -> i32 {
    365
}

/// Decoded `POST /snippet/create` body. Missing fields fall back to their
/// defaults; a structurally malformed body (non-numeric `expires`) is a
/// decode failure handled as a 400 by the caller.
#[derive(Debug, Deserialize)]
pub struct SnippetForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_expires")]
    pub expires: i32,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(skip)]
    pub validator: Validator,
}

impl Default for SnippetForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: default_expires(),
            csrf_token: String::new(),
            validator: Validator::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_form_defaults_to_one_year_expiry() {
        let form = SnippetForm::default();
        assert_eq!(form.expires, 365);
        assert!(form.title.is_empty());
        assert!(form.validator.is_valid());
    }
}
