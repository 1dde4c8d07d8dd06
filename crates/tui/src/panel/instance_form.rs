//! Instance identification form: draft editing, validation and save outcome.

use crate::company::Company;
use crate::input::TextInput;
use crate::toast::{Notifier, Toast};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static INSTANCE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]*$").expect("instance name pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("instance name is empty")]
    Empty,
    #[error("instance name may only contain letters, numbers, hyphens and underscores")]
    InvalidCharacters,
}

impl NameError {
    pub fn toast(&self) -> Toast {
        match self {
            NameError::Empty => Toast::destructive("Name required", "Enter a name for the instance"),
            NameError::InvalidCharacters => Toast::destructive(
                "Invalid name",
                "Use only letters, numbers, hyphens and underscores",
            ),
        }
    }
}

/// Returns the value to persist: trimmed and lowercased.
pub fn validate_instance_name(input: &str) -> Result<String, NameError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if !INSTANCE_NAME_PATTERN.is_match(trimmed) {
        return Err(NameError::InvalidCharacters);
    }
    Ok(trimmed.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFailure {
    NameInUse,
    Other(String),
}

impl SaveFailure {
    pub fn classify(message: &str) -> Self {
        if message.contains("unique") || message.contains("duplicate") {
            SaveFailure::NameInUse
        } else {
            SaveFailure::Other(message.to_string())
        }
    }

    pub fn toast(&self) -> Toast {
        match self {
            SaveFailure::NameInUse => Toast::destructive(
                "Name already in use",
                "This instance name is already used by another company",
            ),
            SaveFailure::Other(message) if !message.trim().is_empty() => {
                Toast::destructive("Error saving", message.clone())
            }
            SaveFailure::Other(_) => {
                Toast::destructive("Error saving", "Could not save the instance name")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct InstanceForm {
    pub draft: TextInput,
    saving: bool,
    seeded: bool,
}

impl InstanceForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Copies the persisted name into the draft the first time a company
    /// record arrives, unless the user already typed something.
    pub fn seed(&mut self, company: &Company) {
        if self.seeded {
            return;
        }
        self.seeded = true;
        if self.draft.is_empty() {
            if let Some(name) = company.instance_name() {
                self.draft.set(name);
            }
        }
    }

    pub fn displayed_value<'a>(&'a self, company: Option<&'a Company>) -> &'a str {
        if !self.draft.is_empty() {
            return self.draft.value();
        }
        company.and_then(Company::instance_name).unwrap_or("")
    }

    pub fn can_save(&self) -> bool {
        !self.saving && !self.draft.value().trim().is_empty()
    }

    pub fn revert(&mut self, company: Option<&Company>) {
        match company.and_then(Company::instance_name) {
            Some(name) => self.draft.set(name),
            None => self.draft.clear(),
        }
    }

    /// Validates the draft and marks the form as saving on success.
    pub fn begin_save(&mut self) -> Result<String, NameError> {
        let normalized = validate_instance_name(self.draft.value())?;
        self.saving = true;
        Ok(normalized)
    }

    pub fn finish_save(&mut self, result: Result<&Company, &str>, notifier: &mut dyn Notifier) {
        self.saving = false;
        match result {
            Ok(company) => {
                if let Some(name) = company.instance_name() {
                    self.draft.set(name);
                }
                notifier.notify(Toast::info(
                    "Instance saved!",
                    "The instance name was configured successfully",
                ));
            }
            Err(message) => {
                tracing::warn!("Saving instance name failed: {message}");
                notifier.notify(SaveFailure::classify(message).toast());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast::ToastVariant;

    #[derive(Default)]
    struct Recorder(Vec<Toast>);

    impl Notifier for Recorder {
        fn notify(&mut self, toast: Toast) {
            self.0.push(toast);
        }
    }

    fn company(instance: Option<&str>) -> Company {
        Company {
            id: "c1".into(),
            name: "Barbearia".into(),
            evolution_instance_name: instance.map(str::to_string),
        }
    }

    #[test]
    fn normalizes_valid_names() {
        assert_eq!(
            validate_instance_name(" MinhaBarbearia ").as_deref(),
            Ok("minhabarbearia")
        );
        assert_eq!(
            validate_instance_name("barbearia-centro_2").as_deref(),
            Ok("barbearia-centro_2")
        );
    }

    #[test]
    fn rejects_empty_and_invalid_names() {
        assert_eq!(validate_instance_name(""), Err(NameError::Empty));
        assert_eq!(validate_instance_name("   \t"), Err(NameError::Empty));
        for bad in ["minha barbearia", "barbearia!", "café", "a/b", "x.y"] {
            assert_eq!(
                validate_instance_name(bad),
                Err(NameError::InvalidCharacters),
                "{bad}"
            );
        }
    }

    #[test]
    fn invalid_draft_does_not_enter_saving() {
        let mut form = InstanceForm::new();
        form.draft.set("no spaces allowed");
        assert_eq!(form.begin_save(), Err(NameError::InvalidCharacters));
        assert!(!form.is_saving());
    }

    #[test]
    fn classifies_collisions() {
        assert_eq!(
            SaveFailure::classify("duplicate key value violates unique constraint"),
            SaveFailure::NameInUse
        );
        assert_eq!(
            SaveFailure::classify("UNIQUE violation"),
            SaveFailure::Other("UNIQUE violation".into())
        );
        assert_eq!(
            SaveFailure::classify("connection refused"),
            SaveFailure::Other("connection refused".into())
        );
    }

    #[test]
    fn duplicate_failure_yields_collision_toast() {
        let mut form = InstanceForm::new();
        form.draft.set("taken");
        form.begin_save().expect("valid");
        assert!(form.is_saving());

        let mut toasts = Recorder::default();
        form.finish_save(Err("duplicate key value"), &mut toasts);
        assert!(!form.is_saving());
        assert_eq!(toasts.0.len(), 1);
        assert_eq!(toasts.0[0].title, "Name already in use");
        assert_eq!(toasts.0[0].variant, ToastVariant::Destructive);
    }

    #[test]
    fn generic_failure_falls_back_to_default_text() {
        let mut toasts = Recorder::default();
        let mut form = InstanceForm::new();
        form.finish_save(Err("disk full"), &mut toasts);
        form.finish_save(Err(""), &mut toasts);
        assert_eq!(toasts.0[0].description, "disk full");
        assert_eq!(toasts.0[1].description, "Could not save the instance name");
    }

    #[test]
    fn success_shows_confirmation() {
        let mut toasts = Recorder::default();
        let mut form = InstanceForm::new();
        form.draft.set(" MinhaBarbearia ");
        form.begin_save().expect("valid");
        form.finish_save(Ok(&company(Some("minhabarbearia"))), &mut toasts);
        assert_eq!(form.draft.value(), "minhabarbearia");
        assert_eq!(toasts.0[0].title, "Instance saved!");
        assert_eq!(toasts.0[0].variant, ToastVariant::Default);
    }

    #[test]
    fn seed_only_fills_an_untouched_draft() {
        let mut form = InstanceForm::new();
        form.seed(&company(Some("centro")));
        assert_eq!(form.draft.value(), "centro");

        form.draft.set("edited");
        form.seed(&company(Some("other")));
        assert_eq!(form.draft.value(), "edited");

        let fresh = InstanceForm::new();
        let persisted = company(Some("centro"));
        assert_eq!(fresh.displayed_value(Some(&persisted)), "centro");
        assert!(!fresh.can_save());
    }
}
