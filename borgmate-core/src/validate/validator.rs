use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ValidationError, Violation};
use crate::types::OperationRequest;

use super::rules;

pub(crate) static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid"));

pub(crate) const ENCRYPTION_MODES: &[&str] = &[
    "none",
    "authenticated",
    "authenticated-blake2",
    "repokey",
    "keyfile",
    "repokey-blake2",
    "keyfile-blake2",
];

#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }

    pub fn validate_request(&mut self, request: &OperationRequest) {
        rules::repository::validate_repository(self, &request.repository, "repository");
        rules::validate_credential_name(self, &request.credential, "credential");
        rules::kind::validate_kind(self, &request.kind, "kind");
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    pub(crate) fn validate_name(&mut self, path: &str, name: &str) {
        if name.is_empty() {
            self.push(path, "must not be empty");
        } else if !NAME_RE.is_match(name) {
            self.push(path, "may only contain letters, digits, '.', '_' and '-'");
        }
    }
}
