pub(crate) mod kind;
pub(crate) mod repository;

use crate::validate::validator::Validator;

pub(crate) fn validate_credential_name(v: &mut Validator, name: &str, path: &str) {
    if name.trim().is_empty() {
        v.push(path, "must not be empty");
    }
}
