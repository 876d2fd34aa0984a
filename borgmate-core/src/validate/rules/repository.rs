use crate::types::RepoTarget;
use crate::validate::validator::Validator;

pub(crate) fn validate_repository(v: &mut Validator, repo: &RepoTarget, path: &str) {
    v.validate_name(&format!("{path}.name"), &repo.name);

    let location = repo.location.trim();
    if location.is_empty() {
        v.push(format!("{path}.location"), "must not be empty");
    } else if location.contains("::") {
        // `::` separates repository and archive on the borg command line.
        v.push(format!("{path}.location"), "must not contain '::'");
    }
}
