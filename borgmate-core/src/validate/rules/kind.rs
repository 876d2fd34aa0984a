use crate::types::OperationKind;
use crate::validate::validator::{Validator, ENCRYPTION_MODES};

pub(crate) fn validate_kind(v: &mut Validator, kind: &OperationKind, path: &str) {
    match kind {
        OperationKind::Init { encryption } => {
            if !ENCRYPTION_MODES.contains(&encryption.as_str()) {
                v.push(
                    format!("{path}.encryption"),
                    format!("unknown encryption mode '{encryption}'"),
                );
            }
        }
        OperationKind::Create { archive, paths } => {
            v.validate_name(&format!("{path}.archive"), archive);
            if paths.is_empty() {
                v.push(format!("{path}.paths"), "at least one path is required");
            }
            for (i, p) in paths.iter().enumerate() {
                if p.as_os_str().is_empty() {
                    v.push(format!("{path}.paths[{i}]"), "must not be empty");
                }
            }
        }
        OperationKind::Rename { archive, new_name } => {
            v.validate_name(&format!("{path}.archive"), archive);
            v.validate_name(&format!("{path}.new_name"), new_name);
            if archive == new_name {
                v.push(format!("{path}.new_name"), "must differ from the current archive name");
            }
        }
        OperationKind::Delete => {}
    }
}
