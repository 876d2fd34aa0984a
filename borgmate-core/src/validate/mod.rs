mod rules;
mod validator;

use crate::error::ValidationError;
use crate::types::OperationRequest;
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for OperationRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_request(self)
    }
}

pub fn validate_request(request: &OperationRequest) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_request(request);
    v.finish()
}
