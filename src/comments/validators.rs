use super::models::{CreateCommentRequest, UpdateCommentRequest};
use crate::common::{ValidationResult, Validator};

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_TEXT_CHARS: usize = 5000;

impl Validator<CreateCommentRequest> for CreateCommentRequest {
    fn validate(&self, data: &CreateCommentRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("name", &data.name, "Name is required");
        result.max_chars("name", &data.name, MAX_NAME_CHARS);
        result.require("text", &data.text, "Text is required");
        result.max_chars("text", &data.text, MAX_TEXT_CHARS);

        if let Some(email) = data.normalized_email() {
            if !email.contains('@') {
                result.add_error("email", "Invalid email format");
            }
        }

        result
    }
}

impl Validator<UpdateCommentRequest> for UpdateCommentRequest {
    fn validate(&self, data: &UpdateCommentRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(text) = &data.text {
            result.require("text", text, "Text cannot be empty");
            result.max_chars("text", text, MAX_TEXT_CHARS);
        }

        result
    }
}
