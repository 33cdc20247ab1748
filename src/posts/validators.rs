use super::models::{CreateBlogPostRequest, UpdateBlogPostRequest};
use crate::common::{ValidationResult, Validator};

pub const MAX_TITLE_CHARS: usize = 255;

impl Validator<CreateBlogPostRequest> for CreateBlogPostRequest {
    fn validate(&self, data: &CreateBlogPostRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("title", &data.title, "Title is required");
        result.max_chars("title", &data.title, MAX_TITLE_CHARS);
        result.require("excerpt", &data.excerpt, "Excerpt is required");
        result.require("author", &data.author, "Author is required");
        validate_image(&mut result, &data.image);

        result
    }
}

/// Only fields present in the patch are checked
impl Validator<UpdateBlogPostRequest> for UpdateBlogPostRequest {
    fn validate(&self, data: &UpdateBlogPostRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(title) = &data.title {
            result.require("title", title, "Title cannot be empty");
            result.max_chars("title", title, MAX_TITLE_CHARS);
        }
        if let Some(excerpt) = &data.excerpt {
            result.require("excerpt", excerpt, "Excerpt cannot be empty");
        }
        if let Some(author) = &data.author {
            result.require("author", author, "Author cannot be empty");
        }
        if let Some(image) = &data.image {
            validate_image(&mut result, image);
        }

        result
    }
}

/// Image may be empty, an absolute http(s) URL, or a site-relative path
fn validate_image(result: &mut ValidationResult, image: &str) {
    if !image.is_empty()
        && !image.starts_with("http://")
        && !image.starts_with("https://")
        && !image.starts_with('/')
    {
        result.add_error(
            "image",
            "Image must be a URL starting with http:// or https:// or a path starting with /",
        );
    }
}
