pub mod credential_format;
pub mod evaluation;
pub mod input_descriptor;
pub mod json_path;
pub mod manifest;
pub mod presentation_definition;
pub mod presentation_submission;
pub mod validation;
