//! Request validation for the workbench proxy routes.
//!
//! Request DTOs derive [`Validate`]; [`validate_request`] flattens the
//! resulting [`ValidationErrors`] into a single [`CoreError::Validation`]
//! so handlers can propagate it with `?`.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::locale::Locale;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum prompt length in characters, after trimming.
pub const MIN_PROMPT_CHARS: usize = 10;

/// Maximum prompt length in characters, after trimming.
pub const MAX_PROMPT_CHARS: usize = 4_000;

/// Inclusive bounds for `slides_count`.
pub const MIN_SLIDES: u32 = 1;
pub const MAX_SLIDES: u32 = 30;

/// Default upload limit when `MAX_UPLOAD_MB` is not set.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 25;

/// File extensions accepted by the upload proxy.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["pdf", "docx", "pptx", "txt", "md"];

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /workbench/slides`, forwarded to the kernel's
/// `slides.generate` service.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SlidesGenerateRequest {
    #[validate(custom(function = "validate_prompt_text"))]
    pub prompt: String,
    #[validate(range(
        min = 1,
        max = 30,
        message = "slides_count must be between 1 and 30"
    ))]
    pub slides_count: u32,
    #[validate(custom(function = "validate_locale_code"))]
    pub language: String,
    #[validate(length(max = 64, message = "theme must be at most 64 characters"))]
    pub theme: Option<String>,
    pub template_id: Option<String>,
    pub upload_id: Option<String>,
}

/// Body of `POST /workbench/dubbing`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_dubbing_request"))]
pub struct DubbingRequest {
    #[validate(url(message = "source_url must be a valid URL"))]
    pub source_url: Option<String>,
    pub upload_id: Option<String>,
    #[validate(custom(function = "validate_locale_code"))]
    pub source_language: String,
    #[validate(custom(function = "validate_locale_code"))]
    pub target_language: String,
}

// ---------------------------------------------------------------------------
// Custom validators
// ---------------------------------------------------------------------------

fn error_with_message(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

/// Prompt must be within [`MIN_PROMPT_CHARS`]..=[`MAX_PROMPT_CHARS`] once trimmed.
pub fn validate_prompt_text(prompt: &str) -> Result<(), ValidationError> {
    let chars = prompt.trim().chars().count();
    if chars < MIN_PROMPT_CHARS {
        return Err(error_with_message(
            "prompt_too_short",
            format!("prompt must be at least {MIN_PROMPT_CHARS} characters (got {chars})"),
        ));
    }
    if chars > MAX_PROMPT_CHARS {
        return Err(error_with_message(
            "prompt_too_long",
            format!("prompt must be at most {MAX_PROMPT_CHARS} characters (got {chars})"),
        ));
    }
    Ok(())
}

/// The value must name a supported site locale.
pub fn validate_locale_code(code: &str) -> Result<(), ValidationError> {
    Locale::from_code(code).map(|_| ()).map_err(|_| {
        let supported: Vec<_> = Locale::all().iter().map(|l| l.code).collect();
        error_with_message(
            "unsupported_locale",
            format!("'{code}' is not one of {}", supported.join(", ")),
        )
    })
}

fn validate_dubbing_request(req: &DubbingRequest) -> Result<(), ValidationError> {
    if req.source_url.is_none() && req.upload_id.is_none() {
        return Err(error_with_message(
            "missing_source",
            "either source_url or upload_id is required".to_string(),
        ));
    }
    if let (Ok(source), Ok(target)) = (
        Locale::from_code(&req.source_language),
        Locale::from_code(&req.target_language),
    ) {
        if source == target {
            return Err(error_with_message(
                "same_language",
                "target_language must differ from source_language".to_string(),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Error flattening
// ---------------------------------------------------------------------------

/// Run `validator` rules and convert failures into [`CoreError::Validation`].
///
/// The message lists every failing field in alphabetical order, e.g.
/// `"prompt: prompt must be at least 10 characters (got 3); slides_count: ..."`.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), CoreError> {
    request
        .validate()
        .map_err(|errors| CoreError::Validation(describe_errors(&errors)))
}

fn describe_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let detail = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                if field == "__all__" {
                    detail
                } else {
                    format!("{field}: {detail}")
                }
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Size and type limits applied before forwarding an upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadConstraints {
    pub max_bytes: u64,
}

impl UploadConstraints {
    pub fn from_megabytes(mb: u64) -> Self {
        Self {
            max_bytes: mb.saturating_mul(1024 * 1024),
        }
    }

    /// Check a file name and size against the limits.
    pub fn check(&self, file_name: &str, size_bytes: u64) -> Result<(), CoreError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if !ALLOWED_UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CoreError::Validation(format!(
                "file type '.{extension}' is not allowed (accepted: {})",
                ALLOWED_UPLOAD_EXTENSIONS.join(", ")
            )));
        }
        if size_bytes == 0 {
            return Err(CoreError::Validation("file is empty".to_string()));
        }
        if size_bytes > self.max_bytes {
            return Err(CoreError::Validation(format!(
                "file exceeds the upload limit of {} bytes (got {size_bytes})",
                self.max_bytes
            )));
        }
        Ok(())
    }
}

impl Default for UploadConstraints {
    fn default() -> Self {
        Self::from_megabytes(DEFAULT_MAX_UPLOAD_MB)
    }
}
