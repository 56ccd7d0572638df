//! Public submission schemas and validation.
//!
//! Raw payloads are deserialized with every field optional so that a missing
//! field is reported as a validation message rather than a parse error.
//! Validation trims whitespace first, then checks constraints in declared
//! field order and reports only the first violation. A record is either
//! fully valid or rejected; there is no partial result.
//!
//! A filled honeypot is not a validation failure. The validated record keeps
//! it and [`is_bot`](ValidatedComment::is_bot) tells the handler to take the
//! silent path.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::normalize_email;
use crate::error::{Error, Result};
use crate::sanitize::sanitize_text;

/// The three public forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Comment,
    Newsletter,
    Contact,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Newsletter => "newsletter",
            Self::Contact => "contact",
        }
    }
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a JSON request body into a raw payload.
pub fn parse_payload<T: DeserializeOwned>(kind: SubmissionKind, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|_| Error::validation(kind, "Invalid request body"))
}

// =============================================================================
// Raw payloads
// =============================================================================

/// Raw comment form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub post_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub content: Option<String>,
    pub honeypot: Option<String>,
}

/// Raw newsletter signup body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterPayload {
    pub email: Option<String>,
    pub name: Option<String>,
    pub honeypot: Option<String>,
}

/// Raw contact form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub honeypot: Option<String>,
    pub verification_token: Option<String>,
}

// =============================================================================
// Validated records
// =============================================================================

/// Comment that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedComment {
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub content: String,
    pub honeypot: Option<String>,
}

/// Newsletter signup that passed validation. The email is lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedSubscription {
    pub email: String,
    pub name: Option<String>,
    pub honeypot: Option<String>,
}

/// Contact message that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedContact {
    pub name: String,
    pub email: String,
    pub message: String,
    pub honeypot: Option<String>,
    /// Passed through untouched for the notification collaborator.
    pub verification_token: Option<String>,
}

fn honeypot_filled(honeypot: &Option<String>) -> bool {
    honeypot.as_deref().is_some_and(|h| !h.trim().is_empty())
}

impl ValidatedComment {
    pub fn is_bot(&self) -> bool {
        honeypot_filled(&self.honeypot)
    }

    /// Neutralize markup in the free-text fields.
    ///
    /// The stripped text is checked against the same bounds again, so a
    /// field whose length came from markup alone is rejected.
    pub fn sanitized(self) -> Result<Self> {
        let fields = CommentFields {
            name: sanitize_text(&self.name),
            email: self.email,
            content: sanitize_text(&self.content),
        };
        fields.check()?;

        Ok(Self {
            name: fields.name,
            email: fields.email,
            content: fields.content,
            ..self
        })
    }
}

impl ValidatedSubscription {
    pub fn is_bot(&self) -> bool {
        honeypot_filled(&self.honeypot)
    }

    pub fn sanitized(self) -> Result<Self> {
        let fields = NewsletterFields {
            email: self.email,
            name: self
                .name
                .as_deref()
                .map(sanitize_text)
                .filter(|n| !n.is_empty()),
        };
        fields.check()?;

        Ok(Self {
            email: fields.email,
            name: fields.name,
            ..self
        })
    }
}

impl ValidatedContact {
    pub fn is_bot(&self) -> bool {
        honeypot_filled(&self.honeypot)
    }

    pub fn sanitized(self) -> Result<Self> {
        let fields = ContactFields {
            name: sanitize_text(&self.name),
            email: self.email,
            message: sanitize_text(&self.message),
        };
        fields.check()?;

        Ok(Self {
            name: fields.name,
            email: fields.email,
            message: fields.message,
            ..self
        })
    }
}

// =============================================================================
// Validation
// =============================================================================

#[derive(Debug, Validate)]
struct CommentFields {
    #[validate(length(min = 2, max = 100))]
    name: String,
    #[validate(email, length(max = 254))]
    email: String,
    #[validate(length(min = 10, max = 2000))]
    content: String,
}

#[derive(Debug, Validate)]
struct NewsletterFields {
    #[validate(email, length(max = 254))]
    email: String,
    #[validate(length(max = 100))]
    name: Option<String>,
}

#[derive(Debug, Validate)]
struct ContactFields {
    #[validate(length(min = 2, max = 100))]
    name: String,
    #[validate(email, length(max = 254))]
    email: String,
    #[validate(length(min = 10, max = 5000))]
    message: String,
}

/// A field as seen by the validator: name, label used in messages, value.
struct FieldRef<'a> {
    name: &'static str,
    label: &'static str,
    value: Option<&'a str>,
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn trimmed_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CommentFields {
    fn check(&self) -> Result<()> {
        self.validate().map_err(|errors| {
            first_violation(
                SubmissionKind::Comment,
                &errors,
                &[
                    FieldRef { name: "name", label: "Name", value: Some(&self.name) },
                    FieldRef { name: "email", label: "Email", value: Some(&self.email) },
                    FieldRef { name: "content", label: "Content", value: Some(&self.content) },
                ],
            )
        })
    }
}

impl NewsletterFields {
    fn check(&self) -> Result<()> {
        self.validate().map_err(|errors| {
            first_violation(
                SubmissionKind::Newsletter,
                &errors,
                &[
                    FieldRef { name: "email", label: "Email", value: Some(&self.email) },
                    FieldRef { name: "name", label: "Name", value: self.name.as_deref() },
                ],
            )
        })
    }
}

impl ContactFields {
    fn check(&self) -> Result<()> {
        self.validate().map_err(|errors| {
            first_violation(
                SubmissionKind::Contact,
                &errors,
                &[
                    FieldRef { name: "name", label: "Name", value: Some(&self.name) },
                    FieldRef { name: "email", label: "Email", value: Some(&self.email) },
                    FieldRef { name: "message", label: "Message", value: Some(&self.message) },
                ],
            )
        })
    }
}

impl CommentPayload {
    pub fn validate(self) -> Result<ValidatedComment> {
        let post_id = Uuid::parse_str(self.post_id.as_deref().unwrap_or_default().trim())
            .map_err(|_| Error::validation(SubmissionKind::Comment, "Invalid post ID"))?;

        let fields = CommentFields {
            name: trimmed(self.name),
            email: trimmed(self.email),
            content: trimmed(self.content),
        };

        fields.check()?;

        Ok(ValidatedComment {
            post_id,
            name: fields.name,
            email: fields.email,
            content: fields.content,
            honeypot: self.honeypot,
        })
    }
}

impl NewsletterPayload {
    pub fn validate(self) -> Result<ValidatedSubscription> {
        let fields = NewsletterFields {
            email: normalize_email(self.email.as_deref().unwrap_or_default()),
            name: trimmed_opt(self.name),
        };

        fields.check()?;

        Ok(ValidatedSubscription {
            email: fields.email,
            name: fields.name,
            honeypot: self.honeypot,
        })
    }
}

impl ContactPayload {
    pub fn validate(self) -> Result<ValidatedContact> {
        let fields = ContactFields {
            name: trimmed(self.name),
            email: trimmed(self.email),
            message: trimmed(self.message),
        };

        fields.check()?;

        Ok(ValidatedContact {
            name: fields.name,
            email: fields.email,
            message: fields.message,
            honeypot: self.honeypot,
            verification_token: self.verification_token,
        })
    }
}

/// Turn the first error, in declared field order, into a single message.
fn first_violation(kind: SubmissionKind, errors: &ValidationErrors, fields: &[FieldRef<'_>]) -> Error {
    let field_errors = errors.field_errors();

    for field in fields {
        if let Some(err) = field_errors.get(field.name).and_then(|errs| errs.first()) {
            return Error::validation(kind, describe(field, err));
        }
    }

    Error::validation(kind, "Invalid submission")
}

fn describe(field: &FieldRef<'_>, err: &ValidationError) -> String {
    let label = field.label;
    match err.code.as_ref() {
        "email" => "Invalid email address".to_string(),
        "length" => {
            let min = err.params.get("min").and_then(|v| v.as_u64());
            let max = err.params.get("max").and_then(|v| v.as_u64());
            let len = field.value.map(|v| v.chars().count() as u64).unwrap_or(0);
            match (min, max) {
                (Some(min), _) if len < min => {
                    format!("{label} must be at least {min} characters")
                }
                (_, Some(max)) => format!("{label} must be at most {max} characters"),
                _ => format!("Invalid {}", label.to_lowercase()),
            }
        }
        _ => match &err.message {
            Some(message) => message.to_string(),
            None => format!("Invalid {}", label.to_lowercase()),
        },
    }
}
