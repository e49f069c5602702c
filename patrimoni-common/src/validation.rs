//! Declarative client-side validation
//!
//! One validator per entity kind, runnable without any UI. Validation runs
//! before any network call; a failure names the offending canonical field
//! when there is one.

use thiserror::Error;
use url::Url;

use crate::config::{AllowedOrigin, ClientConfig, DEFAULT_MAX_IMAGE_BYTES};
use crate::models::{Article, Carte, Credentials, Histoire, Mot, PendingImage};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// MIME types accepted for image uploads
pub const ACCEPTED_IMAGE_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// A client-side validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Canonical field the message refers to, if any
    pub field: Option<String>,
    /// User-facing message
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn on_field(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }
}

pub type ValidationResult = std::result::Result<(), ValidationError>;

/// Environment-dependent validation settings
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRules {
    pub iframe_whitelist: Vec<AllowedOrigin>,
    pub max_image_bytes: u64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            iframe_whitelist: crate::config::default_iframe_whitelist(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl From<&ClientConfig> for ValidationRules {
    fn from(config: &ClientConfig) -> Self {
        Self {
            iframe_whitelist: config.iframe_whitelist.clone(),
            max_image_bytes: config.max_image_bytes,
        }
    }
}

/// Entities with a declarative validator
pub trait Validate {
    /// Check the draft together with any image waiting to be uploaded
    fn validate(&self, rules: &ValidationRules, image: Option<&PendingImage>) -> ValidationResult;
}

// ========================================
// Field-level checks
// ========================================

/// Non-blank after trimming
pub fn validate_required(value: &str, field: &str, label: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::on_field(
            field,
            format!("{label} est obligatoire."),
        ));
    }
    Ok(())
}

/// At most `max` characters; empty values are not checked
pub fn validate_max_length(value: &str, max: usize, field: &str, label: &str) -> ValidationResult {
    if value.chars().count() > max {
        return Err(ValidationError::on_field(
            field,
            format!("{label} ne peut pas dépasser {max} caractères."),
        ));
    }
    Ok(())
}

/// Parses as an absolute http(s) URL
pub fn is_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Empty, or an http(s) URL
pub fn validate_optional_url(value: &str, field: &str, message: &str) -> ValidationResult {
    let value = value.trim();
    if value.is_empty() || is_http_url(value) {
        Ok(())
    } else {
        Err(ValidationError::on_field(field, message))
    }
}

/// Empty, or an http(s) URL whose host and port are whitelisted
pub fn is_allowed_iframe_url(value: &str, whitelist: &[AllowedOrigin]) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return true;
    }
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let port = url.port_or_known_default();
    whitelist.iter().any(|origin| origin.allows(host, port))
}

fn describe_whitelist(whitelist: &[AllowedOrigin]) -> String {
    whitelist
        .iter()
        .map(|o| {
            let ports: Vec<String> = o.ports.iter().map(u16::to_string).collect();
            format!("{}:{}", o.host, ports.join("/"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// MIME type accepted and size within bounds
pub fn validate_image(image: &PendingImage, max_bytes: u64) -> ValidationResult {
    let mime = image.content_type.trim().to_ascii_lowercase();
    if !ACCEPTED_IMAGE_TYPES.contains(&mime.as_str()) {
        return Err(ValidationError::on_field(
            "image",
            format!(
                "Type de fichier non supporté. Types acceptés: {}",
                ACCEPTED_IMAGE_TYPES.join(", ")
            ),
        ));
    }
    if image.size() > max_bytes {
        let mib = |b: u64| b as f64 / (1024.0 * 1024.0);
        return Err(ValidationError::on_field(
            "image",
            format!(
                "Fichier trop volumineux ({:.1}MB). Taille maximale: {:.1}MB",
                mib(image.size()),
                mib(max_bytes)
            ),
        ));
    }
    Ok(())
}

fn validate_pending(image: Option<&PendingImage>, rules: &ValidationRules) -> ValidationResult {
    match image {
        Some(image) => validate_image(image, rules.max_image_bytes),
        None => Ok(()),
    }
}

/// Both login fields filled in
pub fn validate_login(credentials: &Credentials) -> ValidationResult {
    if credentials.username.trim().is_empty() || credentials.password.trim().is_empty() {
        return Err(ValidationError::new("Veuillez remplir tous les champs."));
    }
    Ok(())
}

/// Login checks plus password length bounds
pub fn validate_registration(credentials: &Credentials) -> ValidationResult {
    validate_login(credentials)?;
    let len = credentials.password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::on_field(
            "password",
            format!("Le mot de passe doit contenir au moins {MIN_PASSWORD_LENGTH} caractères."),
        ));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::on_field(
            "password",
            format!("Le mot de passe ne peut pas dépasser {MAX_PASSWORD_LENGTH} caractères."),
        ));
    }
    Ok(())
}

// ========================================
// Per-entity validators
// ========================================

impl Validate for Article {
    fn validate(&self, rules: &ValidationRules, image: Option<&PendingImage>) -> ValidationResult {
        validate_required(&self.title, "titre", "Le titre")?;
        validate_max_length(&self.title, MAX_TITLE_LENGTH, "titre", "Le titre")?;
        validate_max_length(
            &self.description,
            MAX_DESCRIPTION_LENGTH,
            "description",
            "La description",
        )?;
        validate_optional_url(
            &self.image_url,
            "imageUrl",
            "L'URL de l'image n'est pas valide.",
        )?;
        validate_optional_url(
            &self.source_url,
            "sourceUrl",
            "L'URL de la source n'est pas valide.",
        )?;
        validate_pending(image, rules)
    }
}

impl Validate for Mot {
    fn validate(&self, _rules: &ValidationRules, _image: Option<&PendingImage>) -> ValidationResult {
        validate_required(&self.french_word, "motsFrancais", "Le mot français")
    }
}

impl Validate for Histoire {
    fn validate(&self, _rules: &ValidationRules, _image: Option<&PendingImage>) -> ValidationResult {
        validate_required(&self.title, "titre", "Le titre")?;
        validate_max_length(&self.title, MAX_TITLE_LENGTH, "titre", "Le titre")?;
        validate_required(&self.typology, "typologie", "La typologie")?;
        validate_required(&self.period, "periode", "La période")?;
        validate_optional_url(
            &self.source_url,
            "sourceUrl",
            "L'URL de la source n'est pas valide.",
        )
    }
}

impl Validate for Carte {
    fn validate(&self, rules: &ValidationRules, image: Option<&PendingImage>) -> ValidationResult {
        validate_required(&self.title, "titre", "Le titre")?;
        validate_max_length(&self.title, MAX_TITLE_LENGTH, "titre", "Le titre")?;
        if let Some(iframe) = self.iframe() {
            if !is_allowed_iframe_url(iframe, &rules.iframe_whitelist) {
                return Err(ValidationError::on_field(
                    "iframeUrl",
                    format!(
                        "URL iframe non autorisée ({} uniquement).",
                        describe_whitelist(&rules.iframe_whitelist)
                    ),
                ));
            }
        }
        validate_pending(image, rules)?;
        if self.iframe().is_none() && !self.image_stored && image.is_none() {
            return Err(ValidationError::new(
                "Une carte doit avoir une URL iframe ou une image.",
            ));
        }
        Ok(())
    }
}
