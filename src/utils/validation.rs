use crate::utils::error::{Result, ScaffoldError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Maven repositories may be remote (`http`, `https`) or a local `file://` tree.
/// `file://~/.m2/repository` is not a well-formed URL but Gradle accepts it, so
/// `file://` locations are only checked for a non-empty remainder.
pub fn validate_repository_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    if let Some(location) = url_str.strip_prefix("file://") {
        if location.is_empty() {
            return Err(ScaffoldError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: "file:// URL has no path".to_string(),
            });
        }
        return Ok(());
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ScaffoldError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ScaffoldError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

fn namespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
            .expect("namespace pattern is a valid regex")
    })
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is a valid regex")
    })
}

/// Smithy namespaces are dot-separated identifiers, e.g. `com.example.api`.
pub fn validate_namespace(field_name: &str, value: &str) -> Result<()> {
    if !namespace_pattern().is_match(value) {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a dot-separated Smithy namespace such as 'com.example'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_shape_name(field_name: &str, value: &str) -> Result<()> {
    if !identifier_pattern().is_match(value) {
        return Err(ScaffoldError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a Smithy shape identifier such as 'MyApi'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_unique_names<'a>(
    field_name: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ScaffoldError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.to_string(),
                reason: "Name is declared more than once".to_string(),
            });
        }
    }
    Ok(())
}
