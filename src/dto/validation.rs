//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_SUBDOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Validates a Kubernetes object name (RFC 1123 subdomain).
///
/// # Examples
///
/// ```ignore
/// validate_dns_subdomain("valheim-01")      // Ok
/// validate_dns_subdomain("eu.valheim")      // Ok
/// validate_dns_subdomain("Valheim")         // Err - uppercase
/// validate_dns_subdomain("-valheim")        // Err - leading dash
/// ```
pub fn validate_dns_subdomain(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > MAX_SUBDOMAIN_LEN {
        let mut err = ValidationError::new("dns_subdomain_length");
        err.message = Some(
            format!(
                "name must be between 1 and {MAX_SUBDOMAIN_LEN} characters (got {})",
                name.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !name.split('.').all(is_dns_label) {
        let mut err = ValidationError::new("dns_subdomain_format");
        err.message = Some(
            "name must consist of lowercase alphanumeric characters, '-' or '.', and start and end with an alphanumeric character"
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates a Kubernetes namespace name (RFC 1123 label).
pub fn validate_dns_label(name: &str) -> Result<(), ValidationError> {
    if name.len() > MAX_LABEL_LEN || !is_dns_label(name) {
        let mut err = ValidationError::new("dns_label_format");
        err.message = Some(
            format!(
                "namespace must be at most {MAX_LABEL_LEN} lowercase alphanumeric characters or '-', starting and ending with an alphanumeric character"
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

fn is_dns_label(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && segment.len() <= MAX_LABEL_LEN
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase() || *b == b'-')
        }
        _ => false,
    }
}
