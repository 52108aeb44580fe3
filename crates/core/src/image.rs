//! Image reference validation.
//!
//! Reviews carry an optional photo as an opaque reference: either an inline
//! `data:` URI produced by the client from the picked file, or an http(s)
//! URL. A data URI must name a common image type; a URL is refused only
//! when its path names some other file type.

use crate::error::CoreError;

/// Image subtypes accepted in `data:image/<subtype>` URIs.
pub const ACCEPTED_IMAGE_SUBTYPES: &[&str] =
    &["png", "jpeg", "jpg", "gif", "webp", "avif", "bmp", "svg+xml"];

/// File extensions accepted for remote image URLs.
const ACCEPTED_URL_EXTENSIONS: &[&str] =
    &["png", "jpeg", "jpg", "gif", "webp", "avif", "bmp", "svg"];

/// The kind of reference a review photo uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRefKind {
    /// Inline `data:image/...` URI.
    DataUri,
    /// Remote `http://` or `https://` URL.
    Url,
}

/// Validate an image reference and report its kind.
pub fn validate_image_ref(reference: &str) -> Result<ImageRefKind, CoreError> {
    if let Some(rest) = reference.strip_prefix("data:") {
        return validate_data_uri(rest).map(|()| ImageRefKind::DataUri);
    }

    if reference.starts_with("https://") || reference.starts_with("http://") {
        return validate_url(reference).map(|()| ImageRefKind::Url);
    }

    Err(CoreError::Validation(
        "Image must be a data URI or an http(s) URL".to_string(),
    ))
}

/// `rest` is everything after `data:`, e.g. `image/png;base64,iVBOR...`.
fn validate_data_uri(rest: &str) -> Result<(), CoreError> {
    let (header, payload) = rest.split_once(',').ok_or_else(|| {
        CoreError::Validation("Image data URI is missing its payload".to_string())
    })?;

    let media_type = header.split(';').next().unwrap_or_default();
    let subtype = media_type
        .strip_prefix("image/")
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Unsupported media type '{media_type}'. Expected an image"
            ))
        })?;

    if !ACCEPTED_IMAGE_SUBTYPES.contains(&subtype.as_str()) {
        return Err(CoreError::Validation(format!(
            "Unsupported image type '{subtype}'. Must be one of: {}",
            ACCEPTED_IMAGE_SUBTYPES.join(", ")
        )));
    }

    if payload.is_empty() {
        return Err(CoreError::Validation("Image data URI is empty".to_string()));
    }

    Ok(())
}

/// Remote URLs are opaque: extensionless paths (CDN ids, query-built
/// resizes) are accepted, but a path whose last segment names a non-image
/// file type is not.
fn validate_url(url: &str) -> Result<(), CoreError> {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or_default();
    let location = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let (host, path) = location.split_once('/').unwrap_or((location, ""));

    if host.is_empty() {
        return Err(CoreError::Validation("Image URL is missing a host".to_string()));
    }

    let last_segment = path.rsplit('/').next().unwrap_or_default();
    match last_segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            if ACCEPTED_URL_EXTENSIONS.contains(&ext.as_str()) {
                Ok(())
            } else {
                Err(CoreError::Validation(format!(
                    "Image URL must point to one of: {}",
                    ACCEPTED_URL_EXTENSIONS.join(", ")
                )))
            }
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_data_uri_accepted() {
        assert_eq!(
            validate_image_ref("data:image/png;base64,iVBORw0KGgo=").unwrap(),
            ImageRefKind::DataUri
        );
    }

    #[test]
    fn media_type_is_case_insensitive() {
        assert!(validate_image_ref("data:image/JPEG;base64,/9j/4AAQ").is_ok());
    }

    #[test]
    fn non_image_data_uri_rejected() {
        assert!(validate_image_ref("data:application/pdf;base64,JVBERi0=").is_err());
    }

    #[test]
    fn unknown_image_subtype_rejected() {
        assert!(validate_image_ref("data:image/x-icon;base64,AAAB").is_err());
    }

    #[test]
    fn data_uri_without_payload_rejected() {
        assert!(validate_image_ref("data:image/png;base64").is_err());
        assert!(validate_image_ref("data:image/png;base64,").is_err());
    }

    #[test]
    fn image_url_accepted() {
        assert_eq!(
            validate_image_ref("https://cdn.example.com/photos/tacos.webp?w=640").unwrap(),
            ImageRefKind::Url
        );
    }

    #[test]
    fn extensionless_url_accepted() {
        assert_eq!(
            validate_image_ref("https://images.example.com/photo/123?w=640").unwrap(),
            ImageRefKind::Url
        );
        assert!(validate_image_ref("https://images.example.com").is_ok());
    }

    #[test]
    fn dotted_host_is_not_an_extension() {
        assert!(validate_image_ref("http://cdn.example.com/").is_ok());
    }

    #[test]
    fn url_without_host_rejected() {
        assert!(validate_image_ref("https:///tacos.png").is_err());
    }

    #[test]
    fn non_image_url_rejected() {
        assert!(validate_image_ref("https://example.com/index.html").is_err());
    }

    #[test]
    fn other_schemes_rejected() {
        assert!(validate_image_ref("file:///etc/passwd").is_err());
        assert!(validate_image_ref("tacos.png").is_err());
    }
}
