//! Byte-exact `multipart/form-data` encoding.
//!
//! [`encode`] is a pure function of its boundary and parts: identical inputs
//! always produce identical bytes. Each part is framed as
//!
//! ```text
//! --{boundary}\r\n
//! Content-Disposition: form-data; name="{name}"[; filename="{filename}"]\r\n
//! [Content-Type: {content_type}\r\n]
//! \r\n
//! {data}\r\n
//! ```
//!
//! and the body ends with `--{boundary}--\r\n`.

use uuid::Uuid;

use crate::error::ClientError;

const BOUNDARY_PREFIX: &str = "Boundary-";
/// RFC 2046 upper bound on boundary length.
const MAX_BOUNDARY_LEN: usize = 70;
const FRESH_BOUNDARY_ATTEMPTS: usize = 3;

/// A validated multipart boundary token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary(String);

impl Boundary {
    /// `Boundary-{uuid v4}`.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{BOUNDARY_PREFIX}{}", Uuid::new_v4()))
    }

    /// Wraps a caller-chosen token, e.g. a fixed value in tests.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encoding`] if the token is empty, longer than
    /// 70 characters, or contains characters outside RFC 2046 `bchars`
    /// (space excluded).
    pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
        let token = token.into();
        if token.is_empty() || token.len() > MAX_BOUNDARY_LEN {
            return Err(ClientError::Encoding(format!(
                "boundary must be 1..={MAX_BOUNDARY_LEN} characters, got {}",
                token.len()
            )));
        }
        if let Some(bad) = token.chars().find(|c| !is_boundary_char(*c)) {
            return Err(ClientError::Encoding(format!(
                "boundary contains disallowed character {bad:?}"
            )));
        }
        Ok(Self(token))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn delimiter(&self) -> Vec<u8> {
        format!("--{}", self.0).into_bytes()
    }
}

fn is_boundary_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "'()+_,-./:=?".contains(c)
}

/// One named field of a form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl MultipartPart {
    /// A plain text field with no filename or content type.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: value.into().into_bytes(),
        }
    }

    /// A file field.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            data,
        }
    }
}

/// An encoded body plus the boundary it was framed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    boundary: Boundary,
    bytes: Vec<u8>,
}

impl MultipartBody {
    #[must_use]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary.as_str())
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encodes `parts` in order using `boundary`.
///
/// # Errors
///
/// Returns [`ClientError::Encoding`] if a part name is empty, a header value
/// contains `"`, CR or LF, or any part's data contains the boundary delimiter.
pub fn encode(boundary: &Boundary, parts: &[MultipartPart]) -> Result<MultipartBody, ClientError> {
    let delimiter = boundary.delimiter();
    let capacity = parts
        .iter()
        .map(|p| p.data.len() + p.name.len() + delimiter.len() + 96)
        .sum::<usize>()
        + delimiter.len()
        + 4;
    let mut bytes = Vec::with_capacity(capacity);

    for part in parts {
        validate_part(part)?;
        if contains(&part.data, &delimiter) {
            return Err(ClientError::Encoding(format!(
                "data for part \"{}\" contains the boundary delimiter",
                part.name
            )));
        }

        bytes.extend_from_slice(&delimiter);
        bytes.extend_from_slice(b"\r\n");
        bytes.extend_from_slice(b"Content-Disposition: form-data; name=\"");
        bytes.extend_from_slice(part.name.as_bytes());
        bytes.push(b'"');
        if let Some(filename) = &part.filename {
            bytes.extend_from_slice(b"; filename=\"");
            bytes.extend_from_slice(filename.as_bytes());
            bytes.push(b'"');
        }
        bytes.extend_from_slice(b"\r\n");
        if let Some(content_type) = &part.content_type {
            bytes.extend_from_slice(b"Content-Type: ");
            bytes.extend_from_slice(content_type.as_bytes());
            bytes.extend_from_slice(b"\r\n");
        }
        bytes.extend_from_slice(b"\r\n");
        bytes.extend_from_slice(&part.data);
        bytes.extend_from_slice(b"\r\n");
    }

    bytes.extend_from_slice(&delimiter);
    bytes.extend_from_slice(b"--\r\n");

    Ok(MultipartBody {
        boundary: boundary.clone(),
        bytes,
    })
}

/// Encodes `parts` with a freshly generated boundary, regenerating it if it
/// happens to occur inside some part's data.
///
/// # Errors
///
/// Returns [`ClientError::Encoding`] on invalid part headers, or if every
/// generated boundary collided.
pub fn encode_with_fresh_boundary(parts: &[MultipartPart]) -> Result<MultipartBody, ClientError> {
    for _ in 0..FRESH_BOUNDARY_ATTEMPTS {
        let boundary = Boundary::generate();
        let delimiter = boundary.delimiter();
        if parts.iter().any(|p| contains(&p.data, &delimiter)) {
            tracing::debug!(boundary = boundary.as_str(), "boundary collided with part data");
            continue;
        }
        return encode(&boundary, parts);
    }
    Err(ClientError::Encoding(format!(
        "no collision-free boundary after {FRESH_BOUNDARY_ATTEMPTS} attempts"
    )))
}

fn validate_part(part: &MultipartPart) -> Result<(), ClientError> {
    if part.name.is_empty() {
        return Err(ClientError::Encoding("part name must not be empty".to_owned()));
    }
    check_header_value("name", &part.name)?;
    if let Some(filename) = &part.filename {
        check_header_value("filename", filename)?;
    }
    if let Some(content_type) = &part.content_type {
        check_header_value("content type", content_type)?;
    }
    Ok(())
}

fn check_header_value(what: &str, value: &str) -> Result<(), ClientError> {
    if value.contains(['"', '\r', '\n']) {
        return Err(ClientError::Encoding(format!(
            "{what} {value:?} contains a quote or line break"
        )));
    }
    Ok(())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
#[path = "multipart_test.rs"]
mod tests;
