//! Form body parsing
//!
//! Handles `application/x-www-form-urlencoded` and `multipart/form-data`.
//! Any other content type yields an empty form, so required fields surface
//! as validation errors rather than parse failures.

use hyper::body::Bytes;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("multipart content type has no boundary")]
    MissingBoundary,
    #[error("multipart body does not start with the boundary")]
    MissingOpeningBoundary,
    #[error("multipart body ended before the closing boundary")]
    UnexpectedEnd,
    #[error("multipart part has no header terminator")]
    MalformedPart,
    #[error("multipart part has no form-data name")]
    MissingFieldName,
    #[error("form field `{0}` is not valid UTF-8")]
    InvalidUtf8(String),
}

/// A file part of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    /// Size in kilobytes (1024 bytes), rounded to two decimal places
    #[allow(clippy::cast_precision_loss)]
    pub fn size_kb(&self) -> f64 {
        (self.data.len() as f64 / 1024.0 * 100.0).round() / 100.0
    }
}

/// Decoded form fields and uploaded files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadedFile>,
}

impl FormData {
    pub fn parse(content_type: Option<&str>, body: &Bytes) -> Result<Self, FormError> {
        let Some(content_type) = content_type else {
            return Ok(Self::default());
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "application/x-www-form-urlencoded" => Ok(Self {
                fields: url::form_urlencoded::parse(body)
                    .into_owned()
                    .collect(),
                files: Vec::new(),
            }),
            "multipart/form-data" => {
                let boundary = header_param(content_type, "boundary")
                    .filter(|b| !b.is_empty())
                    .ok_or(FormError::MissingBoundary)?;
                parse_multipart(body, &boundary)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }
}

/// Value of a `key=value` parameter in a header such as
/// `Content-Disposition` or `Content-Type`
fn header_param(header: &str, key: &str) -> Option<String> {
    header.split(';').skip(1).find_map(|param| {
        let (k, v) = param.split_once('=')?;
        if k.trim().eq_ignore_ascii_case(key) {
            Some(v.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}

fn parse_multipart(body: &Bytes, boundary: &str) -> Result<FormData, FormError> {
    let delimiter = format!("--{boundary}");
    let next_delimiter = format!("\r\n--{boundary}");

    let first = find(body, delimiter.as_bytes(), 0).ok_or(FormError::MissingOpeningBoundary)?;
    let mut cursor = first + delimiter.len();
    let mut form = FormData::default();

    loop {
        match body.get(cursor..cursor + 2) {
            Some(b"--") => return Ok(form),
            Some(b"\r\n") => cursor += 2,
            _ => return Err(FormError::UnexpectedEnd),
        }

        let end = find(body, next_delimiter.as_bytes(), cursor).ok_or(FormError::UnexpectedEnd)?;
        parse_part(body.slice(cursor..end), &mut form)?;
        cursor = end + next_delimiter.len();
    }
}

fn parse_part(part: Bytes, form: &mut FormData) -> Result<(), FormError> {
    let split = find(&part, b"\r\n\r\n", 0).ok_or(FormError::MalformedPart)?;
    let head = std::str::from_utf8(&part[..split]).map_err(|_| FormError::MalformedPart)?;
    let content = part.slice(split + 4..);

    let mut disposition = None;
    let mut content_type = None;
    for line in head.split("\r\n") {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-disposition") {
            disposition = Some(value.trim());
        } else if name.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_string());
        }
    }

    let disposition = disposition.ok_or(FormError::MissingFieldName)?;
    let field = header_param(disposition, "name").ok_or(FormError::MissingFieldName)?;

    match header_param(disposition, "filename") {
        Some(filename) => form.files.push(UploadedFile {
            field,
            filename,
            content_type,
            data: content,
        }),
        None => {
            let value = String::from_utf8(content.to_vec())
                .map_err(|_| FormError::InvalidUtf8(field.clone()))?;
            form.fields.push((field, value));
        }
    }
    Ok(())
}

#[cfg(test)]
pub fn multipart_body(boundary: &str, parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Bytes {
    let mut body = Vec::new();
    for (name, file, content) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match file {
            Some((filename, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    Bytes::from(body)
}
