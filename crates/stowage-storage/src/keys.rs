//! Object key derivation shared by all uploader backends.
//!
//! A key pattern is plain text with `$placeholder` tokens. Every recognized
//! token is replaced (all occurrences, literally, in the order listed in
//! [`PLACEHOLDERS`]) with the lower-cased value taken from the request; spaces
//! in the result become hyphens. Unknown tokens are left as they are.

use std::borrow::Cow;

use stowage_core::UploadRequest;

/// Placeholders recognized in key patterns, in substitution order.
pub const PLACEHOLDERS: [&str; 8] = [
    "$fileName",
    "$fileExtension",
    "$browserName",
    "$browserVersion",
    "$platformName",
    "$quota",
    "$sessionId",
    "$fileType",
];

/// Resolve the object key for `request` from `pattern`.
///
/// Pure and deterministic: the result depends only on the pattern and the
/// request. An empty value leaves an empty segment; an empty pattern yields an
/// empty key.
pub fn resolve_key(pattern: &str, request: &UploadRequest) -> String {
    let file_name = file_name(request);
    let session = &request.session;

    let values: [(&str, &str); 8] = [
        ("$fileName", &file_name),
        ("$fileExtension", file_extension(&file_name)),
        ("$browserName", &session.caps.name),
        ("$browserVersion", &session.caps.version),
        ("$platformName", &session.caps.platform),
        ("$quota", &session.quota),
        ("$sessionId", &request.session_id),
        ("$fileType", &request.artifact_type),
    ];

    let key = values
        .iter()
        .fold(pattern.to_string(), |key, (token, value)| {
            key.replace(token, &value.to_lowercase())
        });

    key.replace(' ', "-")
}

/// List `$tokens` in `pattern` that no placeholder will substitute.
///
/// A token counts as recognized when it starts with a placeholder, since the
/// placeholder prefix gets replaced and the remainder is kept literally.
/// Each unrecognized token is reported once, in order of appearance.
pub fn unrecognized_tokens(pattern: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find('$') {
        let after = &rest[pos + 1..];
        let ident_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let token = &rest[pos..pos + 1 + ident_len];
        rest = &after[ident_len..];

        if ident_len == 0 || PLACEHOLDERS.iter().any(|p| token.starts_with(p)) {
            continue;
        }
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }

    tokens
}

/// Base name of the artifact; invalid UTF-8 is replaced rather than dropped.
fn file_name(request: &UploadRequest) -> Cow<'_, str> {
    request
        .filename
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default()
}

/// Extension including the leading dot, taken from the last `.` of the name.
fn file_extension(file_name: &str) -> &str {
    file_name
        .rfind('.')
        .map(|pos| &file_name[pos..])
        .unwrap_or_default()
}
