use axum::http;
use headers::{Header, HeaderName, HeaderValue};

/// `Content-Disposition: attachment; filename="..."`.
///
/// The quoted `filename` keeps the name verbatim apart from quoted-string
/// escaping. Non-ASCII names additionally get an RFC 5987 `filename*`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AttachmentFilename(pub String);

impl AttachmentFilename {
    fn quoted(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        out.push('"');
        for c in self.0.chars() {
            match c {
                '"' | '\\' => {
                    out.push('\\');
                    out.push(c);
                }
                c if c.is_control() => out.push('_'),
                c => out.push(c),
            }
        }
        out.push('"');
        out
    }
}

impl Header for AttachmentFilename {
    fn name() -> &'static HeaderName {
        &http::header::CONTENT_DISPOSITION
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let value = std::str::from_utf8(value.as_bytes()).map_err(|_| headers::Error::invalid())?;

        let mut params = split_params(value).into_iter();
        let disposition = params.next().ok_or_else(headers::Error::invalid)?;
        if !disposition.trim().eq_ignore_ascii_case("attachment") {
            return Err(headers::Error::invalid());
        }

        let mut plain = None;
        let mut extended = None;
        for param in params {
            let Some((key, raw)) = param.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let raw = raw.trim();
            if key.eq_ignore_ascii_case("filename*") {
                extended = raw
                    .strip_prefix("UTF-8''")
                    .or_else(|| raw.strip_prefix("utf-8''"))
                    .and_then(|encoded| urlencoding::decode(encoded).ok())
                    .map(|decoded| decoded.into_owned());
            } else if key.eq_ignore_ascii_case("filename") {
                plain = Some(unquote(raw));
            }
        }

        extended
            .or(plain)
            .map(AttachmentFilename)
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E>(&self, values: &mut E)
    where
        E: Extend<HeaderValue>,
    {
        let mut value = format!("attachment; filename={}", self.quoted());
        if !self.0.is_ascii() {
            value.push_str("; filename*=UTF-8''");
            value.push_str(&urlencoding::encode(&self.0));
        }

        // Raw UTF-8 is legal obs-text in a header value.
        if let Ok(value) = HeaderValue::from_bytes(value.as_bytes()) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Splits on `;` outside quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
