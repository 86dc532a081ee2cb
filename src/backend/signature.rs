//! Request signing for the SLS REST API (signature method `hmac-sha1`).

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;

use super::BackendError;

type HmacSha1 = Hmac<Sha1>;

/// Upper-case hex MD5 of `body`, as sent in `Content-MD5`.
pub(super) fn content_md5(body: &[u8]) -> String {
    Md5::digest(body)
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect()
}

/// RFC 1123 date in GMT, as sent in `Date`.
pub(super) fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Canonical string covered by the signature.
///
/// Only `x-log-` and `x-acs-` headers take part; they are lower-cased,
/// sorted by name and rendered as `name:value` lines.
pub(super) fn string_to_sign(
    method: &str,
    content_md5: &str,
    content_type: &str,
    date: &str,
    headers: &[(&str, String)],
    resource: &str,
) -> String {
    let mut canonical: Vec<(String, &str)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.as_str()))
        .filter(|(name, _)| name.starts_with("x-log-") || name.starts_with("x-acs-"))
        .collect();
    canonical.sort();
    let canonical_headers = canonical
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{method}\n{content_md5}\n{content_type}\n{date}\n{canonical_headers}\n{resource}")
}

/// Base64 HMAC-SHA1 of `string_to_sign` keyed by the access key secret.
pub(super) fn sign(secret: &str, string_to_sign: &str) -> Result<String, BackendError> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|err| BackendError::Signing(err.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}
