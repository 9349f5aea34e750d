use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `payload` under `secret`.
pub fn hmac_hex(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// The media service's public id for a stored file: the path segment between
/// the last `/` and the last `.` of the reference URL.
pub fn public_id(file_url: &str) -> &str {
    let start = file_url.rfind('/').map(|i| i + 1).unwrap_or(0);
    let end = file_url.rfind('.').filter(|&i| i >= start).unwrap_or(file_url.len());
    &file_url[start..end]
}

/// Derive a time-scoped signed download reference for a stored file URL.
///
/// The signature covers the file's public id and the current timestamp; the
/// secret itself never appears in the result.
pub fn signed_download_url(file_url: &str, secret: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let payload = format!("public_id={}&timestamp={}", public_id(file_url), timestamp);
    let signature = hmac_hex(secret, &payload);

    format!("{}?_a={}", file_url, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_extraction() {
        assert_eq!(public_id("https://media.example/notes/abc123.png"), "abc123");
        assert_eq!(public_id("memory://notes/7.pdf"), "7");
        assert_eq!(public_id("no-slashes"), "no-slashes");
    }

    #[test]
    fn test_hmac_is_deterministic() {
        let a = hmac_hex("secret", "public_id=x&timestamp=1");
        let b = hmac_hex("secret", "public_id=x&timestamp=1");
        assert_eq!(a, b);
        assert_ne!(a, hmac_hex("other-secret", "public_id=x&timestamp=1"));
    }

    #[test]
    fn test_signed_url_shape() {
        let url = "https://media.example/notes/abc123.png";
        let signed = signed_download_url(url, "top-secret");
        assert!(signed.starts_with("https://media.example/notes/abc123.png?_a="));
        // The signature is hex, and the secret never leaks into the URL
        let sig = signed.rsplit("?_a=").next().unwrap();
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!signed.contains("top-secret"));
    }
}
