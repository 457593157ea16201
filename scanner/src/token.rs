//! Token resolution for scanned QR payloads.

use url::Url;

/// Extracts the session token from a scanned payload.
///
/// A payload that parses as an absolute URL with a `token` query parameter
/// yields that parameter's value; anything else (a raw token, a URL without
/// the parameter, a malformed URL) is returned unchanged. Never fails;
/// shape validation belongs to the check-in processor.
pub fn resolve(scanned_payload: &str) -> String {
    if let Ok(parsed) = Url::parse(scanned_payload) {
        if let Some((_, value)) = parsed.query_pairs().find(|(key, _)| key == "token") {
            return value.into_owned();
        }
    }
    scanned_payload.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_from_url() {
        assert_eq!(
            resolve("https://campus.example/attendance/scan?token=abc123"),
            "abc123"
        );
    }

    #[test]
    fn extracts_token_among_other_query_params() {
        assert_eq!(
            resolve("https://x/y?foo=1&token=t0k3n&bar=2"),
            "t0k3n"
        );
    }

    #[test]
    fn raw_token_passes_through_unchanged() {
        assert_eq!(resolve("abc123"), "abc123");
    }

    #[test]
    fn url_without_token_param_passes_through_unchanged() {
        let payload = "https://campus.example/attendance/scan?session=9";
        assert_eq!(resolve(payload), payload);
    }

    #[test]
    fn malformed_url_falls_through_to_raw_branch() {
        assert_eq!(resolve("http://"), "http://");
        assert_eq!(resolve("not a url at all"), "not a url at all");
    }

    #[test]
    fn manual_entry_equals_scanned_url() {
        assert_eq!(
            resolve("abc123"),
            resolve("https://x/y?token=abc123")
        );
    }
}
