//! Open-redirect protection for post-sign-in destinations
//!
//! Only same-site paths are ever remembered: a stored destination is handed
//! to client-side navigation after sign-in, so anything that could leave the
//! site (schemes, protocol-relative URLs, backslashes) is rejected, as are
//! traversal sequences hidden behind one or two rounds of percent-encoding.

use actix_web::HttpResponse;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::responses::ResponseBuilder;

const MAX_REDIRECT_LENGTH: usize = 2048;

static PATH_TRAVERSAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.").expect("valid traversal pattern"));

// Scheme prefix or a run of slashes that would make a protocol-relative URL
static PROTOCOL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[a-z][a-z0-9+.-]*:)|(?:/{2,})").expect("valid protocol pattern")
});

// Control characters, encoded line breaks/nulls, backslashes and invisible spacing
static SUSPICIOUS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[\x00-\x1F\x7F-\x9F]|%(?:00|0[ad]|09|5c)|\\|[\u{200E}\u{200F}\u{2060}-\u{2064}\u{2000}-\u{200A}]",
    )
    .expect("valid suspicious pattern")
});

const DANGEROUS_PROTOCOLS: &[&str] = &["javascript:", "vbscript:", "data:", "file:", "ftp:"];

/// Validate a destination to restore after sign-in
///
/// # Errors
///
/// Returns a 400 `invalid_redirect` response for anything but a clean,
/// site-relative path
pub fn validate_post_auth_redirect(redirect: &str) -> Result<String, HttpResponse> {
    debug!("Validating post-authentication redirect: {redirect}");

    if redirect.len() > MAX_REDIRECT_LENGTH {
        warn!(
            "Excessively long redirect rejected: {} characters",
            redirect.len()
        );
        return Err(ResponseBuilder::invalid_redirect());
    }

    if !is_relative_path(redirect) {
        warn!("Non-relative redirect rejected: {redirect}");
        return Err(ResponseBuilder::invalid_redirect());
    }

    for variant in decoded_variants(redirect) {
        if let Some(reason) = attack_pattern(&variant) {
            warn!("Redirect rejected ({reason}): {redirect}");
            return Err(ResponseBuilder::invalid_redirect());
        }
    }

    Ok(redirect.to_string())
}

/// Starts with a single `/` and carries no scheme
fn is_relative_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains(':')
}

fn attack_pattern(candidate: &str) -> Option<&'static str> {
    if PATH_TRAVERSAL_PATTERN.is_match(candidate) {
        return Some("path traversal");
    }
    if PROTOCOL_PATTERN.is_match(candidate) {
        return Some("protocol injection");
    }
    if SUSPICIOUS_PATTERN.is_match(candidate) {
        return Some("suspicious characters");
    }

    let lower = candidate.to_lowercase();
    if DANGEROUS_PROTOCOLS.iter().any(|p| lower.contains(p)) {
        return Some("dangerous protocol");
    }
    if candidate.contains('@') && candidate.matches('@').count() > 1 {
        return Some("domain confusion");
    }

    None
}

/// The raw value plus up to two rounds of percent-decoding
fn decoded_variants(path: &str) -> Vec<String> {
    let mut variants = vec![path.to_string()];

    if let Ok(decoded) = urlencoding::decode(path) {
        let decoded = decoded.into_owned();
        if decoded != path {
            if let Ok(twice) = urlencoding::decode(&decoded) {
                let twice = twice.into_owned();
                if twice != decoded {
                    variants.push(twice);
                }
            }
            variants.push(decoded);
        }
    }

    variants
}

#[cfg(test)]
mod tests {
    use super::validate_post_auth_redirect;

    #[test]
    fn test_site_paths_allowed() {
        for redirect in [
            "/",
            "/books",
            "/profile",
            "/episodes/7?t=120",
            "/shop/cart?item=journal&qty=2",
            "/blog/daring-different#comments",
        ] {
            assert_eq!(
                validate_post_auth_redirect(redirect).ok().as_deref(),
                Some(redirect),
                "should be allowed: {redirect}"
            );
        }
    }

    #[test]
    fn test_external_and_protocol_redirects_blocked() {
        for redirect in [
            "https://evil.com",
            "//evil.com",
            "///evil.com",
            "/\\evil.com",
            "javascript:alert(1)",
            "JAVASCRIPT:alert(1)",
            "data:text/html,<script>alert(1)</script>",
            "/%2F%2Fevil.com",
            "/redirect?to=javascript%3Aalert(1)",
            "books",
            "",
        ] {
            let result = validate_post_auth_redirect(redirect);
            assert!(result.is_err(), "should be blocked: {redirect}");
            assert_eq!(result.unwrap_err().status(), 400);
        }
    }

    #[test]
    fn test_traversal_blocked_through_encoding() {
        for redirect in [
            "/../etc/passwd",
            "/books/../../admin",
            "/%2e%2e/admin",
            "/%252e%252e/admin",
            "/books%00.html",
            "/books%0d%0aSet-Cookie:x",
        ] {
            assert!(
                validate_post_auth_redirect(redirect).is_err(),
                "should be blocked: {redirect}"
            );
        }
    }

    #[test]
    fn test_long_and_confusing_redirects_blocked() {
        let long = format!("/{}", "a".repeat(2100));
        assert!(validate_post_auth_redirect(&long).is_err());
        assert!(validate_post_auth_redirect("/a@b@evil.com").is_err());
        assert!(validate_post_auth_redirect("/books\u{200E}").is_err());
    }
}
