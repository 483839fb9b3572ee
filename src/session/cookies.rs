use axum::http::{header, HeaderMap, HeaderValue};
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};

use crate::config::SessionConfig;

/// `Set-Cookie` value issuing the session artifact.
pub fn session_cookie(value: &str, config: &SessionConfig) -> Option<HeaderValue> {
    let cookie = Cookie::build((config.cookie_name.clone(), value.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::days(config.max_age_days))
        .build();

    HeaderValue::from_str(&cookie.encoded().to_string()).ok()
}

/// `Set-Cookie` value that expires the session artifact immediately.
pub fn removal_cookie(config: &SessionConfig) -> HeaderValue {
    let cookie = Cookie::build((config.cookie_name.clone(), String::new()))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::ZERO)
        .build();

    // Name comes from config and the value is empty, so this always encodes cleanly
    HeaderValue::from_str(&cookie.encoded().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("admin_key=; Path=/; Max-Age=0"))
}

/// First cookie named `name` across every `Cookie` header, percent-decoded.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse_encoded(raw.to_string()))
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secure: bool) -> SessionConfig {
        SessionConfig {
            cookie_name: "admin_key".to_string(),
            max_age_days: 30,
            secure,
        }
    }

    #[test]
    fn session_cookie_attributes() {
        let value = session_cookie("abc123", &config(true)).unwrap();
        let s = value.to_str().unwrap();
        assert!(s.starts_with("admin_key=abc123"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("SameSite=Lax"));
        assert!(s.contains("Path=/"));
        assert!(s.contains("Secure"));
        assert!(s.contains("Max-Age=2592000"));
    }

    #[test]
    fn session_cookie_not_secure_in_development() {
        let value = session_cookie("abc123", &config(false)).unwrap();
        assert!(!value.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn removal_cookie_expires_now() {
        let value = removal_cookie(&config(false));
        let s = value.to_str().unwrap();
        assert!(s.starts_with("admin_key=;"));
        assert!(s.contains("Max-Age=0"));
    }

    #[test]
    fn find_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; admin_key=abc123"));
        assert_eq!(find_cookie(&headers, "admin_key").as_deref(), Some("abc123"));
        assert_eq!(find_cookie(&headers, "missing"), None);
    }

    #[test]
    fn find_cookie_across_split_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("admin_key=k%20ey"));
        assert_eq!(find_cookie(&headers, "admin_key").as_deref(), Some("k ey"));
    }

    #[test]
    fn encoded_value_round_trips() {
        let set = session_cookie("a;b c", &config(false)).unwrap();
        let pair = set.to_str().unwrap().split(';').next().unwrap().to_string();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&pair).unwrap());
        assert_eq!(find_cookie(&headers, "admin_key").as_deref(), Some("a;b c"));
    }
}
