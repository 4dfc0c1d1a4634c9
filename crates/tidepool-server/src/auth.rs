use axum::http::HeaderMap;
use tidepool_core::auth::Authorization;
use uuid::Uuid;

/// Fold the identity headers set by the upstream identity provider into the
/// per-request authorization context. Requests without (or with unreadable)
/// identity headers are anonymous.
pub fn from_headers(headers: &HeaderMap) -> Authorization {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok());

    let domain_owner = headers
        .get("x-domain-owner")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "true")
        .unwrap_or(false);

    Authorization {
        user_id,
        domain_owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_headers_mean_anonymous() {
        let auth = from_headers(&HeaderMap::new());
        assert_eq!(auth, Authorization::anonymous());
    }

    #[test]
    fn user_and_owner_headers() {
        let user_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-user-id",
            HeaderValue::from_str(&user_id.to_string()).unwrap(),
        );
        headers.insert("x-domain-owner", HeaderValue::from_static("true"));

        let auth = from_headers(&headers);
        assert_eq!(auth.user_id, Some(user_id));
        assert!(auth.domain_owner);
    }

    #[test]
    fn malformed_user_id_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("not-a-uuid"));
        let auth = from_headers(&headers);
        assert!(auth.user_id.is_none());
    }
}
