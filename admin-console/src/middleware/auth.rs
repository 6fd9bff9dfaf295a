use crate::services::{endpoints, ApiRequest, Backend};
use http::{header, HeaderValue};
use secrecy::{ExposeSecret, Secret};

/// Login, registration and password reset: a 401 there means bad credentials.
pub fn is_credential_endpoint(request: &ApiRequest) -> bool {
    request.backend == Backend::Central
        && endpoints::CREDENTIAL_ENDPOINTS.contains(&request.path.as_str())
}

/// Decorate an outgoing request with the bearer token.
///
/// Credential endpoints are left bare. Multipart requests lose any explicit
/// `Content-Type` so the transport can write the boundary itself.
pub fn attach_credentials(request: &mut ApiRequest, access_token: Option<&Secret<String>>) {
    if request.body.is_multipart() {
        request.headers.remove(header::CONTENT_TYPE);
    }

    if is_credential_endpoint(request) {
        request.headers.remove(header::AUTHORIZATION);
        return;
    }

    let Some(token) = access_token else {
        return;
    };

    match HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers.insert(header::AUTHORIZATION, value);
        }
        Err(_) => {
            tracing::warn!("Access token is not a valid header value, sending without it");
            request.headers.remove(header::AUTHORIZATION);
        }
    }
}
