//! Named key endpoints.
//!
//! Encrypt seals the request body byte for byte, whatever its
//! `Content-Type`. Decrypt reads a raw ciphertext blob when the request is
//! `Content-Type: application/octet-stream` and base64 text otherwise. For
//! both, `Accept: application/octet-stream` selects a raw response and
//! anything else a text one (base64 ciphertext, UTF-8 plaintext).

use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use keyseal_core::{KeyCoordinator, KeySealResult};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const OCTET_STREAM: &str = "application/octet-stream";

// ============================================================================
// Extractors and helpers
// ============================================================================

/// The `{keyname}` path segment, checked against the minimum length.
#[derive(Debug)]
pub struct KeyName(pub String);

impl FromRequestParts<AppState> for KeyName {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let Path(name) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if name.len() < state.min_key_name_len {
            return Err(ApiError::KeyNameTooShort {
                min: state.min_key_name_len,
                actual: name.len(),
            });
        }
        Ok(KeyName(name))
    }
}

/// True when any media range in the header is `application/octet-stream`.
fn names_octet_stream(value: Option<&HeaderValue>) -> bool {
    value
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            v.split(',').any(|range| {
                range
                    .split(';')
                    .next()
                    .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(OCTET_STREAM))
            })
        })
}

/// Decrypt request body after Content-Type negotiation.
enum Ciphertext {
    Raw(Bytes),
    Base64(String),
}

impl Ciphertext {
    fn from_request(headers: &HeaderMap, body: Bytes) -> ApiResult<Self> {
        if names_octet_stream(headers.get(CONTENT_TYPE)) {
            return Ok(Ciphertext::Raw(body));
        }
        String::from_utf8(body.to_vec())
            .map(Ciphertext::Base64)
            .map_err(|e| ApiError::UnreadableBody(format!("base64 body is not UTF-8: {e}")))
    }

    fn len(&self) -> usize {
        match self {
            Ciphertext::Raw(b) => b.len(),
            Ciphertext::Base64(s) => s.len(),
        }
    }
}

/// Response body after Accept negotiation.
pub enum Output {
    Binary(Vec<u8>),
    Text(String),
}

impl IntoResponse for Output {
    fn into_response(self) -> Response {
        match self {
            Output::Binary(bytes) => {
                ([(CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM))], bytes).into_response()
            }
            Output::Text(text) => text.into_response(),
        }
    }
}

/// Runs a coordinator call on the blocking pool; storage and cipher work
/// is synchronous.
async fn run_blocking<T, F>(state: &AppState, message: &'static str, f: F) -> ApiResult<T>
where
    F: FnOnce(&KeyCoordinator) -> KeySealResult<T> + Send + 'static,
    T: Send + 'static,
{
    let coordinator = Arc::clone(&state.coordinator);
    tokio::task::spawn_blocking(move || f(&coordinator))
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
        .map_err(|e| ApiError::keyseal(message, e))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST {prefix}/geds/{keyname}
pub async fn create_key(
    State(state): State<AppState>,
    KeyName(name): KeyName,
) -> ApiResult<StatusCode> {
    run_blocking(&state, "Unable to create key", move |c| {
        c.generate_new_key(&name)
    })
    .await?;
    Ok(StatusCode::CREATED)
}

/// HEAD {prefix}/geds/{keyname}
pub async fn key_exists(
    State(state): State<AppState>,
    KeyName(name): KeyName,
) -> ApiResult<StatusCode> {
    let exists = run_blocking(&state, "Unable to check key", move |c| c.exists(&name)).await?;
    Ok(if exists {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    })
}

/// POST {prefix}/geds/{keyname}/encrypt
pub async fn encrypt(
    State(state): State<AppState>,
    KeyName(name): KeyName,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Output> {
    let binary_out = names_octet_stream(headers.get(ACCEPT));
    debug!(
        "encrypt request for key {name}: {} bytes, binary response {binary_out}",
        body.len()
    );

    run_blocking(&state, "Unable to encrypt data", move |c| {
        Ok(if binary_out {
            Output::Binary(c.encrypt(&name, &body)?)
        } else {
            Output::Text(c.encrypt_to_base64(&name, &body)?)
        })
    })
    .await
}

/// POST {prefix}/geds/{keyname}/decrypt
pub async fn decrypt(
    State(state): State<AppState>,
    KeyName(name): KeyName,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Output> {
    let input = Ciphertext::from_request(&headers, body)?;
    let binary_out = names_octet_stream(headers.get(ACCEPT));
    debug!(
        "decrypt request for key {name}: {} bytes, binary response {binary_out}",
        input.len()
    );

    run_blocking(&state, "Unable to decrypt data", move |c| {
        Ok(match (input, binary_out) {
            (Ciphertext::Raw(blob), true) => Output::Binary(c.decrypt(&name, &blob)?),
            (Ciphertext::Raw(blob), false) => Output::Text(c.decrypt_to_string(&name, &blob)?),
            (Ciphertext::Base64(encoded), true) => {
                Output::Binary(c.decrypt_base64(&name, encoded.trim())?)
            }
            (Ciphertext::Base64(encoded), false) => {
                Output::Text(c.decrypt_base64_to_string(&name, encoded.trim())?)
            }
        })
    })
    .await
}
