//! Payload decoders.
//!
//! Pure, stateless transforms of the raw request: the Cookie header
//! becomes a name→value map, JSON and urlencoded bodies become
//! structured values. Decode failures stop the pipeline with a 400
//! before any session work happens. The raw bytes are restored onto the
//! request so downstream extractors can still consume them.

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::{HeaderMap, CONTENT_TYPE, COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::error::AdmissionError;
use crate::http::server::AppState;

/// Parsed Cookie header, attached to every admitted request.
#[derive(Debug, Clone, Default)]
pub struct CookieJar(HashMap<String, String>);

impl CookieJar {
    /// Parse all Cookie headers. Pairs are trimmed; the first occurrence
    /// of a name wins.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut map = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            for pair in raw.split(';') {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                map.entry(name.to_string())
                    .or_insert_with(|| value.trim().to_string());
            }
        }
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Structured request body, attached when the Content-Type is one the
/// decoders understand.
#[derive(Debug, Clone)]
pub enum DecodedBody {
    Json(Value),
    Form(Value),
}

impl DecodedBody {
    pub fn value(&self) -> &Value {
        match self {
            Self::Json(v) | Self::Form(v) => v,
        }
    }
}

enum BodyKind {
    Json,
    Form,
}

/// Pipeline stage: decode cookies and, when present, the request body.
pub async fn decode(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();
    parts.extensions.insert(CookieJar::from_headers(&parts.headers));

    let req = match body_kind(&parts.headers) {
        Some(kind) => {
            let limit = state.config.security.max_body_size;
            let bytes = match axum::body::to_bytes(body, limit).await {
                Ok(bytes) => bytes,
                Err(_) => return AdmissionError::PayloadTooLarge.into_response(),
            };

            let decoded = match kind {
                BodyKind::Json => decode_json(&bytes),
                BodyKind::Form => decode_form(&bytes),
            };
            match decoded {
                Ok(value) => {
                    parts.extensions.insert(value);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "request payload rejected");
                    return e.into_response();
                }
            }
            Request::from_parts(parts, Body::from(bytes))
        }
        None => Request::from_parts(parts, body),
    };

    next.run(req).await
}

fn body_kind(headers: &HeaderMap) -> Option<BodyKind> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();
    if mime.eq_ignore_ascii_case("application/json") {
        Some(BodyKind::Json)
    } else if mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
        Some(BodyKind::Form)
    } else {
        None
    }
}

fn decode_json(bytes: &[u8]) -> Result<DecodedBody, AdmissionError> {
    serde_json::from_slice(bytes)
        .map(DecodedBody::Json)
        .map_err(|e| AdmissionError::MalformedPayload(format!("invalid JSON: {e}")))
}

fn decode_form(bytes: &[u8]) -> Result<DecodedBody, AdmissionError> {
    let raw = std::str::from_utf8(bytes)
        .map_err(|_| AdmissionError::MalformedPayload("body is not valid UTF-8".to_string()))?;
    parse_form(raw).map(DecodedBody::Form)
}

/// Parse an urlencoded body into a nested structure: bracketed keys
/// (`user[address][city]=x`) fold into nested objects, a trailing `[]`
/// appends to an array. Later scalar assignments overwrite earlier ones.
fn parse_form(raw: &str) -> Result<Value, AdmissionError> {
    let mut root = Map::new();
    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key)?;
        let value = decode_component(value)?;
        let (base, path) = parse_key_path(&key)?;
        insert_value(&mut root, &base, &path, Value::String(value))?;
    }
    Ok(Value::Object(root))
}

fn decode_component(raw: &str) -> Result<String, AdmissionError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|_| AdmissionError::MalformedPayload(format!("invalid percent-encoding in '{raw}'")))
}

enum Segment {
    Key(String),
    Append,
}

fn parse_key_path(key: &str) -> Result<(String, Vec<Segment>), AdmissionError> {
    let Some(open) = key.find('[') else {
        return Ok((key.to_string(), Vec::new()));
    };

    let base = &key[..open];
    if base.is_empty() {
        return Err(AdmissionError::MalformedPayload(format!(
            "key '{key}' has no name before its brackets"
        )));
    }

    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let inner = rest
            .strip_prefix('[')
            .and_then(|r| r.split_once(']'))
            .ok_or_else(|| {
                AdmissionError::MalformedPayload(format!("unbalanced brackets in key '{key}'"))
            })?;
        let (segment, tail) = inner;
        if segment.is_empty() {
            segments.push(Segment::Append);
        } else {
            segments.push(Segment::Key(segment.to_string()));
        }
        rest = tail;
    }
    Ok((base.to_string(), segments))
}

fn insert_value(
    target: &mut Map<String, Value>,
    base: &str,
    path: &[Segment],
    value: Value,
) -> Result<(), AdmissionError> {
    match path.first() {
        None => {
            target.insert(base.to_string(), value);
            Ok(())
        }
        Some(Segment::Append) => {
            if path.len() > 1 {
                return Err(AdmissionError::MalformedPayload(format!(
                    "array segment in '{base}' must be the last one"
                )));
            }
            let slot = target
                .entry(base.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            match slot {
                Value::Array(items) => items.push(value),
                other => *other = Value::Array(vec![value]),
            }
            Ok(())
        }
        Some(Segment::Key(key)) => {
            let slot = target
                .entry(base.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(nested) = slot else {
                return Ok(());
            };
            insert_value(nested, key, &path[1..], value)
        }
    }
}
