//! Body encoding and Content-Type inference.

use crate::descriptor::RequestBody;
use crate::transport::EncodedBody;
use serde_json::Value;

/// Encode the declared payload and infer its Content-Type.
///
/// The inferred type only fills an absent Content-Type header, while
/// `media_type` (the descriptor-level override) wins over inference and
/// over resolved headers alike. A `None` body never produces a
/// Content-Type. Multipart bodies report no type either; the transport
/// owns the boundary-bearing value.
pub fn encode_body(body: &RequestBody, media_type: Option<&str>) -> (EncodedBody, Option<String>) {
    let (encoded, inferred) = match body {
        RequestBody::None => (EncodedBody::None, None),
        RequestBody::Json(value) => (
            EncodedBody::Json(strip_nulls(value.clone())),
            Some("application/json".to_string()),
        ),
        RequestBody::Binary { data, content_type } => (
            EncodedBody::Bytes(data.clone()),
            Some(
                content_type
                    .clone()
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
            ),
        ),
        RequestBody::Multipart(fields) => (EncodedBody::Form(fields.clone()), None),
    };
    if encoded.is_none() {
        return (encoded, None);
    }
    match media_type {
        Some(explicit) => (encoded, Some(explicit.to_string())),
        None => (encoded, inferred),
    }
}

/// Drop null object members, recursively. Generated option structs map
/// absent fields to `Null`; those must not serialize as JSON `null`.
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FormField;
    use serde_json::json;

    #[test]
    fn no_body_infers_no_content_type() {
        let (encoded, content_type) = encode_body(&RequestBody::None, None);
        assert!(encoded.is_none());
        assert_eq!(content_type, None);
        // An override cannot attach a Content-Type to a bodyless request.
        let (_, content_type) = encode_body(&RequestBody::None, Some("application/json"));
        assert_eq!(content_type, None);
    }

    #[test]
    fn json_body_infers_application_json() {
        let (encoded, content_type) = encode_body(&RequestBody::Json(json!({"a": 1})), None);
        assert!(matches!(encoded, EncodedBody::Json(_)));
        assert_eq!(content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn media_type_override_wins() {
        let (_, content_type) = encode_body(
            &RequestBody::Json(json!({})),
            Some("application/vnd.api+json"),
        );
        assert_eq!(content_type.as_deref(), Some("application/vnd.api+json"));
    }

    #[test]
    fn binary_body_uses_declared_or_octet_stream() {
        let body = RequestBody::Binary {
            data: bytes::Bytes::from_static(b"\x89PNG"),
            content_type: Some("image/png".into()),
        };
        let (_, content_type) = encode_body(&body, None);
        assert_eq!(content_type.as_deref(), Some("image/png"));

        let body = RequestBody::Binary {
            data: bytes::Bytes::from_static(b"raw"),
            content_type: None,
        };
        let (_, content_type) = encode_body(&body, None);
        assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn multipart_leaves_content_type_to_the_transport() {
        let body = RequestBody::Multipart(vec![FormField::text("note", "hi")]);
        let (encoded, content_type) = encode_body(&body, None);
        assert!(matches!(encoded, EncodedBody::Form(_)));
        assert_eq!(content_type, None);
    }

    #[test]
    fn null_members_are_dropped_recursively() {
        let (encoded, _) = encode_body(
            &RequestBody::Json(json!({"a": 1, "b": null, "c": {"d": null, "e": 2}})),
            None,
        );
        let EncodedBody::Json(value) = encoded else {
            panic!("expected JSON body");
        };
        assert_eq!(value, json!({"a": 1, "c": {"e": 2}}));
    }
}
