//! Operation descriptor
//!
//! The immutable, declarative description of one API operation, produced at
//! generation time from the parsed API schema. Generated service functions
//! build one per call and hand it to [`execute`](crate::execute::execute).

use crate::classify::StatusRule;
use crate::config::HeaderSource;
use crate::error::Result;
use crate::response::ResponseBody;
use bytes::Bytes;
use reqwest::Method;
use std::sync::Arc;

/// Serialization style for array-valued query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayStyle {
    /// `tags=x&tags=y`
    #[default]
    Repeat,
    /// `tags=x,y`
    Comma,
    /// `tags=x|y`
    Pipe,
}

/// Serialization style for object-valued query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectStyle {
    /// One bracket level: `filter[name]=a&filter[age]=3`
    #[default]
    Bracket,
    /// Recursive deep-object style: `filter[owner][name]=a`
    Deep,
}

/// Shape of the value the task resolves with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Resolve with the extracted body only.
    #[default]
    Body,
    /// Resolve with the full [`ApiResult`](crate::response::ApiResult).
    Full,
}

/// One multipart form field, appended in declaration order.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    Blob {
        data: Bytes,
        filename: String,
        content_type: Option<String>,
    },
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn blob(
        name: impl Into<String>,
        data: impl Into<Bytes>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Blob {
                data: data.into(),
                filename: filename.into(),
                content_type: None,
            },
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        if let FormValue::Blob {
            content_type: ct, ..
        } = &mut self.value
        {
            *ct = Some(content_type.into());
        }
        self
    }
}

/// Request payload declared by the operation.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body is attached and no Content-Type is inferred.
    #[default]
    None,
    /// JSON-serializable payload.
    Json(serde_json::Value),
    /// Raw binary payload.
    Binary {
        data: Bytes,
        content_type: Option<String>,
    },
    /// Multipart form fields.
    Multipart(Vec<FormField>),
}

/// Transform applied to the extracted body of an "ok" response before the
/// result is finalized.
pub type TransformFn = Arc<dyn Fn(ResponseBody) -> Result<ResponseBody> + Send + Sync>;

/// Immutable description of one HTTP operation.
///
/// Construct via the chained `with_*` methods:
///
/// ```rust,ignore
/// let descriptor = OperationDescriptor::new(Method::GET, "/users/{id}/posts")
///     .with_path_param("id", "42")
///     .with_query("limit", serde_json::json!(10))
///     .with_error_rule(StatusMatcher::Exact(404), "User not found");
/// ```
#[derive(Clone)]
pub struct OperationDescriptor {
    /// HTTP method.
    pub method: Method,
    /// URL path template with `{name}` placeholders.
    pub path: String,
    /// Path parameter substitutions, percent-encoded on assembly.
    pub path_params: Vec<(String, String)>,
    /// Query parameters in declaration order. `Null` values are omitted.
    pub query: Vec<(String, serde_json::Value)>,
    /// Style for array-valued query parameters.
    pub array_style: ArrayStyle,
    /// Style for object-valued query parameters.
    pub object_style: ObjectStyle,
    /// Request payload.
    pub body: RequestBody,
    /// Explicit Content-Type, overriding the one inferred from the body.
    pub media_type: Option<String>,
    /// Shape of the resolved value.
    pub response_mode: ResponseMode,
    /// Per-call headers, layered over the config defaults.
    pub headers: Vec<(String, HeaderSource)>,
    /// If this response header is present, its value becomes the body and
    /// payload extraction is skipped.
    pub response_header: Option<String>,
    /// Optional body transform, applied only to "ok" responses.
    pub transform: Option<TransformFn>,
    /// Classifier rule table consulted after extraction.
    pub rules: Vec<StatusRule>,
}

impl OperationDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: Vec::new(),
            query: Vec::new(),
            array_style: ArrayStyle::default(),
            object_style: ObjectStyle::default(),
            body: RequestBody::None,
            media_type: None,
            response_mode: ResponseMode::default(),
            headers: Vec::new(),
            response_header: None,
            transform: None,
            rules: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.push((name.into(), value.to_string()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.query.push((name.into(), value));
        self
    }

    pub fn with_array_style(mut self, style: ArrayStyle) -> Self {
        self.array_style = style;
        self
    }

    pub fn with_object_style(mut self, style: ObjectStyle) -> Self {
        self.object_style = style;
        self
    }

    pub fn with_json_body(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_binary_body(mut self, data: impl Into<Bytes>) -> Self {
        self.body = RequestBody::Binary {
            data: data.into(),
            content_type: None,
        };
        self
    }

    pub fn with_multipart_body(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    /// Set the Content-Type sent with the body, replacing both the inferred
    /// value and any `Content-Type` coming from the header layers.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, source: impl Into<HeaderSource>) -> Self {
        self.headers.push((name.into(), source.into()));
        self
    }

    pub fn with_response_header(mut self, name: impl Into<String>) -> Self {
        self.response_header = Some(name.into());
        self
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(ResponseBody) -> Result<ResponseBody> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn with_rule(mut self, rule: StatusRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_error_rule(
        mut self,
        matcher: crate::classify::StatusMatcher,
        message: impl Into<String>,
    ) -> Self {
        self.rules.push(StatusRule::error(matcher, message));
        self
    }

    /// Append the conventional default failure rules (see
    /// [`StatusRule::defaults`]).
    pub fn with_default_rules(mut self) -> Self {
        self.rules.extend(StatusRule::defaults());
        self
    }
}

impl std::fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("path_params", &self.path_params)
            .field("query", &self.query)
            .field("array_style", &self.array_style)
            .field("object_style", &self.object_style)
            .field("body", &self.body)
            .field("media_type", &self.media_type)
            .field("response_mode", &self.response_mode)
            .field("headers", &self.headers)
            .field("response_header", &self.response_header)
            .field("has_transform", &self.transform.is_some())
            .field("rules", &self.rules)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::StatusMatcher;

    #[test]
    fn builder_accumulates_in_declaration_order() {
        let descriptor = OperationDescriptor::get("/users/{id}")
            .with_path_param("id", 42)
            .with_query("a", serde_json::json!(1))
            .with_query("b", serde_json::json!(2))
            .with_error_rule(StatusMatcher::Exact(404), "User not found")
            .with_default_rules();

        assert_eq!(descriptor.path_params, vec![("id".to_string(), "42".to_string())]);
        assert_eq!(descriptor.query[0].0, "a");
        assert_eq!(descriptor.query[1].0, "b");
        // Operation-specific rule precedes the defaults.
        assert_eq!(descriptor.rules[0].matcher, StatusMatcher::Exact(404));
        assert_eq!(descriptor.rules.len(), 1 + StatusRule::defaults().len());
    }
}
