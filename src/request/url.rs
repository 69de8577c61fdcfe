//! URL building: path template substitution and query-string serialization.

use crate::descriptor::{ArrayStyle, ObjectStyle, OperationDescriptor};
use crate::error::{ClientError, Result};
use serde_json::Value;

/// Build the final request URL from the base URL and the descriptor.
///
/// Path placeholders (`{name}`) are substituted with percent-encoded values;
/// a placeholder without a matching path parameter is an error. The query
/// string is appended per the descriptor's array/object styles, with
/// null/absent values omitted.
pub fn build_url(base_url: &str, descriptor: &OperationDescriptor) -> Result<String> {
    let path = substitute_path(&descriptor.path, &descriptor.path_params)?;
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
    let query = build_query(
        &descriptor.query,
        descriptor.array_style,
        descriptor.object_style,
    );
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    Ok(url)
}

fn substitute_path(template: &str, params: &[(String, String)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            ClientError::InvalidRequest(format!("unclosed placeholder in path '{template}'"))
        })?;
        let name = &after[..close];
        let value = params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| {
                ClientError::InvalidRequest(format!("missing path parameter '{name}'"))
            })?;
        out.push_str(&urlencoding::encode(value));
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn build_query(
    query: &[(String, Value)],
    array_style: ArrayStyle,
    object_style: ObjectStyle,
) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (name, value) in query {
        append_value(&mut pairs, urlencoding::encode(name).into_owned(), value, array_style, object_style);
    }
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append one parameter value under an already-encoded key expression.
/// Bracket segments of nested keys stay literal.
fn append_value(
    pairs: &mut Vec<(String, String)>,
    key: String,
    value: &Value,
    array_style: ArrayStyle,
    object_style: ObjectStyle,
) {
    match value {
        Value::Null => {}
        Value::Array(items) => append_array(pairs, key, items, array_style, object_style),
        Value::Object(map) => {
            for (sub, nested) in map {
                let nested_key = format!("{key}[{}]", urlencoding::encode(sub));
                match object_style {
                    ObjectStyle::Deep => {
                        append_value(pairs, nested_key, nested, array_style, object_style)
                    }
                    ObjectStyle::Bracket => {
                        if let Some(scalar) = render_scalar(nested) {
                            pairs.push((nested_key, scalar));
                        }
                    }
                }
            }
        }
        scalar => {
            if let Some(rendered) = render_scalar(scalar) {
                pairs.push((key, rendered));
            }
        }
    }
}

fn append_array(
    pairs: &mut Vec<(String, String)>,
    key: String,
    items: &[Value],
    array_style: ArrayStyle,
    object_style: ObjectStyle,
) {
    match array_style {
        ArrayStyle::Repeat => {
            for item in items {
                append_value(pairs, key.clone(), item, array_style, object_style);
            }
        }
        ArrayStyle::Comma | ArrayStyle::Pipe => {
            let delimiter = if array_style == ArrayStyle::Comma {
                ","
            } else {
                "|"
            };
            let joined = items
                .iter()
                .filter_map(render_scalar)
                .collect::<Vec<_>>()
                .join(delimiter);
            if !joined.is_empty() {
                pairs.push((key, joined));
            }
        }
    }
}

/// Render a scalar query value, percent-encoded. Null and non-scalar values
/// render as `None` and are omitted by the caller.
fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(urlencoding::encode(s).into_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url_of(descriptor: OperationDescriptor) -> String {
        build_url("http://api.invalid/v2/", &descriptor).unwrap()
    }

    #[test]
    fn substitutes_and_encodes_path_params() {
        let descriptor = OperationDescriptor::get("/users/{id}/files/{name}")
            .with_path_param("id", 42)
            .with_path_param("name", "report 1.pdf");
        assert_eq!(
            url_of(descriptor),
            "http://api.invalid/v2/users/42/files/report%201.pdf"
        );
    }

    #[test]
    fn missing_path_param_is_an_error() {
        let descriptor = OperationDescriptor::get("/users/{id}");
        assert!(matches!(
            build_url("http://api.invalid", &descriptor),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn repeat_style_array_and_bool() {
        let descriptor = OperationDescriptor::get("/items")
            .with_query("tags", json!(["x", "y"]))
            .with_query("active", json!(true));
        assert_eq!(
            url_of(descriptor),
            "http://api.invalid/v2/items?tags=x&tags=y&active=true"
        );
    }

    #[test]
    fn comma_and_pipe_styles_join_items() {
        let comma = OperationDescriptor::get("/items")
            .with_query("tags", json!(["x", "y"]))
            .with_array_style(ArrayStyle::Comma);
        // The delimiter itself stays literal; only the items are encoded.
        assert_eq!(url_of(comma), "http://api.invalid/v2/items?tags=x,y");

        let pipe = OperationDescriptor::get("/items")
            .with_query("tags", json!(["x", "y"]))
            .with_array_style(ArrayStyle::Pipe);
        assert_eq!(url_of(pipe), "http://api.invalid/v2/items?tags=x|y");
    }

    #[test]
    fn bracket_style_objects_expand_one_level() {
        let descriptor = OperationDescriptor::get("/items")
            .with_query("filter", json!({"name": "a", "age": 3}));
        // serde_json maps iterate in key order.
        assert_eq!(
            url_of(descriptor),
            "http://api.invalid/v2/items?filter[age]=3&filter[name]=a"
        );
    }

    #[test]
    fn deep_style_objects_recurse() {
        let descriptor = OperationDescriptor::get("/items")
            .with_query("filter", json!({"owner": {"name": "a"}}))
            .with_object_style(ObjectStyle::Deep);
        assert_eq!(
            url_of(descriptor),
            "http://api.invalid/v2/items?filter[owner][name]=a"
        );
    }

    #[test]
    fn null_and_empty_values_are_omitted() {
        let descriptor = OperationDescriptor::get("/items")
            .with_query("missing", json!(null))
            .with_query("tags", json!([]))
            .with_query("page", json!(2));
        assert_eq!(url_of(descriptor), "http://api.invalid/v2/items?page=2");
    }

    #[test]
    fn values_are_percent_encoded() {
        let descriptor =
            OperationDescriptor::get("/search").with_query("q", json!("a&b=c d"));
        assert_eq!(
            url_of(descriptor),
            "http://api.invalid/v2/search?q=a%26b%3Dc%20d"
        );
    }

    #[test]
    fn no_query_means_no_question_mark() {
        let descriptor = OperationDescriptor::get("/items");
        assert_eq!(url_of(descriptor), "http://api.invalid/v2/items");
    }
}
