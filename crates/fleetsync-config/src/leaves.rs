use serde_json::Value;

/// Every scalar leaf of `root` with its JSON pointer, in document order.
///
/// Empty objects and arrays count as leaves so a stray `foo: {}` still shows
/// up in the unused-key lint. A scalar root is reported as `/`; an empty
/// root has no leaves.
pub(crate) fn leaves(root: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), root)];

    while let Some((pointer, value)) = stack.pop() {
        let children: Vec<(String, &Value)> = match value {
            Value::Object(map) if !map.is_empty() => map
                .iter()
                .map(|(k, v)| (format!("{pointer}/{}", escape(k)), v))
                .collect(),
            Value::Array(items) if !items.is_empty() => items
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("{pointer}/{i}"), v))
                .collect(),
            Value::Object(_) | Value::Array(_) if pointer.is_empty() => continue,
            _ => {
                let p = if pointer.is_empty() { "/".to_string() } else { pointer };
                out.push((p, value));
                continue;
            }
        };
        // Reverse so the first child is popped first.
        stack.extend(children.into_iter().rev());
    }
    out
}

/// RFC 6901 token escaping.
fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
