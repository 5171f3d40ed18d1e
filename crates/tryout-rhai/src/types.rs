// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type names accepted by `#=:>` expectations.

/// Map a user-written type name onto rhai's own name for it.
fn canonical(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "int" | "integer" | "i64" => "i64".to_string(),
        "float" | "f64" => "f64".to_string(),
        "str" | "string" | "immutablestring" => "string".to_string(),
        "bool" | "boolean" => "bool".to_string(),
        "()" | "unit" | "nil" => "()".to_string(),
        "array" | "vec" => "array".to_string(),
        "map" | "object" | "hash" => "map".to_string(),
        "fn" | "fnptr" | "function" => "fn".to_string(),
        other => other.to_string(),
    }
}

/// Whether a value whose rhai type is `actual` satisfies `wanted`.
/// `number` covers both integers and floats; `any` and `dynamic` cover
/// everything.
pub(crate) fn type_matches(actual: &str, wanted: &str) -> bool {
    let wanted = canonical(wanted.trim());
    let actual = canonical(actual);
    match wanted.as_str() {
        "any" | "dynamic" => true,
        "number" | "numeric" => actual == "i64" || actual == "f64",
        w => w == actual,
    }
}
