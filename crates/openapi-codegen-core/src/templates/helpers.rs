//! Helper filters and functions registered on every template, next to Tera's
//! own built-ins (`upper`, `replace`, `join`, `json_encode`, `indent`, ...).

use std::collections::HashMap;

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use regex::Regex;
use tera::{Result, Tera, Value};

/// Register the helper library on `tera`
pub fn register(tera: &mut Tera) {
    tera.register_filter("snake_case", snake_case);
    tera.register_filter("camel_case", camel_case);
    tera.register_filter("pascal_case", pascal_case);
    tera.register_filter("kebab_case", kebab_case);
    tera.register_filter("shouty_snake_case", shouty_snake_case);
    tera.register_filter("ref_name", ref_name);
    tera.register_filter("regex_replace", regex_replace);
    tera.register_filter("to_yaml", to_yaml);
    tera.register_function("join_path", join_path);
}

fn expect_str<'a>(value: &'a Value, filter: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{filter} filter expects a string")))
}

pub(crate) fn snake_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(expect_str(value, "snake_case")?.to_snake_case()))
}

pub(crate) fn camel_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(
        expect_str(value, "camel_case")?.to_lower_camel_case(),
    ))
}

pub(crate) fn pascal_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(expect_str(value, "pascal_case")?.to_pascal_case()))
}

pub(crate) fn kebab_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(expect_str(value, "kebab_case")?.to_kebab_case()))
}

pub(crate) fn shouty_snake_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(
        expect_str(value, "shouty_snake_case")?.to_shouty_snake_case(),
    ))
}

/// `"#/components/schemas/Pet" | ref_name` gives `"Pet"`
pub(crate) fn ref_name(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let reference = match value {
        Value::Object(map) => map.get("$ref").unwrap_or(value),
        _ => value,
    };
    let reference = expect_str(reference, "ref_name")?;
    let name = reference.rsplit('/').next().unwrap_or(reference);
    Ok(Value::String(name.to_string()))
}

/// `value | regex_replace(pattern="[^a-z]", replacement="_")`
pub(crate) fn regex_replace(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let input = expect_str(value, "regex_replace")?;
    let pattern = args
        .get("pattern")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("regex_replace filter requires a `pattern` string"))?;
    let replacement = args
        .get("replacement")
        .and_then(Value::as_str)
        .unwrap_or("");

    let regex = Regex::new(pattern)
        .map_err(|e| tera::Error::msg(format!("invalid regex_replace pattern '{pattern}': {e}")))?;
    Ok(Value::String(regex.replace_all(input, replacement).into_owned()))
}

pub(crate) fn to_yaml(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    serde_yaml::to_string(value)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("to_yaml failed: {e}")))
}

/// `join_path(parts=["src", "models", "pet.rs"])` gives `"src/models/pet.rs"`
pub(crate) fn join_path(args: &HashMap<String, Value>) -> Result<Value> {
    let parts = args
        .get("parts")
        .and_then(Value::as_array)
        .ok_or_else(|| tera::Error::msg("join_path requires a `parts` list"))?;

    let parts = parts
        .iter()
        .map(|part| {
            part.as_str()
                .map(|s| s.trim_matches('/'))
                .ok_or_else(|| tera::Error::msg("join_path parts must be strings"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Value::String(
        parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/"),
    ))
}
