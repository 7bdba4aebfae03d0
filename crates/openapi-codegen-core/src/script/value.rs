//! Conversion between JSON values and QuickJS values.
//!
//! `serde_json::Value` is the tagged union crossing the script boundary: it is
//! what Tera hands to functions and expects back, and it is all a script sees.
//! Values without a JSON shape (functions, symbols, `undefined`) become `null`.

use rquickjs::{object::Property, Array, Ctx, Object, Type, Value};
use serde_json::{Map, Number, Value as JsonValue};

/// Build a JavaScript value from JSON
pub fn to_js<'js>(ctx: &Ctx<'js>, value: &JsonValue) -> rquickjs::Result<Value<'js>> {
    let js = match value {
        JsonValue::Null => Value::new_null(ctx.clone()),
        JsonValue::Bool(b) => Value::new_bool(ctx.clone(), *b),
        JsonValue::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => Value::new_int(ctx.clone(), i),
            None => Value::new_float(ctx.clone(), n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => rquickjs::String::from_str(ctx.clone(), s)?.into_value(),
        JsonValue::Array(items) => {
            let array = Array::new(ctx.clone())?;
            for (index, item) in items.iter().enumerate() {
                array.set(index, to_js(ctx, item)?)?;
            }
            array.into_value()
        }
        JsonValue::Object(map) => {
            let object = Object::new(ctx.clone())?;
            // Defined rather than assigned, so `__proto__` stays an ordinary key
            for (key, item) in map {
                let property = Property::from(to_js(ctx, item)?)
                    .writable()
                    .enumerable()
                    .configurable();
                object.prop(key.as_str(), property)?;
            }
            object.into_value()
        }
    };
    Ok(js)
}

/// Read a JavaScript value back into JSON
pub fn from_js(value: &Value<'_>) -> rquickjs::Result<JsonValue> {
    let json = match value.type_of() {
        Type::Bool => JsonValue::Bool(value.as_bool().unwrap_or_default()),
        Type::Int => JsonValue::from(value.as_int().unwrap_or_default()),
        Type::Float => float_to_json(value.as_float().unwrap_or(f64::NAN)),
        Type::String => JsonValue::String(value.get::<String>()?),
        Type::Array => match value.as_array() {
            Some(array) => JsonValue::Array(
                array
                    .iter::<Value>()
                    .map(|item| item.and_then(|item| from_js(&item)))
                    .collect::<rquickjs::Result<_>>()?,
            ),
            None => JsonValue::Null,
        },
        Type::Object => match value.as_object() {
            Some(object) => {
                let mut map = Map::new();
                for prop in object.props::<String, Value>() {
                    let (key, item) = prop?;
                    if item.is_function() || item.is_undefined() {
                        continue;
                    }
                    map.insert(key, from_js(&item)?);
                }
                JsonValue::Object(map)
            }
            None => JsonValue::Null,
        },
        _ => JsonValue::Null,
    };
    Ok(json)
}

// JSON has no NaN/Infinity; like JSON.stringify they become null.
fn float_to_json(f: f64) -> JsonValue {
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        return JsonValue::from(f as i64);
    }
    Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
}
