//! XML-backed memory
//!
//! Memory is the string `@mem`, a sequence of `<m>..</m>` cells addressed
//! through XPath (`/m[1]` is the first cell). Addresses are literal
//! integers or, for strings starting with `@`, session variables referenced
//! as `$@name`.

use crate::dialect::error::{DialectError, DialectResult};
use crate::dialect::value::Value;

fn code(operation: &str, value: &Value) -> DialectResult<String> {
    value.to_code().ok_or_else(|| {
        DialectError::invalid_argument(operation, "value is not known until the region ends")
    })
}

fn address(operation: &str, value: &Value) -> DialectResult<String> {
    match value {
        Value::Str(name) if name.starts_with('@') => Ok(format!("${}", name)),
        other => code(operation, other),
    }
}

pub(super) fn alloc(count: &Value) -> DialectResult<String> {
    if let Value::Int(n) = count {
        if *n < 0 {
            return Err(DialectError::NegativeAllocation { count: *n });
        }
    }
    Ok(format!(
        "@mem:=CONCAT(@mem,REPEAT('<m></m>',{}))",
        code("alloc", count)?
    ))
}

pub(super) fn load(dst: &Value, src: &Value) -> DialectResult<String> {
    Ok(format!(
        "{}:=ExtractValue(@mem,'/m[{}]')",
        code("load", dst)?,
        address("load", src)?
    ))
}

// TODO: escape `<` and `>` in stored values; UpdateXML rejects a cell
// whose content contains markup.
pub(super) fn store(value: &Value, dst: &Value) -> DialectResult<String> {
    Ok(format!(
        "@mem:=UpdateXML(@mem,'/m[{}]',CONCAT('<m>',{},'</m>'))",
        address("store", dst)?,
        code("store", value)?
    ))
}
