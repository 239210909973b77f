//! Builders for upstream JSON nodes

use serde_json::{Value, json};

/// A module document
pub fn module_document(
    name: &str,
    exports: &[&str],
    imports: &[&str],
    body: Vec<Value>,
) -> Value {
    let imports: Vec<Vec<&str>> = imports
        .iter()
        .map(|module| module.split('.').collect())
        .collect();
    json!({
        "moduleName": name,
        "exports": exports,
        "imports": imports,
        "body": body,
    })
}

/// A node carrying only a tag
pub fn tagged(tag: &str) -> Value {
    json!({ "tag": tag })
}

/// A variable reference
pub fn var(name: &str) -> Value {
    json!({ "tag": "Var", "Var": name })
}

/// A string literal
pub fn string(value: &str) -> Value {
    json!({ "tag": "StringLiteral", "StringLiteral": value })
}

/// An integer literal
pub fn int(value: i64) -> Value {
    json!({ "tag": "NumericLiteral_Integer", "NumericLiteral_Integer": value })
}

/// A block of statements
pub fn block(stmts: Vec<Value>) -> Value {
    json!({ "tag": "Block", "Block": stmts })
}

/// A named function
pub fn function(name: &str, params: &[&str], body: Vec<Value>) -> Value {
    json!({ "tag": "Function", "Function": name, "params": params, "body": block(body) })
}

/// An anonymous function literal
pub fn lambda(params: &[&str], body: Vec<Value>) -> Value {
    json!({ "tag": "Function", "params": params, "body": block(body) })
}

/// `var name = rhs`
pub fn var_intro(name: &str, rhs: Value) -> Value {
    json!({ "tag": "VariableIntroduction", "VariableIntroduction": name, "rhs": rhs })
}

/// `target = value`
pub fn assign(target: Value, value: Value) -> Value {
    json!({ "tag": "Assignment", "Assignment": target, "rhs": value })
}

/// `base[key]`
pub fn indexer(base: Value, key: Value) -> Value {
    json!({ "tag": "Indexer", "Indexer": base, "rhs": key })
}

/// `value instanceof ty`
pub fn instance_of(value: Value, ty: Value) -> Value {
    json!({ "tag": "InstanceOf", "InstanceOf": value, "rhs": ty })
}

/// `return value`
pub fn ret(value: Value) -> Value {
    json!({ "tag": "Return", "Return": value })
}

/// A call
pub fn app(callee: Value, args: Vec<Value>) -> Value {
    json!({ "tag": "App", "App": callee, "args": args })
}

/// `require("path")`
pub fn require(path: &str) -> Value {
    app(var("require"), vec![string(path)])
}

/// `{ key: value, … }`
pub fn object(fields: Vec<(&str, Value)>) -> Value {
    let entries: Vec<Value> = fields
        .into_iter()
        .map(|(key, value)| json!({ key: value }))
        .collect();
    json!({ "tag": "ObjectLiteral", "ObjectLiteral": entries })
}

/// `module.exports = { name: name, … }`
pub fn exports_assignment(names: &[&str]) -> Value {
    let fields = names.iter().map(|name| (*name, var(name))).collect();
    assign(indexer(var("module"), string("exports")), object(fields))
}
