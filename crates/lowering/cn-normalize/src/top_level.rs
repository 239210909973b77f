//! Top-level rewrites
//!
//! Upstream modules open with CommonJS scaffolding (`"use strict"`,
//! `module.exports = …`, `var x = require("…")`) that has no meaning in GIR.
//! The scaffolding is dropped, `require` bindings move into
//! [`RawModule::requires`], and `var f = function …` becomes a named
//! function declaration.

use cn_raw::{RawKind, RawModule, RawNodeId, StructuralError, TranslateError};
use tracing::debug;

/// Boilerplate expression statement
pub const USE_STRICT: &str = "use strict";

const REQUIRE_INTRINSIC: &str = "require";
const EXPORTS_OBJECT: &str = "module";
const EXPORTS_KEY: &str = "exports";

enum Rewrite {
    Drop,
    Require { alias: String, path: String },
    Resugar { name: String, function: RawNodeId },
    Keep,
}

/// Rewrite and validate the top level of a linked module
pub fn rewrite_top_level(module: &mut RawModule) -> Result<(), TranslateError> {
    let body = std::mem::take(&mut module.body);
    let mut kept = Vec::with_capacity(body.len());

    for id in body {
        match classify(module, id) {
            Rewrite::Drop => {}
            Rewrite::Require { alias, path } => {
                debug!(%alias, %path, "foreign require");
                module.requires.insert(alias, path);
            }
            Rewrite::Resugar { name, function } => {
                let mut comments = std::mem::take(&mut module.node_mut(id).comments);
                let node = module.node_mut(function);
                if let RawKind::Function { name: slot, .. } = &mut node.kind {
                    *slot = Some(name);
                }
                comments.append(&mut node.comments);
                node.comments = comments;
                node.parent = None;
                kept.push(function);
            }
            Rewrite::Keep => {
                let kind = module.kind(id);
                if !matches!(
                    kind,
                    RawKind::Function { .. }
                        | RawKind::VariableIntroduction { .. }
                        | RawKind::Comment { .. }
                ) {
                    return Err(StructuralError::UnexpectedTopLevel { tag: kind.tag() }.into());
                }
                kept.push(id);
            }
        }
    }

    module.body = kept;
    Ok(())
}

fn classify(module: &RawModule, id: RawNodeId) -> Rewrite {
    match module.kind(id) {
        RawKind::StringLiteral(value) if value == USE_STRICT => Rewrite::Drop,
        RawKind::Assignment { target, .. } if is_exports_target(module, *target) => Rewrite::Drop,
        RawKind::VariableIntroduction {
            name,
            init: Some(init),
        } => {
            if let Some(path) = require_path(module, *init) {
                Rewrite::Require {
                    alias: name.clone(),
                    path: path.to_string(),
                }
            } else if matches!(module.kind(*init), RawKind::Function { .. }) {
                Rewrite::Resugar {
                    name: name.clone(),
                    function: *init,
                }
            } else {
                Rewrite::Keep
            }
        }
        _ => Rewrite::Keep,
    }
}

/// `module["exports"]`
fn is_exports_target(module: &RawModule, target: RawNodeId) -> bool {
    let RawKind::Indexer { base, key } = module.kind(target) else {
        return false;
    };
    module.kind(*base).as_var() == Some(EXPORTS_OBJECT)
        && module.kind(*key).as_string_literal() == Some(EXPORTS_KEY)
}

/// The path of `require("path")`, if `init` is exactly that call
fn require_path(module: &RawModule, init: RawNodeId) -> Option<&str> {
    let RawKind::App { callee, args } = module.kind(init) else {
        return None;
    };
    if module.kind(*callee).as_var() != Some(REQUIRE_INTRINSIC) {
        return None;
    }
    let [arg] = args.as_slice() else {
        return None;
    };
    module
        .kind(*arg)
        .as_string_literal()
        .filter(|path| !path.is_empty())
}

#[cfg(test)]
mod tests {
    use crate::normalize_module;
    use cn_raw::{
        Comment, ModuleId, RawKind, RawModule, StructuralError, TranslateError, decode_module,
    };

    fn normalized(json: &str) -> Result<RawModule, TranslateError> {
        let mut module = decode_module(ModuleId(0), json).unwrap();
        normalize_module(&mut module)?;
        Ok(module)
    }

    #[test]
    fn test_boilerplate_is_stripped() {
        let module = normalized(
            r#"{"moduleName": "Main", "body": [
                {"tag": "StringLiteral", "StringLiteral": "use strict"},
                {"tag": "Assignment",
                 "Assignment": {"tag": "Indexer",
                                "Indexer": {"tag": "Var", "Var": "module"},
                                "rhs": {"tag": "StringLiteral", "StringLiteral": "exports"}},
                 "rhs": {"tag": "ObjectLiteral", "ObjectLiteral": []}},
                {"tag": "VariableIntroduction", "VariableIntroduction": "y",
                 "rhs": {"tag": "App", "App": {"tag": "Var", "Var": "require"},
                         "args": [{"tag": "StringLiteral", "StringLiteral": "foo"}]}},
                {"tag": "Function", "Function": "f", "params": [], "body": {"tag": "Block", "Block": []}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(module.body.len(), 1);
        let RawKind::Function { name, .. } = module.kind(module.body[0]) else {
            panic!("expected a function");
        };
        assert_eq!(name.as_deref(), Some("f"));
        assert_eq!(module.requires.len(), 1);
        assert_eq!(module.requires.get("y").map(String::as_str), Some("foo"));
    }

    #[test]
    fn test_require_needs_one_non_empty_string() {
        let module = normalized(
            r#"{"moduleName": "Main", "body": [
                {"tag": "VariableIntroduction", "VariableIntroduction": "a",
                 "rhs": {"tag": "App", "App": {"tag": "Var", "Var": "require"},
                         "args": [{"tag": "StringLiteral", "StringLiteral": ""}]}},
                {"tag": "VariableIntroduction", "VariableIntroduction": "b",
                 "rhs": {"tag": "App", "App": {"tag": "Var", "Var": "require"},
                         "args": [{"tag": "Var", "Var": "path"}]}}
            ]}"#,
        )
        .unwrap();

        assert!(module.requires.is_empty());
        assert_eq!(module.body.len(), 2);
    }

    #[test]
    fn test_function_binding_is_resugared() {
        let module = normalized(
            r#"{"moduleName": "Main", "body": [{
                "tag": "Comment", "Comment": [{"LineComment": " id"}],
                "decl": {"tag": "VariableIntroduction", "VariableIntroduction": "identity$prime",
                         "rhs": {"tag": "Function", "params": ["x"],
                                 "body": {"tag": "Block", "Block": [
                                    {"tag": "Return", "Return": {"tag": "Var", "Var": "x"}}
                                 ]}}}
            }]}"#,
        )
        .unwrap();

        let function = module.node(module.body[0]);
        let RawKind::Function { name, params, .. } = &function.kind else {
            panic!("expected a function");
        };
        assert_eq!(name.as_deref(), Some("identity'"));
        assert_eq!(params, &["x"]);
        assert_eq!(function.parent, None);
        assert_eq!(function.comments, vec![Comment::Line(" id".to_string())]);
    }

    #[test]
    fn test_unexpected_top_level_statement() {
        let err = normalized(
            r#"{"moduleName": "Main", "body": [
                {"tag": "Function", "Function": "f", "params": [], "body": {"tag": "Block", "Block": []}},
                {"tag": "App", "App": {"tag": "Var", "Var": "main"}, "args": []}
            ]}"#,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TranslateError::Structural(StructuralError::UnexpectedTopLevel { tag: "App" })
        );
    }

    #[test]
    fn test_free_standing_comment_is_kept() {
        let module = normalized(
            r#"{"moduleName": "Main", "body": [
                {"tag": "Comment", "Comment": [{"BlockComment": " header "}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(module.body.len(), 1);
        assert_eq!(module.kind(module.body[0]), &RawKind::Comment { decl: None });
    }
}
