//! Tree linking

use cn_raw::{RawKind, RawModule, RawNodeId, StructuralError, TranslateError};

/// Substring the upstream compiler uses to spell `'` in identifiers
pub const PRIME_MARKER: &str = "$prime";

/// Replace every prime marker in an identifier with an apostrophe
pub fn sanitize_identifier(name: &str) -> String {
    name.replace(PRIME_MARKER, "'")
}

/// Link every tree of the module
///
/// Top-level comment wrappers that carry a declaration are replaced by that
/// declaration in [`RawModule::body`].
pub fn link_module(module: &mut RawModule) -> Result<(), TranslateError> {
    for index in 0..module.body.len() {
        let root = module.body[index];
        module.body[index] = link_node(module, root, None)?;
    }
    Ok(())
}

/// Link one subtree and return the ID that should occupy its slot
fn link_node(
    module: &mut RawModule,
    id: RawNodeId,
    parent: Option<RawNodeId>,
) -> Result<RawNodeId, TranslateError> {
    let id = unwrap_comment(module, id)?;

    let module_id = module.id;
    let node = module.node_mut(id);
    node.parent = parent;
    node.module = Some(module_id);
    for name in node.kind.identifiers_mut() {
        if name.contains(PRIME_MARKER) {
            *name = sanitize_identifier(name);
        }
    }

    let children = node.kind.children();
    for (slot, child) in children.into_iter().enumerate() {
        let linked = link_node(module, child, Some(id))?;
        if linked != child {
            *module.node_mut(id).kind.children_mut()[slot] = linked;
        }
    }

    Ok(id)
}

/// Replace a comment wrapper by its declaration, moving the comments over
fn unwrap_comment(module: &mut RawModule, id: RawNodeId) -> Result<RawNodeId, TranslateError> {
    let RawKind::Comment { decl: Some(decl) } = *module.kind(id) else {
        return Ok(id);
    };
    if matches!(module.kind(decl), RawKind::Comment { .. }) {
        return Err(StructuralError::NestedComment.into());
    }

    let mut comments = std::mem::take(&mut module.node_mut(id).comments);
    let inner = module.node_mut(decl);
    comments.append(&mut inner.comments);
    inner.comments = comments;
    Ok(decl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cn_raw::{Comment, ModuleId, decode_module};

    fn linked(json: &str) -> Result<RawModule, TranslateError> {
        let mut module = decode_module(ModuleId(3), json).unwrap();
        link_module(&mut module)?;
        Ok(module)
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("go$prime$prime"), "go''");
        assert_eq!(sanitize_identifier("plain"), "plain");
    }

    #[test]
    fn test_link_sets_parent_and_module() {
        let module = linked(
            r#"{"moduleName": "M", "body": [{
                "tag": "Function", "Function": "f", "params": ["x"],
                "body": {"tag": "Block", "Block": [
                    {"tag": "Return", "Return": {"tag": "Var", "Var": "x"}}
                ]}
            }]}"#,
        )
        .unwrap();

        let function = module.body[0];
        assert_eq!(module.node(function).parent, None);

        let RawKind::Function { body, .. } = *module.kind(function) else {
            panic!("expected a function");
        };
        let RawKind::Block(ref stmts) = *module.kind(body) else {
            panic!("expected a block");
        };
        let ret = stmts[0];
        let RawKind::Return(value) = *module.kind(ret) else {
            panic!("expected a return");
        };

        assert_eq!(module.node(body).parent, Some(function));
        assert_eq!(module.node(ret).parent, Some(body));
        assert_eq!(module.node(value).parent, Some(ret));
        for id in [function, body, ret, value] {
            assert_eq!(module.node(id).module, Some(ModuleId(3)));
        }
    }

    #[test]
    fn test_link_sanitizes_every_identifier_slot() {
        let module = linked(
            r#"{"moduleName": "M", "body": [{
                "tag": "Function", "Function": "f$prime", "params": ["a$prime"],
                "body": {"tag": "Block", "Block": [
                    {"tag": "VariableIntroduction", "VariableIntroduction": "v$prime",
                     "rhs": {"tag": "ObjectLiteral", "ObjectLiteral": [
                        {"k$prime": {"tag": "Var", "Var": "a$prime"}}
                     ]}},
                    {"tag": "For", "For": "i$prime",
                     "for1": {"tag": "NumericLiteral_Integer", "NumericLiteral_Integer": 0},
                     "for2": {"tag": "NumericLiteral_Integer", "NumericLiteral_Integer": 3},
                     "body": {"tag": "Block", "Block": []}}
                ]}
            }]}"#,
        )
        .unwrap();

        let mut identifiers = Vec::new();
        for (_, node) in module.nodes.iter() {
            let mut kind = node.kind.clone();
            identifiers.extend(kind.identifiers_mut().into_iter().map(|name| name.clone()));
        }
        identifiers.sort();
        assert_eq!(identifiers, ["a'", "a'", "f'", "i'", "k'", "v'"]);
    }

    #[test]
    fn test_comment_wrapper_is_replaced_by_declaration() {
        let module = linked(
            r#"{"moduleName": "M", "body": [{
                "tag": "Comment", "Comment": [{"LineComment": " first"}, {"BlockComment": " second "}],
                "decl": {"tag": "VariableIntroduction", "VariableIntroduction": "x",
                         "rhs": {"tag": "BooleanLiteral", "BooleanLiteral": false}}
            }]}"#,
        )
        .unwrap();

        let decl = module.node(module.body[0]);
        assert!(matches!(decl.kind, RawKind::VariableIntroduction { .. }));
        assert_eq!(decl.parent, None);
        assert_eq!(
            decl.comments,
            vec![
                Comment::Line(" first".to_string()),
                Comment::Block(" second ".to_string())
            ]
        );
    }

    #[test]
    fn test_nested_comment_wrapper_is_rejected() {
        let err = linked(
            r#"{"moduleName": "M", "body": [{
                "tag": "Comment", "Comment": [{"LineComment": " outer"}],
                "decl": {"tag": "Comment", "Comment": [{"LineComment": " inner"}]}
            }]}"#,
        )
        .unwrap_err();

        assert_eq!(err, TranslateError::Structural(StructuralError::NestedComment));
    }

    #[test]
    fn test_nested_wrapper_inside_function_body_is_unwrapped() {
        let module = linked(
            r#"{"moduleName": "M", "body": [{
                "tag": "Function", "params": [],
                "body": {"tag": "Block", "Block": [{
                    "tag": "Comment", "Comment": [{"LineComment": " note"}],
                    "decl": {"tag": "ReturnNoResult"}
                }]}
            }]}"#,
        )
        .unwrap();

        let RawKind::Function { body, .. } = *module.kind(module.body[0]) else {
            panic!("expected a function");
        };
        let RawKind::Block(ref stmts) = *module.kind(body) else {
            panic!("expected a block");
        };
        let stmt = module.node(stmts[0]);
        assert_eq!(stmt.kind, RawKind::ReturnNoResult);
        assert_eq!(stmt.parent, Some(body));
        assert_eq!(stmt.comments, vec![Comment::Line(" note".to_string())]);
    }
}
