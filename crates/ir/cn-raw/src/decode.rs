//! Decoding of upstream JSON documents into typed raw modules
//!
//! Upstream nodes are one record with many optional tag-selected fields.
//! [`RawAst`] mirrors that record; [`Decoder`] checks that the populated
//! fields are exactly the ones the tag owns and turns each record into a
//! closed [`RawKind`] variant.

use crate::error::{DecodeError, StructuralError, TranslateError, UnsupportedConstructError};
use crate::{
    Comment, ImportAlias, ModuleId, ModuleInfo, ObjectField, RawKind, RawModule, RawNode,
    RawNodeId, SourceSpan,
};
use indexmap::IndexMap;
use serde::Deserialize;

/// One module document as emitted upstream
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Qualified module name
    pub module_name: String,
    /// Exported names
    #[serde(default)]
    pub exports: Vec<String>,
    /// Imported modules as name segments, e.g. `["Data", "Maybe"]`
    #[serde(default)]
    pub imports: Vec<Vec<String>>,
    /// Top-level statements
    #[serde(default)]
    pub body: Vec<RawAst>,
}

/// Upstream comment record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComment {
    /// Line comment text
    #[serde(rename = "LineComment", default)]
    pub line: Option<String>,
    /// Block comment text
    #[serde(rename = "BlockComment", default)]
    pub block: Option<String>,
}

/// Upstream node record: a tag plus whichever fields that tag uses
#[derive(Debug, Clone, Default, Deserialize)]
#[allow(missing_docs, reason = "field meanings are documented on RawKind")]
pub struct RawAst {
    pub tag: String,
    #[serde(rename = "sourceSpan", default)]
    pub source_span: Option<SourceSpan>,

    #[serde(default)]
    pub body: Option<Box<RawAst>>,
    #[serde(default)]
    pub rhs: Option<Box<RawAst>>,
    #[serde(default)]
    pub decl: Option<Box<RawAst>>,
    #[serde(default)]
    pub args: Option<Vec<RawAst>>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub params: Option<Vec<String>>,
    #[serde(default)]
    pub for1: Option<Box<RawAst>>,
    #[serde(default)]
    pub for2: Option<Box<RawAst>>,
    #[serde(default)]
    pub then: Option<Box<RawAst>>,
    #[serde(rename = "else", default)]
    pub else_: Option<Box<RawAst>>,

    #[serde(rename = "StringLiteral", default)]
    pub string_literal: Option<String>,
    #[serde(rename = "BooleanLiteral", default)]
    pub boolean_literal: Option<bool>,
    #[serde(rename = "NumericLiteral_Integer", default)]
    pub integer_literal: Option<i64>,
    #[serde(rename = "NumericLiteral_Double", default)]
    pub double_literal: Option<f64>,
    #[serde(rename = "Var", default)]
    pub var: Option<String>,
    #[serde(rename = "Block", default)]
    pub block: Option<Vec<RawAst>>,
    #[serde(rename = "While", default)]
    pub while_: Option<Box<RawAst>>,
    #[serde(rename = "ForIn", default)]
    pub for_in: Option<String>,
    #[serde(rename = "For", default)]
    pub for_: Option<String>,
    #[serde(rename = "IfElse", default)]
    pub if_else: Option<Box<RawAst>>,
    #[serde(rename = "App", default)]
    pub app: Option<Box<RawAst>>,
    #[serde(rename = "VariableIntroduction", default)]
    pub variable_introduction: Option<String>,
    #[serde(rename = "Function", default)]
    pub function: Option<String>,
    #[serde(rename = "Unary", default)]
    pub unary: Option<Box<RawAst>>,
    #[serde(rename = "Binary", default)]
    pub binary: Option<Box<RawAst>>,
    #[serde(rename = "Comment", default)]
    pub comment: Option<Vec<RawComment>>,
    #[serde(rename = "ObjectLiteral", default)]
    pub object_literal: Option<Vec<IndexMap<String, RawAst>>>,
    #[serde(rename = "Return", default)]
    pub return_: Option<Box<RawAst>>,
    #[serde(rename = "Throw", default)]
    pub throw: Option<Box<RawAst>>,
    #[serde(rename = "ArrayLiteral", default)]
    pub array_literal: Option<Vec<RawAst>>,
    #[serde(rename = "Assignment", default)]
    pub assignment: Option<Box<RawAst>>,
    #[serde(rename = "Indexer", default)]
    pub indexer: Option<Box<RawAst>>,
    #[serde(rename = "InstanceOf", default)]
    pub instance_of: Option<Box<RawAst>>,
}

impl RawAst {
    /// Create a bare record carrying only a tag
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Names of the payload fields that are present
    fn populated(&self) -> Vec<&'static str> {
        let slots = [
            ("body", self.body.is_some()),
            ("rhs", self.rhs.is_some()),
            ("decl", self.decl.is_some()),
            ("args", self.args.is_some()),
            ("op", self.op.is_some()),
            ("params", self.params.is_some()),
            ("for1", self.for1.is_some()),
            ("for2", self.for2.is_some()),
            ("then", self.then.is_some()),
            ("else", self.else_.is_some()),
            ("StringLiteral", self.string_literal.is_some()),
            ("BooleanLiteral", self.boolean_literal.is_some()),
            ("NumericLiteral_Integer", self.integer_literal.is_some()),
            ("NumericLiteral_Double", self.double_literal.is_some()),
            ("Var", self.var.is_some()),
            ("Block", self.block.is_some()),
            ("While", self.while_.is_some()),
            ("ForIn", self.for_in.is_some()),
            ("For", self.for_.is_some()),
            ("IfElse", self.if_else.is_some()),
            ("App", self.app.is_some()),
            ("VariableIntroduction", self.variable_introduction.is_some()),
            ("Function", self.function.is_some()),
            ("Unary", self.unary.is_some()),
            ("Binary", self.binary.is_some()),
            ("Comment", self.comment.is_some()),
            ("ObjectLiteral", self.object_literal.is_some()),
            ("Return", self.return_.is_some()),
            ("Throw", self.throw.is_some()),
            ("ArrayLiteral", self.array_literal.is_some()),
            ("Assignment", self.assignment.is_some()),
            ("Indexer", self.indexer.is_some()),
            ("InstanceOf", self.instance_of.is_some()),
        ];
        slots
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }
}

/// Payload fields a tag may populate, or `None` for an unknown tag
fn permitted_fields(tag: &str) -> Option<&'static [&'static str]> {
    let fields: &'static [&'static str] = match tag {
        "StringLiteral" => &["StringLiteral"],
        "BooleanLiteral" => &["BooleanLiteral"],
        "NumericLiteral_Integer" => &["NumericLiteral_Integer"],
        "NumericLiteral_Double" => &["NumericLiteral_Double"],
        "Var" => &["Var"],
        "Block" => &["Block"],
        "While" => &["While", "body"],
        "ForIn" => &["ForIn", "for1", "body"],
        "For" => &["For", "for1", "for2", "body"],
        "IfElse" => &["IfElse", "then", "else"],
        "App" => &["App", "args"],
        "VariableIntroduction" => &["VariableIntroduction", "rhs"],
        "Function" => &["Function", "params", "body"],
        "Unary" => &["Unary", "op"],
        "Binary" => &["Binary", "op", "rhs"],
        "Comment" => &["Comment", "decl"],
        "ObjectLiteral" => &["ObjectLiteral"],
        "ReturnNoResult" => &[],
        "Return" => &["Return"],
        "Throw" => &["Throw"],
        "ArrayLiteral" => &["ArrayLiteral"],
        "Assignment" => &["Assignment", "rhs"],
        "Indexer" => &["Indexer", "rhs"],
        "InstanceOf" => &["InstanceOf", "rhs"],
        _ => return None,
    };
    Some(fields)
}

/// Parse a JSON document and decode it into a raw module
pub fn decode_module(id: ModuleId, json: &str) -> Result<RawModule, TranslateError> {
    let document: RawDocument = serde_json::from_str(json).map_err(DecodeError::from)?;
    decode_document(id, document)
}

/// Decode an already parsed document into a raw module
pub fn decode_document(id: ModuleId, document: RawDocument) -> Result<RawModule, TranslateError> {
    let info = ModuleInfo {
        qualified_name: document.module_name,
        exports: document.exports.into_iter().collect(),
    };
    let mut decoder = Decoder {
        module: RawModule::new(id, info),
    };

    decoder.module.imports = document
        .imports
        .into_iter()
        .map(|segments| ImportAlias {
            alias: segments.join("_"),
            module: segments.join("."),
        })
        .collect();

    for ast in document.body {
        let node = decoder.decode(ast, None)?;
        decoder.module.body.push(node);
    }

    Ok(decoder.module)
}

/// Builds the arena for one module
struct Decoder {
    module: RawModule,
}

impl Decoder {
    fn decode(
        &mut self,
        mut ast: RawAst,
        parent: Option<&str>,
    ) -> Result<RawNodeId, TranslateError> {
        let Some(permitted) = permitted_fields(&ast.tag) else {
            return Err(UnsupportedConstructError::UnknownTag {
                tag: ast.tag,
                parent: parent.map(str::to_string),
            }
            .into());
        };

        if let Some(extra) = ast
            .populated()
            .into_iter()
            .find(|field| !permitted.contains(field))
        {
            return Err(mismatch(&ast.tag, format!("unexpected field `{extra}`")));
        }

        let tag = std::mem::take(&mut ast.tag);
        let span = ast.source_span.take();
        let mut comments = Vec::new();

        let kind = match tag.as_str() {
            "StringLiteral" => {
                RawKind::StringLiteral(required(ast.string_literal, &tag, "StringLiteral")?)
            }
            "BooleanLiteral" => {
                RawKind::BooleanLiteral(required(ast.boolean_literal, &tag, "BooleanLiteral")?)
            }
            "NumericLiteral_Integer" => RawKind::IntegerLiteral(required(
                ast.integer_literal,
                &tag,
                "NumericLiteral_Integer",
            )?),
            "NumericLiteral_Double" => {
                RawKind::DoubleLiteral(required(ast.double_literal, &tag, "NumericLiteral_Double")?)
            }
            "Var" => RawKind::Var(required(ast.var, &tag, "Var")?),
            "Block" => RawKind::Block(self.decode_all(required(ast.block, &tag, "Block")?, &tag)?),
            "While" => RawKind::While {
                cond: self.decode_boxed(ast.while_, &tag, "While")?,
                body: self.decode_boxed(ast.body, &tag, "body")?,
            },
            "ForIn" => RawKind::ForIn {
                binder: required(ast.for_in, &tag, "ForIn")?,
                source: self.decode_boxed(ast.for1, &tag, "for1")?,
                body: self.decode_boxed(ast.body, &tag, "body")?,
            },
            "For" => RawKind::For {
                var: required(ast.for_, &tag, "For")?,
                init: self.decode_boxed(ast.for1, &tag, "for1")?,
                bound: self.decode_boxed(ast.for2, &tag, "for2")?,
                body: self.decode_boxed(ast.body, &tag, "body")?,
            },
            "IfElse" => RawKind::IfElse {
                cond: self.decode_boxed(ast.if_else, &tag, "IfElse")?,
                then_branch: self.decode_boxed(ast.then, &tag, "then")?,
                else_branch: self.decode_optional(ast.else_, &tag)?,
            },
            "App" => RawKind::App {
                callee: self.decode_boxed(ast.app, &tag, "App")?,
                args: self.decode_all(ast.args.unwrap_or_default(), &tag)?,
            },
            "VariableIntroduction" => RawKind::VariableIntroduction {
                name: required(ast.variable_introduction, &tag, "VariableIntroduction")?,
                init: self.decode_optional(ast.rhs, &tag)?,
            },
            "Function" => RawKind::Function {
                name: ast.function.filter(|name| !name.is_empty()),
                params: ast.params.unwrap_or_default(),
                body: self.decode_boxed(ast.body, &tag, "body")?,
            },
            "Unary" => RawKind::Unary {
                op: required(ast.op, &tag, "op")?,
                operand: self.decode_boxed(ast.unary, &tag, "Unary")?,
            },
            "Binary" => RawKind::Binary {
                op: required(ast.op, &tag, "op")?,
                left: self.decode_boxed(ast.binary, &tag, "Binary")?,
                right: self.decode_boxed(ast.rhs, &tag, "rhs")?,
            },
            "Comment" => {
                for comment in required(ast.comment, &tag, "Comment")? {
                    comments.push(decode_comment(comment)?);
                }
                RawKind::Comment {
                    decl: self.decode_optional(ast.decl, &tag)?,
                }
            }
            "ObjectLiteral" => {
                let mut fields = Vec::new();
                for entry in required(ast.object_literal, &tag, "ObjectLiteral")? {
                    for (key, value) in entry {
                        let value = self.decode(value, Some(&tag))?;
                        fields.push(ObjectField { key, value });
                    }
                }
                RawKind::ObjectLiteral(fields)
            }
            "ReturnNoResult" => RawKind::ReturnNoResult,
            "Return" => RawKind::Return(self.decode_boxed(ast.return_, &tag, "Return")?),
            "Throw" => RawKind::Throw(self.decode_boxed(ast.throw, &tag, "Throw")?),
            "ArrayLiteral" => {
                let elements = required(ast.array_literal, &tag, "ArrayLiteral")?;
                RawKind::ArrayLiteral(self.decode_all(elements, &tag)?)
            }
            "Assignment" => RawKind::Assignment {
                target: self.decode_boxed(ast.assignment, &tag, "Assignment")?,
                value: self.decode_boxed(ast.rhs, &tag, "rhs")?,
            },
            "Indexer" => RawKind::Indexer {
                base: self.decode_boxed(ast.indexer, &tag, "Indexer")?,
                key: self.decode_boxed(ast.rhs, &tag, "rhs")?,
            },
            "InstanceOf" => RawKind::InstanceOf {
                value: self.decode_boxed(ast.instance_of, &tag, "InstanceOf")?,
                ty: self.decode_boxed(ast.rhs, &tag, "rhs")?,
            },
            _ => {
                return Err(UnsupportedConstructError::UnknownTag {
                    tag,
                    parent: parent.map(str::to_string),
                }
                .into());
            }
        };

        Ok(self.module.nodes.alloc(RawNode {
            kind,
            comments,
            parent: None,
            module: None,
            span,
        }))
    }

    fn decode_boxed(
        &mut self,
        ast: Option<Box<RawAst>>,
        tag: &str,
        field: &str,
    ) -> Result<RawNodeId, TranslateError> {
        let ast = required(ast, tag, field)?;
        self.decode(*ast, Some(tag))
    }

    fn decode_optional(
        &mut self,
        ast: Option<Box<RawAst>>,
        tag: &str,
    ) -> Result<Option<RawNodeId>, TranslateError> {
        ast.map(|ast| self.decode(*ast, Some(tag))).transpose()
    }

    fn decode_all(
        &mut self,
        asts: Vec<RawAst>,
        tag: &str,
    ) -> Result<Vec<RawNodeId>, TranslateError> {
        asts.into_iter().map(|ast| self.decode(ast, Some(tag))).collect()
    }
}

fn decode_comment(comment: RawComment) -> Result<Comment, TranslateError> {
    match comment {
        RawComment { line: Some(text), .. } => Ok(Comment::Line(text)),
        RawComment { block: Some(text), .. } => Ok(Comment::Block(text)),
        RawComment { .. } => Err(mismatch("Comment", "comment without text".to_string())),
    }
}

fn required<T>(value: Option<T>, tag: &str, field: &str) -> Result<T, TranslateError> {
    value.ok_or_else(|| mismatch(tag, format!("missing field `{field}`")))
}

fn mismatch(tag: &str, detail: String) -> TranslateError {
    StructuralError::PayloadMismatch {
        tag: tag.to_string(),
        detail,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<RawModule, TranslateError> {
        decode_module(ModuleId(0), json)
    }

    #[test]
    fn test_decode_module_header() {
        let module = decode(
            r#"{
                "moduleName": "Data.Maybe",
                "exports": ["Just", "Nothing"],
                "imports": [["Prelude"], ["Data", "Functor"]],
                "body": []
            }"#,
        )
        .unwrap();

        assert_eq!(module.info.qualified_name, "Data.Maybe");
        assert!(module.is_exported("Just"));
        assert!(!module.is_exported("maybe"));
        assert_eq!(module.import_target("Data_Functor"), Some("Data.Functor"));
        assert_eq!(module.import_target("Prelude"), Some("Prelude"));
        assert!(module.body.is_empty());
    }

    #[test]
    fn test_decode_binary_payload() {
        let module = decode(
            r#"{
                "moduleName": "M",
                "body": [{
                    "tag": "VariableIntroduction",
                    "VariableIntroduction": "x",
                    "rhs": {
                        "tag": "Binary",
                        "op": "Add",
                        "Binary": {"tag": "NumericLiteral_Integer", "NumericLiteral_Integer": 1},
                        "rhs": {"tag": "Var", "Var": "y"}
                    }
                }]
            }"#,
        )
        .unwrap();

        let RawKind::VariableIntroduction {
            name,
            init: Some(init),
        } = module.kind(module.body[0])
        else {
            panic!("expected a variable introduction");
        };
        assert_eq!(name, "x");
        let RawKind::Binary { op, left, right } = module.kind(*init) else {
            panic!("expected a binary node");
        };
        assert_eq!(op, "Add");
        assert_eq!(module.kind(*left), &RawKind::IntegerLiteral(1));
        assert_eq!(module.kind(*right), &RawKind::Var("y".to_string()));
    }

    #[test]
    fn test_decode_comment_and_object_literal() {
        let module = decode(
            r#"{
                "moduleName": "M",
                "body": [{
                    "tag": "Comment",
                    "Comment": [{"LineComment": " doc"}],
                    "decl": {
                        "tag": "VariableIntroduction",
                        "VariableIntroduction": "point",
                        "rhs": {
                            "tag": "ObjectLiteral",
                            "ObjectLiteral": [
                                {"x": {"tag": "NumericLiteral_Double", "NumericLiteral_Double": 1.5}},
                                {"y": {"tag": "BooleanLiteral", "BooleanLiteral": true}}
                            ]
                        }
                    }
                }]
            }"#,
        )
        .unwrap();

        let wrapper = module.node(module.body[0]);
        assert_eq!(wrapper.comments, vec![Comment::Line(" doc".to_string())]);
        let RawKind::Comment { decl: Some(decl) } = wrapper.kind else {
            panic!("expected a comment wrapper");
        };
        let RawKind::VariableIntroduction { init: Some(init), .. } = module.kind(decl) else {
            panic!("expected a variable introduction");
        };
        let RawKind::ObjectLiteral(fields) = module.kind(*init) else {
            panic!("expected an object literal");
        };
        let keys: Vec<_> = fields.iter().map(|field| field.key.as_str()).collect();
        assert_eq!(keys, ["x", "y"]);
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let err = decode(
            r#"{"moduleName": "M", "body": [{"tag": "Function", "params": [], "body": {"tag": "Yield"}}]}"#,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TranslateError::Unsupported(UnsupportedConstructError::UnknownTag {
                tag: "Yield".to_string(),
                parent: Some("Function".to_string()),
            })
        );
    }

    #[test]
    fn test_missing_payload_is_structural() {
        let err = decode(
            r#"{"moduleName": "M", "body": [
                {"tag": "Binary", "op": "Add", "Binary": {"tag": "Var", "Var": "a"}}
            ]}"#,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TranslateError::Structural(StructuralError::PayloadMismatch {
                tag: "Binary".to_string(),
                detail: "missing field `rhs`".to_string(),
            })
        );
    }

    #[test]
    fn test_foreign_payload_is_structural() {
        let err = decode(
            r#"{"moduleName": "M", "body": [{"tag": "Var", "Var": "a", "op": "Add"}]}"#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TranslateError::Structural(StructuralError::PayloadMismatch { ref tag, .. })
                if tag == "Var"
        ));
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let err = decode(r#"{"moduleName": "M", "body": [}"#).unwrap_err();
        assert!(matches!(err, TranslateError::Decode(_)));
    }
}
