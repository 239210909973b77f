//! Raw core-imperative IR
//!
//! The upstream compiler dumps every module as a JSON document whose nodes
//! carry a `tag` plus a handful of tag-dependent sibling fields. This crate
//! holds the typed form of those documents: one closed variant per tag, each
//! with only the payload its tag owns, stored in a per-module arena.

pub mod decode;
pub mod error;

pub use decode::{RawDocument, decode_document, decode_module};
pub use error::{DecodeError, StructuralError, TranslateError, UnsupportedConstructError};

use cn_arena::{Arena, Idx};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw node IDs
pub type RawNodeId = Idx<RawNode>;

/// Unique ID for a module within one run
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ModuleId(pub u32);

/// Comment attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comment {
    /// `// text`
    Line(String),
    /// `/* text */`
    Block(String),
}

/// Location in the original source file, as reported upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Source file name
    pub name: String,
    /// Start `[line, column]`
    pub start: [u32; 2],
    /// End `[line, column]`
    pub end: [u32; 2],
}

/// One node of a raw tree
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    /// Tag-selected payload
    pub kind: RawKind,
    /// Comments attached to this node
    pub comments: Vec<Comment>,
    /// Enclosing node; `None` for top-level declarations
    pub parent: Option<RawNodeId>,
    /// Owning module, set by linking
    pub module: Option<ModuleId>,
    /// Source location
    pub span: Option<SourceSpan>,
}

impl RawNode {
    /// Create an unlinked node without comments
    pub fn new(kind: RawKind) -> Self {
        Self {
            kind,
            comments: Vec::new(),
            parent: None,
            module: None,
            span: None,
        }
    }
}

/// One `key: value` entry of an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    /// Property name
    pub key: String,
    /// Property value
    pub value: RawNodeId,
}

/// Raw node payloads, one variant per upstream tag
#[derive(Debug, Clone, PartialEq)]
pub enum RawKind {
    /// `"…"`
    StringLiteral(String),
    /// `true` / `false`
    BooleanLiteral(bool),
    /// Integer literal
    IntegerLiteral(i64),
    /// Floating point literal
    DoubleLiteral(f64),
    /// Bare identifier reference
    Var(String),
    /// `{ … }`
    Block(Vec<RawNodeId>),
    /// `while (cond) body`
    While {
        /// Loop condition
        cond: RawNodeId,
        /// Loop body
        body: RawNodeId,
    },
    /// `for (binder in source) body`
    ForIn {
        /// Range binder
        binder: String,
        /// Range source
        source: RawNodeId,
        /// Loop body
        body: RawNodeId,
    },
    /// `for (var = init; var < bound; var++) body`
    For {
        /// Loop variable
        var: String,
        /// Initial value
        init: RawNodeId,
        /// Exclusive upper bound
        bound: RawNodeId,
        /// Loop body
        body: RawNodeId,
    },
    /// `if (cond) then else`
    IfElse {
        /// Condition
        cond: RawNodeId,
        /// Then branch
        then_branch: RawNodeId,
        /// Else branch
        else_branch: Option<RawNodeId>,
    },
    /// `callee(args…)`
    App {
        /// Callee
        callee: RawNodeId,
        /// Arguments
        args: Vec<RawNodeId>,
    },
    /// `var name = init`
    VariableIntroduction {
        /// Variable name
        name: String,
        /// Initializer
        init: Option<RawNodeId>,
    },
    /// `function name(params…) body`
    Function {
        /// Name, absent for anonymous function literals
        name: Option<String>,
        /// Parameter names
        params: Vec<String>,
        /// Function body
        body: RawNodeId,
    },
    /// Prefix operator application
    Unary {
        /// Upstream operator name, e.g. `Negate`
        op: String,
        /// Operand
        operand: RawNodeId,
    },
    /// Infix operator application
    Binary {
        /// Upstream operator name, e.g. `Add`
        op: String,
        /// Left operand
        left: RawNodeId,
        /// Right operand
        right: RawNodeId,
    },
    /// Comment wrapper; the comment text lives in [`RawNode::comments`]
    Comment {
        /// Declaration the comments belong to
        decl: Option<RawNodeId>,
    },
    /// `{ key: value, … }`
    ObjectLiteral(Vec<ObjectField>),
    /// `return;`
    ReturnNoResult,
    /// `return value;`
    Return(RawNodeId),
    /// `throw value;`
    Throw(RawNodeId),
    /// `[ … ]`
    ArrayLiteral(Vec<RawNodeId>),
    /// `target = value`
    Assignment {
        /// Assigned place
        target: RawNodeId,
        /// Assigned value
        value: RawNodeId,
    },
    /// `base[key]`
    Indexer {
        /// Indexed value
        base: RawNodeId,
        /// Key
        key: RawNodeId,
    },
    /// `value instanceof ty`
    InstanceOf {
        /// Tested value
        value: RawNodeId,
        /// Type operand
        ty: RawNodeId,
    },
}

impl RawKind {
    /// Upstream tag name of this node
    pub fn tag(&self) -> &'static str {
        match self {
            Self::StringLiteral(_) => "StringLiteral",
            Self::BooleanLiteral(_) => "BooleanLiteral",
            Self::IntegerLiteral(_) => "NumericLiteral_Integer",
            Self::DoubleLiteral(_) => "NumericLiteral_Double",
            Self::Var(_) => "Var",
            Self::Block(_) => "Block",
            Self::While { .. } => "While",
            Self::ForIn { .. } => "ForIn",
            Self::For { .. } => "For",
            Self::IfElse { .. } => "IfElse",
            Self::App { .. } => "App",
            Self::VariableIntroduction { .. } => "VariableIntroduction",
            Self::Function { .. } => "Function",
            Self::Unary { .. } => "Unary",
            Self::Binary { .. } => "Binary",
            Self::Comment { .. } => "Comment",
            Self::ObjectLiteral(_) => "ObjectLiteral",
            Self::ReturnNoResult => "ReturnNoResult",
            Self::Return(_) => "Return",
            Self::Throw(_) => "Throw",
            Self::ArrayLiteral(_) => "ArrayLiteral",
            Self::Assignment { .. } => "Assignment",
            Self::Indexer { .. } => "Indexer",
            Self::InstanceOf { .. } => "InstanceOf",
        }
    }

    /// Child node IDs in slot order
    pub fn children(&self) -> Vec<RawNodeId> {
        match self {
            Self::StringLiteral(_)
            | Self::BooleanLiteral(_)
            | Self::IntegerLiteral(_)
            | Self::DoubleLiteral(_)
            | Self::Var(_)
            | Self::ReturnNoResult => Vec::new(),
            Self::Block(stmts) | Self::ArrayLiteral(stmts) => stmts.clone(),
            Self::While { cond, body } => vec![*cond, *body],
            Self::ForIn { source, body, .. } => vec![*source, *body],
            Self::For {
                init, bound, body, ..
            } => vec![*init, *bound, *body],
            Self::IfElse {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut children = vec![*cond, *then_branch];
                children.extend(*else_branch);
                children
            }
            Self::App { callee, args } => {
                let mut children = vec![*callee];
                children.extend(args.iter().copied());
                children
            }
            Self::VariableIntroduction { init, .. } => init.iter().copied().collect(),
            Self::Function { body, .. } => vec![*body],
            Self::Unary { operand, .. } => vec![*operand],
            Self::Binary { left, right, .. } => vec![*left, *right],
            Self::Comment { decl } => decl.iter().copied().collect(),
            Self::ObjectLiteral(fields) => fields.iter().map(|field| field.value).collect(),
            Self::Return(value) | Self::Throw(value) => vec![*value],
            Self::Assignment { target, value } => vec![*target, *value],
            Self::Indexer { base, key } => vec![*base, *key],
            Self::InstanceOf { value, ty } => vec![*value, *ty],
        }
    }

    /// Mutable references to every structural child slot, in slot order
    pub fn children_mut(&mut self) -> Vec<&mut RawNodeId> {
        match self {
            Self::StringLiteral(_)
            | Self::BooleanLiteral(_)
            | Self::IntegerLiteral(_)
            | Self::DoubleLiteral(_)
            | Self::Var(_)
            | Self::ReturnNoResult => Vec::new(),
            Self::Block(stmts) | Self::ArrayLiteral(stmts) => stmts.iter_mut().collect(),
            Self::While { cond, body } => vec![cond, body],
            Self::ForIn { source, body, .. } => vec![source, body],
            Self::For {
                init, bound, body, ..
            } => vec![init, bound, body],
            Self::IfElse {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut slots = vec![cond, then_branch];
                slots.extend(else_branch.as_mut());
                slots
            }
            Self::App { callee, args } => {
                let mut slots = vec![callee];
                slots.extend(args.iter_mut());
                slots
            }
            Self::VariableIntroduction { init, .. } => init.iter_mut().collect(),
            Self::Function { body, .. } => vec![body],
            Self::Unary { operand, .. } => vec![operand],
            Self::Binary { left, right, .. } => vec![left, right],
            Self::Comment { decl } => decl.iter_mut().collect(),
            Self::ObjectLiteral(fields) => {
                fields.iter_mut().map(|field| &mut field.value).collect()
            }
            Self::Return(value) | Self::Throw(value) => vec![value],
            Self::Assignment { target, value } => vec![target, value],
            Self::Indexer { base, key } => vec![base, key],
            Self::InstanceOf { value, ty } => vec![value, ty],
        }
    }

    /// Mutable references to every identifier-bearing slot
    pub fn identifiers_mut(&mut self) -> Vec<&mut String> {
        match self {
            Self::Var(name)
            | Self::ForIn { binder: name, .. }
            | Self::For { var: name, .. }
            | Self::VariableIntroduction { name, .. } => vec![name],
            Self::Function { name, params, .. } => {
                let mut slots: Vec<&mut String> = name.iter_mut().collect();
                slots.extend(params.iter_mut());
                slots
            }
            Self::ObjectLiteral(fields) => fields.iter_mut().map(|field| &mut field.key).collect(),
            _ => Vec::new(),
        }
    }

    /// The value of a string literal
    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Self::StringLiteral(value) => Some(value),
            _ => None,
        }
    }

    /// The identifier of a bare variable reference
    pub fn as_var(&self) -> Option<&str> {
        match self {
            Self::Var(name) => Some(name),
            _ => None,
        }
    }
}

/// An `import` of another module, under the alias the generated code uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportAlias {
    /// Variable name the module is bound to, e.g. `Data_Maybe`
    pub alias: String,
    /// Qualified module name, e.g. `Data.Maybe`
    pub module: String,
}

/// Project-level facts about a module
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleInfo {
    /// Qualified module name, e.g. `Data.Maybe`
    pub qualified_name: String,
    /// Names the module exports
    pub exports: BTreeSet<String>,
}

/// One decoded module
#[derive(Debug, Clone, PartialEq)]
pub struct RawModule {
    /// Module ID
    pub id: ModuleId,
    /// Qualified name and exports
    pub info: ModuleInfo,
    /// Declared imports
    pub imports: Vec<ImportAlias>,
    /// Foreign `require` aliases found by normalization (alias → path)
    pub requires: IndexMap<String, String>,
    /// Node storage
    pub nodes: Arena<RawNode>,
    /// Top-level declarations
    pub body: Vec<RawNodeId>,
}

impl RawModule {
    /// Create an empty module
    pub fn new(id: ModuleId, info: ModuleInfo) -> Self {
        Self {
            id,
            info,
            imports: Vec::new(),
            requires: IndexMap::new(),
            nodes: Arena::new(),
            body: Vec::new(),
        }
    }

    /// Allocate an unlinked node
    pub fn alloc(&mut self, kind: RawKind) -> RawNodeId {
        self.nodes.alloc(RawNode::new(kind))
    }

    /// Get a node by ID
    pub fn node(&self, id: RawNodeId) -> &RawNode {
        &self.nodes[id]
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, id: RawNodeId) -> &mut RawNode {
        &mut self.nodes[id]
    }

    /// Get a node's payload by ID
    pub fn kind(&self, id: RawNodeId) -> &RawKind {
        &self.nodes[id].kind
    }

    /// Whether `name` is in this module's export set
    pub fn is_exported(&self, name: &str) -> bool {
        self.info.exports.contains(name)
    }

    /// Qualified module name bound to an import alias
    pub fn import_target(&self, alias: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|import| import.alias == alias)
            .map(|import| import.module.as_str())
    }
}
