//! Generic Imperative Representation (GIR)
//!
//! GIR is the output of translation: a small closed set of imperative node
//! shapes that a target-language emitter can walk without knowing anything
//! about the upstream compiler. Each module owns one arena of nodes; every
//! node records its parent and the comments inherited from its source node.

pub mod ops;
pub mod pretty_print;

pub use cn_raw::Comment;
pub use ops::{BinaryOp, UnaryOp};
pub use pretty_print::pretty_print;

use cn_arena::{Arena, Idx};

/// GIR node IDs
pub type GirNodeId = Idx<GirNode>;

/// One GIR node
#[derive(Debug, Clone, PartialEq)]
pub struct GirNode {
    /// Node shape
    pub kind: GirKind,
    /// Comments inherited from the source node
    pub comments: Vec<Comment>,
    /// Enclosing node; `None` for top-level declarations
    pub parent: Option<GirNodeId>,
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String literal
    String(String),
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
}

/// Positional function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Zero-based position
    pub position: usize,
}

/// Type named on the right of a type check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTarget {
    /// A type declared in the current module
    Local(String),
    /// `alias.Name`, waiting for the module registry
    Pending {
        /// Module alias
        alias: String,
        /// Type name
        name: String,
    },
    /// Fully qualified type name, e.g. `Data.Maybe.Just`
    Qualified(String),
}

/// GIR node shapes
#[derive(Debug, Clone, PartialEq)]
pub enum GirKind {
    /// Literal value
    Literal(Literal),
    /// Reference to a named binding
    SymbolRef {
        /// Name
        name: String,
        /// Whether the owning module exports the name
        exported: bool,
    },
    /// Statement sequence
    Block(Vec<GirNodeId>),
    /// The single loop shape every upstream loop lowers to
    Loop {
        /// Binding introduced before the first iteration
        init: Option<GirNodeId>,
        /// Condition checked before every iteration
        cond: Option<GirNodeId>,
        /// Statement run after every iteration
        step: Option<GirNodeId>,
        /// Loop body block
        body: GirNodeId,
    },
    /// Conditional
    If {
        /// Condition
        cond: GirNodeId,
        /// Then block
        then_block: GirNodeId,
        /// Else block
        else_block: Option<GirNodeId>,
    },
    /// Function application
    Call {
        /// Callee
        callee: GirNodeId,
        /// Arguments
        args: Vec<GirNodeId>,
    },
    /// Variable binding
    Let {
        /// Bound name
        name: String,
        /// Type hint for the emitter
        type_hint: Option<String>,
        /// Initial value
        init: Option<GirNodeId>,
    },
    /// Assignment
    Assign {
        /// Assigned place
        target: GirNodeId,
        /// Assigned value
        value: GirNodeId,
    },
    /// Prefix operator
    UnaryOp {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: GirNodeId,
    },
    /// Infix operator
    BinaryOp {
        /// Left operand
        left: GirNodeId,
        /// Operator
        op: BinaryOp,
        /// Right operand
        right: GirNodeId,
    },
    /// Object literal; every child is a [`GirKind::Field`]
    ObjectLiteral(Vec<GirNodeId>),
    /// One `name: value` entry of an object literal
    Field {
        /// Field name
        name: String,
        /// Field value
        value: GirNodeId,
    },
    /// Array literal
    ArrayLiteral(Vec<GirNodeId>),
    /// Return from the enclosing function
    Return(Option<GirNodeId>),
    /// Abort with a value (upstream `throw`)
    Abort(GirNodeId),
    /// Computed index access `base[key]`
    Index {
        /// Indexed value
        base: GirNodeId,
        /// Key
        key: GirNodeId,
    },
    /// Static field access `base.field`
    FieldAccess {
        /// Accessed value
        base: GirNodeId,
        /// Field symbol (a [`GirKind::SymbolRef`])
        field: GirNodeId,
    },
    /// `value is Type`
    TypeCheck {
        /// Tested value
        value: GirNodeId,
        /// Tested type
        target: TypeTarget,
    },
    /// Function declaration or literal
    FuncDecl {
        /// Name, absent for anonymous literals
        name: Option<String>,
        /// Positional parameters
        params: Vec<Param>,
        /// Body block
        body: GirNodeId,
        /// Declared at module level under an uppercase name
        was_type_level: bool,
    },
    /// Free-standing comments; the text lives in [`GirNode::comments`]
    CommentGroup,
}

impl GirKind {
    /// Child node IDs in slot order
    pub fn children(&self) -> Vec<GirNodeId> {
        match self {
            Self::Literal(_) | Self::SymbolRef { .. } | Self::CommentGroup => Vec::new(),
            Self::Block(children)
            | Self::ObjectLiteral(children)
            | Self::ArrayLiteral(children) => children.clone(),
            Self::Loop {
                init,
                cond,
                step,
                body,
            } => init
                .iter()
                .chain(cond.iter())
                .chain(step.iter())
                .copied()
                .chain(std::iter::once(*body))
                .collect(),
            Self::If {
                cond,
                then_block,
                else_block,
            } => {
                let mut children = vec![*cond, *then_block];
                children.extend(*else_block);
                children
            }
            Self::Call { callee, args } => {
                let mut children = vec![*callee];
                children.extend(args.iter().copied());
                children
            }
            Self::Let { init, .. } | Self::Return(init) => init.iter().copied().collect(),
            Self::Assign { target, value } => vec![*target, *value],
            Self::UnaryOp { operand, .. } => vec![*operand],
            Self::BinaryOp { left, right, .. } => vec![*left, *right],
            Self::Field { value, .. } | Self::Abort(value) | Self::TypeCheck { value, .. } => {
                vec![*value]
            }
            Self::Index { base, key } => vec![*base, *key],
            Self::FieldAccess { base, field } => vec![*base, *field],
            Self::FuncDecl { body, .. } => vec![*body],
        }
    }
}

/// The GIR tree of one module
#[derive(Debug, Clone, PartialEq)]
pub struct GirModule {
    /// Qualified module name
    pub qualified_name: String,
    /// Node storage
    pub nodes: Arena<GirNode>,
    /// Top-level declarations
    pub body: Vec<GirNodeId>,
}

impl GirModule {
    /// Create an empty module tree
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            nodes: Arena::new(),
            body: Vec::new(),
        }
    }

    /// Allocate a node and adopt its children
    ///
    /// Children must already be allocated; their parent link is pointed at
    /// the new node, which moves any child previously owned elsewhere.
    pub fn alloc(&mut self, kind: GirKind, comments: Vec<Comment>) -> GirNodeId {
        let children = kind.children();
        let id = self.nodes.alloc(GirNode {
            kind,
            comments,
            parent: None,
        });
        for child in children {
            self.nodes[child].parent = Some(id);
        }
        id
    }

    /// Get a node by ID
    pub fn node(&self, id: GirNodeId) -> &GirNode {
        &self.nodes[id]
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, id: GirNodeId) -> &mut GirNode {
        &mut self.nodes[id]
    }

    /// Get a node's shape by ID
    pub fn kind(&self, id: GirNodeId) -> &GirKind {
        &self.nodes[id].kind
    }

    /// Visit every node reachable from the top level, parents before children
    pub fn walk(&self, mut visit: impl FnMut(GirNodeId, &GirNode)) {
        let mut stack: Vec<GirNodeId> = self.body.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            visit(id, node);
            stack.extend(node.kind.children().into_iter().rev());
        }
    }

    /// Every type check whose target is still [`TypeTarget::Pending`]
    pub fn pending_type_checks(&self) -> Vec<GirNodeId> {
        let mut pending = Vec::new();
        self.walk(|id, node| {
            if let GirKind::TypeCheck {
                target: TypeTarget::Pending { .. },
                ..
            } = node.kind
            {
                pending.push(id);
            }
        });
        pending
    }
}
