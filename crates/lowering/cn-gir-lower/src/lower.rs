//! Tag-dispatched lowering

use cn_gir::{BinaryOp, GirKind, GirModule, GirNodeId, Literal, Param, TypeTarget, UnaryOp};
use cn_raw::{
    Comment, RawKind, RawModule, RawNodeId, StructuralError, TranslateError,
    UnsupportedConstructError,
};

/// Lower a normalized module
pub fn lower_module(raw: &RawModule) -> Result<GirModule, TranslateError> {
    let _span = tracing::debug_span!("lower", module = %raw.info.qualified_name).entered();
    let mut ctx = LoweringContext::new(raw);
    for &id in &raw.body {
        let lowered = ctx.lower(id)?;
        ctx.gir.body.push(lowered);
    }
    Ok(ctx.finish())
}

/// Context for lowering one raw module
pub struct LoweringContext<'raw> {
    /// Module being lowered
    raw: &'raw RawModule,
    /// Tree being built
    gir: GirModule,
}

impl<'raw> LoweringContext<'raw> {
    /// Create a context with an empty GIR tree
    pub fn new(raw: &'raw RawModule) -> Self {
        Self {
            raw,
            gir: GirModule::new(raw.info.qualified_name.clone()),
        }
    }

    /// Take the finished tree
    pub fn finish(self) -> GirModule {
        self.gir
    }

    /// Lower one raw node into exactly one GIR node
    pub fn lower(&mut self, id: RawNodeId) -> Result<GirNodeId, TranslateError> {
        let raw = self.raw;
        let node = raw.node(id);

        let kind = match &node.kind {
            RawKind::StringLiteral(value) => GirKind::Literal(Literal::String(value.clone())),
            RawKind::BooleanLiteral(value) => GirKind::Literal(Literal::Bool(*value)),
            RawKind::IntegerLiteral(value) => GirKind::Literal(Literal::Int(*value)),
            RawKind::DoubleLiteral(value) => GirKind::Literal(Literal::Float(*value)),
            RawKind::Var(name) => self.symbol_kind(name),
            RawKind::Block(_) => return self.lower_block(id),

            RawKind::While { cond, body } => GirKind::Loop {
                init: None,
                cond: Some(self.lower(*cond)?),
                step: None,
                body: self.lower_block(*body)?,
            },
            RawKind::ForIn {
                binder,
                source,
                body,
            } => {
                let source = self.lower(*source)?;
                let init = self.alloc(GirKind::Let {
                    name: binder.clone(),
                    type_hint: None,
                    init: Some(source),
                });
                GirKind::Loop {
                    init: Some(init),
                    cond: None,
                    step: None,
                    body: self.lower_block(*body)?,
                }
            }
            RawKind::For {
                var,
                init,
                bound,
                body,
            } => {
                let start = self.lower(*init)?;
                let init = self.alloc(GirKind::Let {
                    name: var.clone(),
                    type_hint: None,
                    init: Some(start),
                });

                let counter = self.symbol(var);
                let bound = self.lower(*bound)?;
                let cond = self.alloc(GirKind::BinaryOp {
                    left: counter,
                    op: BinaryOp::LessThan,
                    right: bound,
                });

                let target = self.symbol(var);
                let current = self.symbol(var);
                let one = self.alloc(GirKind::Literal(Literal::Int(1)));
                let next = self.alloc(GirKind::BinaryOp {
                    left: current,
                    op: BinaryOp::Add,
                    right: one,
                });
                let step = self.alloc(GirKind::Assign { target, value: next });

                GirKind::Loop {
                    init: Some(init),
                    cond: Some(cond),
                    step: Some(step),
                    body: self.lower_block(*body)?,
                }
            }
            RawKind::IfElse {
                cond,
                then_branch,
                else_branch,
            } => GirKind::If {
                cond: self.lower(*cond)?,
                then_block: self.lower_block(*then_branch)?,
                else_block: else_branch.map(|branch| self.lower_block(branch)).transpose()?,
            },

            RawKind::App { callee, args } => GirKind::Call {
                callee: self.lower(*callee)?,
                args: self.lower_all(args)?,
            },
            RawKind::VariableIntroduction { name, init } => GirKind::Let {
                name: name.clone(),
                type_hint: None,
                init: init.map(|init| self.lower(init)).transpose()?,
            },
            RawKind::Function { name, params, body } => GirKind::FuncDecl {
                name: name.clone(),
                params: params
                    .iter()
                    .enumerate()
                    .map(|(position, name)| Param {
                        name: name.clone(),
                        position,
                    })
                    .collect(),
                body: self.lower_block(*body)?,
                was_type_level: node.parent.is_none()
                    && name
                        .as_deref()
                        .and_then(|name| name.chars().next())
                        .is_some_and(char::is_uppercase),
            },

            RawKind::Unary { op, operand } => {
                let op = UnaryOp::from_name(op).ok_or_else(|| {
                    UnsupportedConstructError::UnknownUnaryOperator { op: op.clone() }
                })?;
                GirKind::UnaryOp {
                    op,
                    operand: self.lower(*operand)?,
                }
            }
            RawKind::Binary { op, left, right } => {
                let op = BinaryOp::from_name(op).ok_or_else(|| {
                    UnsupportedConstructError::UnknownBinaryOperator { op: op.clone() }
                })?;
                GirKind::BinaryOp {
                    left: self.lower(*left)?,
                    op,
                    right: self.lower(*right)?,
                }
            }

            RawKind::Comment { decl: None } => GirKind::CommentGroup,
            // Normalization unwraps these; lowering an unnormalized tree keeps the comments.
            RawKind::Comment { decl: Some(decl) } => {
                let lowered = self.lower(*decl)?;
                let target = self.gir.node_mut(lowered);
                let mut comments = node.comments.clone();
                comments.append(&mut target.comments);
                target.comments = comments;
                return Ok(lowered);
            }

            RawKind::ObjectLiteral(fields) => {
                let mut lowered = Vec::with_capacity(fields.len());
                for field in fields {
                    let value = self.lower(field.value)?;
                    lowered.push(self.alloc(GirKind::Field {
                        name: field.key.clone(),
                        value,
                    }));
                }
                GirKind::ObjectLiteral(lowered)
            }
            RawKind::ArrayLiteral(elements) => GirKind::ArrayLiteral(self.lower_all(elements)?),
            RawKind::ReturnNoResult => GirKind::Return(None),
            RawKind::Return(value) => GirKind::Return(Some(self.lower(*value)?)),
            RawKind::Throw(value) => GirKind::Abort(self.lower(*value)?),
            RawKind::Assignment { target, value } => GirKind::Assign {
                target: self.lower(*target)?,
                value: self.lower(*value)?,
            },

            // A string key is taken to be a static field. Object literals used
            // as dictionaries with literal keys end up as field accesses too.
            RawKind::Indexer { base, key } => match raw.kind(*key).as_string_literal() {
                Some(field) => {
                    let base = self.lower(*base)?;
                    let kind = self.symbol_kind(field);
                    let field = self
                        .gir
                        .alloc(kind, raw.node(*key).comments.clone());
                    GirKind::FieldAccess { base, field }
                }
                None => GirKind::Index {
                    base: self.lower(*base)?,
                    key: self.lower(*key)?,
                },
            },

            RawKind::InstanceOf { value, ty } => GirKind::TypeCheck {
                value: self.lower(*value)?,
                target: self.type_target(*ty)?,
            },
        };

        Ok(self.gir.alloc(kind, node.comments.clone()))
    }

    /// Lower a body into a block
    ///
    /// A raw block is spliced: its statements become the children of the new
    /// block, which takes over the raw block's comments. Anything else becomes
    /// the only child.
    pub fn lower_block(&mut self, id: RawNodeId) -> Result<GirNodeId, TranslateError> {
        let raw = self.raw;
        let node = raw.node(id);
        match &node.kind {
            RawKind::Block(stmts) => {
                let children = self.lower_all(stmts)?;
                Ok(self.gir.alloc(GirKind::Block(children), node.comments.clone()))
            }
            _ => {
                let only = self.lower(id)?;
                Ok(self.alloc(GirKind::Block(vec![only])))
            }
        }
    }

    fn lower_all(&mut self, ids: &[RawNodeId]) -> Result<Vec<GirNodeId>, TranslateError> {
        ids.iter().map(|&id| self.lower(id)).collect()
    }

    fn type_target(&self, ty: RawNodeId) -> Result<TypeTarget, TranslateError> {
        let raw = self.raw;
        match raw.kind(ty) {
            RawKind::Var(name) => Ok(TypeTarget::Local(name.clone())),
            RawKind::Indexer { base, key } => {
                match (raw.kind(*base).as_var(), raw.kind(*key).as_string_literal()) {
                    (Some(alias), Some(name)) => Ok(TypeTarget::Pending {
                        alias: alias.to_string(),
                        name: name.to_string(),
                    }),
                    _ => {
                        Err(StructuralError::UnsupportedTypeCheckOperand { tag: "Indexer" }.into())
                    }
                }
            }
            other => Err(StructuralError::UnsupportedTypeCheckOperand { tag: other.tag() }.into()),
        }
    }

    fn symbol_kind(&self, name: &str) -> GirKind {
        GirKind::SymbolRef {
            name: name.to_string(),
            exported: self.raw.is_exported(name),
        }
    }

    /// A fresh symbol node with no comments
    fn symbol(&mut self, name: &str) -> GirNodeId {
        let kind = self.symbol_kind(name);
        self.alloc(kind)
    }

    fn alloc(&mut self, kind: GirKind) -> GirNodeId {
        self.gir.alloc(kind, Vec::<Comment>::new())
    }
}
