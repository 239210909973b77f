//! Human-readable GIR dump
//!
//! Used for snapshot tests and debugging; the output is not meant to be
//! valid code in any language. Exported symbols are prefixed with `@`,
//! unresolved qualified types with `?`. Comments are only shown on
//! statements.

use crate::{Comment, GirKind, GirModule, GirNodeId, Literal, TypeTarget};

const INDENT: &str = "  ";

/// Render a whole module
pub fn pretty_print(module: &GirModule) -> String {
    let mut printer = Printer::new(module, 0);
    printer.line(&format!("module {}", module.qualified_name));
    for &id in &module.body {
        printer.stmt(id);
    }
    printer.out
}

struct Printer<'a> {
    module: &'a GirModule,
    out: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn new(module: &'a GirModule, indent: usize) -> Self {
        Self {
            module,
            out: String::new(),
            indent,
        }
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(&INDENT.repeat(self.indent));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn stmt(&mut self, id: GirNodeId) {
        let module = self.module;
        let node = module.node(id);
        for comment in &node.comments {
            match comment {
                Comment::Line(text) => self.line(&format!("//{text}")),
                Comment::Block(text) => self.line(&format!("/*{text}*/")),
            }
        }

        match &node.kind {
            GirKind::CommentGroup => {}
            GirKind::Block(children) => {
                self.line("{");
                self.nested(children);
                self.line("}");
            }
            GirKind::Loop {
                init,
                cond,
                step,
                body,
            } => {
                let header = [init, cond, step]
                    .map(|slot| slot.map_or_else(|| "_".to_string(), |id| self.expr(id)))
                    .join("; ");
                self.line(&format!("for {header} {{"));
                self.block_body(*body);
                self.line("}");
            }
            GirKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.expr(*cond);
                self.line(&format!("if {cond} {{"));
                self.block_body(*then_block);
                if let Some(else_block) = else_block {
                    self.line("} else {");
                    self.block_body(*else_block);
                }
                self.line("}");
            }
            GirKind::FuncDecl {
                name,
                params,
                body,
                was_type_level,
            } => {
                let params: Vec<&str> = params.iter().map(|param| param.name.as_str()).collect();
                let keyword = if *was_type_level { "type func" } else { "func" };
                let name = name.as_deref().map(|name| format!(" {name}")).unwrap_or_default();
                self.line(&format!("{keyword}{name}({}) {{", params.join(", ")));
                self.block_body(*body);
                self.line("}");
            }
            _ => {
                let text = self.expr(id);
                self.line(&text);
            }
        }
    }

    fn nested(&mut self, children: &[GirNodeId]) {
        self.indent += 1;
        for &child in children {
            self.stmt(child);
        }
        self.indent -= 1;
    }

    fn block_body(&mut self, id: GirNodeId) {
        let module = self.module;
        match module.kind(id) {
            GirKind::Block(children) => self.nested(children),
            _ => self.nested(&[id]),
        }
    }

    fn exprs(&self, ids: &[GirNodeId]) -> String {
        ids.iter()
            .map(|&id| self.expr(id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expr(&self, id: GirNodeId) -> String {
        match self.module.kind(id) {
            GirKind::Literal(Literal::String(value)) => format!("{value:?}"),
            GirKind::Literal(Literal::Bool(value)) => value.to_string(),
            GirKind::Literal(Literal::Int(value)) => value.to_string(),
            GirKind::Literal(Literal::Float(value)) => format!("{value:?}"),
            GirKind::SymbolRef { name, exported } => {
                if *exported {
                    format!("@{name}")
                } else {
                    name.clone()
                }
            }
            GirKind::Let {
                name,
                type_hint,
                init,
            } => {
                let hint = type_hint.as_ref().map(|hint| format!(": {hint}")).unwrap_or_default();
                let init = init.map(|init| format!(" = {}", self.expr(init))).unwrap_or_default();
                format!("let {name}{hint}{init}")
            }
            GirKind::Assign { target, value } => {
                format!("{} = {}", self.expr(*target), self.expr(*value))
            }
            GirKind::UnaryOp { op, operand } => format!("({}{})", op.token(), self.expr(*operand)),
            GirKind::BinaryOp { left, op, right } => {
                format!("({} {} {})", self.expr(*left), op.token(), self.expr(*right))
            }
            GirKind::Call { callee, args } => {
                format!("{}({})", self.expr(*callee), self.exprs(args))
            }
            GirKind::ObjectLiteral(fields) => format!("{{{}}}", self.exprs(fields)),
            GirKind::Field { name, value } => format!("{name}: {}", self.expr(*value)),
            GirKind::ArrayLiteral(elements) => format!("[{}]", self.exprs(elements)),
            GirKind::Return(None) => "return".to_string(),
            GirKind::Return(Some(value)) => format!("return {}", self.expr(*value)),
            GirKind::Abort(value) => format!("abort {}", self.expr(*value)),
            GirKind::Index { base, key } => format!("{}[{}]", self.expr(*base), self.expr(*key)),
            GirKind::FieldAccess { base, field } => {
                format!("{}.{}", self.expr(*base), self.expr(*field))
            }
            GirKind::TypeCheck { value, target } => {
                let target = match target {
                    TypeTarget::Local(name) | TypeTarget::Qualified(name) => name.clone(),
                    TypeTarget::Pending { alias, name } => format!("?{alias}.{name}"),
                };
                format!("({} is {target})", self.expr(*value))
            }
            GirKind::Block(_)
            | GirKind::Loop { .. }
            | GirKind::If { .. }
            | GirKind::FuncDecl { .. }
            | GirKind::CommentGroup => {
                let mut inner = Printer::new(self.module, self.indent);
                inner.stmt(id);
                inner.out.trim().to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryOp, Param};
    use expect_test::expect;

    #[test]
    fn test_pretty_print_function_with_loop() {
        let mut module = GirModule::new("Main");
        let sym = |module: &mut GirModule, name: &str, exported: bool| {
            module.alloc(
                GirKind::SymbolRef {
                    name: name.to_string(),
                    exported,
                },
                Vec::new(),
            )
        };

        let zero = module.alloc(GirKind::Literal(Literal::Int(0)), Vec::new());
        let init = module.alloc(
            GirKind::Let {
                name: "i".to_string(),
                type_hint: None,
                init: Some(zero),
            },
            Vec::new(),
        );
        let i_cond = sym(&mut module, "i", false);
        let n = sym(&mut module, "n", false);
        let cond = module.alloc(
            GirKind::BinaryOp {
                left: i_cond,
                op: BinaryOp::LessThan,
                right: n,
            },
            Vec::new(),
        );
        let i_target = sym(&mut module, "i", false);
        let i_value = sym(&mut module, "i", false);
        let one = module.alloc(GirKind::Literal(Literal::Int(1)), Vec::new());
        let next = module.alloc(
            GirKind::BinaryOp {
                left: i_value,
                op: BinaryOp::Add,
                right: one,
            },
            Vec::new(),
        );
        let step = module.alloc(
            GirKind::Assign {
                target: i_target,
                value: next,
            },
            Vec::new(),
        );
        let log = sym(&mut module, "log", false);
        let i_arg = sym(&mut module, "i", false);
        let call = module.alloc(
            GirKind::Call {
                callee: log,
                args: vec![i_arg],
            },
            Vec::new(),
        );
        let loop_body = module.alloc(GirKind::Block(vec![call]), Vec::new());
        let for_loop = module.alloc(
            GirKind::Loop {
                init: Some(init),
                cond: Some(cond),
                step: Some(step),
                body: loop_body,
            },
            Vec::new(),
        );
        let answer = sym(&mut module, "answer", true);
        let ret = module.alloc(GirKind::Return(Some(answer)), Vec::new());
        let body = module.alloc(GirKind::Block(vec![for_loop, ret]), Vec::new());
        let main = module.alloc(
            GirKind::FuncDecl {
                name: Some("main".to_string()),
                params: vec![Param {
                    name: "n".to_string(),
                    position: 0,
                }],
                body,
                was_type_level: false,
            },
            vec![Comment::Line(" entry point".to_string())],
        );
        module.body.push(main);

        expect![[r#"
            module Main
            // entry point
            func main(n) {
              for let i = 0; (i < n); i = (i + 1) {
                log(i)
              }
              return @answer
            }
        "#]]
        .assert_eq(&pretty_print(&module));
    }

    #[test]
    fn test_pretty_print_type_targets() {
        let mut module = GirModule::new("Main");
        let value = module.alloc(
            GirKind::SymbolRef {
                name: "v".to_string(),
                exported: false,
            },
            Vec::new(),
        );
        let check = module.alloc(
            GirKind::TypeCheck {
                value,
                target: TypeTarget::Pending {
                    alias: "Data_Maybe".to_string(),
                    name: "Just".to_string(),
                },
            },
            Vec::new(),
        );
        module.body.push(check);

        assert_eq!(pretty_print(&module), "module Main\n(v is ?Data_Maybe.Just)\n");
    }

    #[test]
    fn test_pretty_print_let_forms() {
        let mut module = GirModule::new("Main");
        let declared = module.alloc(
            GirKind::Let {
                name: "pending".to_string(),
                type_hint: None,
                init: None,
            },
            Vec::new(),
        );
        let limit = module.alloc(GirKind::Literal(Literal::Int(10)), Vec::new());
        let hinted = module.alloc(
            GirKind::Let {
                name: "limit".to_string(),
                type_hint: Some("int".to_string()),
                init: Some(limit),
            },
            vec![Comment::Block(" upper bound ".to_string())],
        );
        module.body.extend([declared, hinted]);

        expect![[r#"
            module Main
            let pending
            /* upper bound */
            let limit: int = 10
        "#]]
        .assert_eq(&pretty_print(&module));
    }
}
