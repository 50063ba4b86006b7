use super::{
    codegen::{PRECEDENCE_ATOM, emit_indent, emit_literal},
    flow::{BlockStack, Jump},
};
use crate::{
    error::{CompileError, Location, Result, bail},
    shader::CompiledShader,
};
use shadermake_core::{Callable, Instruction, Literal, Operator, Registry, Type};
use std::{collections::HashMap, fmt::Write, sync::Arc};

/// Walks an instruction stream with a symbolic operand stack and emits one statement per
/// side-effecting instruction.
pub(super) struct Evaluator<'a> {
    registry: &'a Registry,
    bound_shaders: &'a [Arc<CompiledShader>],

    env: Environment,
    stack: Vec<StackValue<'a>>,
    blocks: BlockStack,
    lines: Vec<String>,
}

/// Result of evaluating a function body.
pub(super) struct Lowered {
    pub lines: Vec<String>,
    /// `None` if the body never returns.
    pub return_type: Option<Type>,
}

/// Variable types, fixed at first write, and the return type fixed at first return.
#[derive(Default)]
struct Environment {
    vars: HashMap<String, Type>,
    ret: Option<Type>,
}

enum StackValue<'a> {
    Operand(Operand),
    Callable(&'a dyn Callable),
}

struct Operand {
    ty: Type,
    expr: String,
    precedence: u8,
}

impl Operand {
    fn atom(ty: Type, expr: String) -> Self {
        Self {
            ty,
            expr,
            precedence: PRECEDENCE_ATOM,
        }
    }

    fn binary(op: Operator, ty: Type, left: Operand, right: Operand) -> Self {
        let precedence = op.precedence();
        let left = match left.precedence < precedence {
            true => format!("({})", left.expr),
            false => left.expr,
        };
        let right = match right.precedence <= precedence {
            true => format!("({})", right.expr),
            false => right.expr,
        };

        Self {
            ty,
            expr: format!("{} {} {}", left, op, right),
            precedence,
        }
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a Registry, bound_shaders: &'a [Arc<CompiledShader>]) -> Self {
        Self {
            registry,
            bound_shaders,
            env: Environment::default(),
            stack: Vec::new(),
            blocks: BlockStack::default(),
            lines: Vec::new(),
        }
    }

    /// Make `name` known with type `ty` before evaluation, so that the body assigns to it without declaring it.
    pub fn declare(&mut self, name: &str, ty: Type) {
        self.env.vars.insert(name.to_owned(), ty);
    }

    pub fn run(mut self, body: &[Instruction]) -> Result<Lowered> {
        for (at, instruction) in body.iter().enumerate() {
            self.close_blocks(at)?;
            tracing::trace!(at, ?instruction, depth = self.blocks.depth(), "evaluate");
            self.step(at, instruction, body.len())?;
        }

        self.close_blocks(body.len())?;
        if !self.blocks.is_empty() {
            bail!(MalformedControlFlow, Location::End, "unterminated conditional block");
        }

        if !self.stack.is_empty() {
            bail!(
                MalformedControlFlow,
                Location::End,
                "{} value(s) left on the operand stack",
                self.stack.len()
            );
        }

        Ok(Lowered {
            lines: self.lines,
            return_type: self.env.ret,
        })
    }

    fn step(&mut self, at: usize, instruction: &Instruction, len: usize) -> Result<()> {
        match instruction {
            Instruction::PushConst(literal) => {
                let operand = self.literal(at, literal)?;
                self.stack.push(StackValue::Operand(operand));
            }

            Instruction::LoadLocal(name) => {
                let Some(ty) = self.env.vars.get(name).copied() else {
                    return Err(unknown(at, name, "unknown variable"));
                };
                self.stack.push(StackValue::Operand(Operand::atom(ty, name.clone())));
            }

            Instruction::LoadName(name) => match self.env.vars.get(name).copied() {
                Some(ty) => self.stack.push(StackValue::Operand(Operand::atom(ty, name.clone()))),
                None => {
                    let callable = self.callable(at, name)?;
                    self.stack.push(StackValue::Callable(callable));
                }
            },

            Instruction::LoadGlobal(name) => {
                let callable = self.callable(at, name)?;
                self.stack.push(StackValue::Callable(callable));
            }

            Instruction::StoreLocal(name) => {
                let value = self.pop_operand(at)?;
                self.store(name, value);
            }

            Instruction::Binary(op) => {
                let right = self.pop_operand(at)?;
                let left = self.pop_operand(at)?;
                let ty = self
                    .registry
                    .types
                    .result_type(*op, left.ty, right.ty)
                    .map_err(|err| CompileError::TypeMismatch {
                        location: Location::Instruction(at),
                        message: err.to_string(),
                    })?;

                self.stack
                    .push(StackValue::Operand(Operand::binary(*op, ty, left, right)));
            }

            Instruction::Call(count) => self.call(at, *count)?,

            Instruction::Pop => {
                let value = self.pop_operand(at)?;
                self.emit(format_args!("{};", value.expr));
            }

            Instruction::Return => self.ret(at)?,

            Instruction::JumpIfFalse(target) => {
                let condition = self.pop_operand(at)?;
                if condition.ty != self.registry.prim.boolean {
                    bail!(
                        TypeMismatch,
                        Location::Instruction(at),
                        "condition `{}` has type `{}`, expected `bool`",
                        condition.expr,
                        self.type_name(condition.ty)
                    );
                }

                self.expect_empty_stack(at)?;
                self.blocks.open(at, *target, len)?;
                self.emit_at(self.blocks.depth() - 1, format_args!("if ({}) {{", condition.expr));
            }

            Instruction::Jump(target) => {
                self.expect_empty_stack(at)?;
                if self.blocks.jump(at, *target, len)? == Jump::Else {
                    self.emit_at(self.blocks.depth() - 1, format_args!("}} else {{"));
                }
            }
        }

        Ok(())
    }

    fn literal(&self, at: usize, literal: &Literal) -> Result<Operand> {
        let ty = match literal {
            Literal::Int(x) if i32::try_from(*x).is_err() => bail!(
                UnsupportedInstruction,
                Location::Instruction(at),
                "integer constant {} does not fit a 32-bit `int`",
                x
            ),
            Literal::Int(_) => self.registry.prim.int,
            Literal::Float(_) => self.registry.prim.float,
            _ => bail!(
                UnsupportedInstruction,
                Location::Instruction(at),
                "only integer and float constants are supported, found {:?}",
                literal
            ),
        };

        match emit_literal(literal) {
            Some(text) => Ok(Operand::atom(ty, text)),
            None => bail!(
                UnsupportedInstruction,
                Location::Instruction(at),
                "constant {:?} has no shader representation",
                literal
            ),
        }
    }

    /// Bound shaders shadow built-in functions of the same name.
    fn callable(&self, at: usize, name: &str) -> Result<&'a dyn Callable> {
        let bound_shaders: &'a [Arc<CompiledShader>] = self.bound_shaders;
        if let Some(shader) = bound_shaders.iter().find(|shader| shader.name() == name) {
            return Ok(&**shader);
        }

        let registry: &'a Registry = self.registry;
        match registry.functions.resolve(name) {
            Some(overload) => Ok(overload),
            None => Err(unknown(at, name, "unauthorized function")),
        }
    }

    fn store(&mut self, name: &str, value: Operand) {
        match self.env.vars.get(name).copied() {
            Some(declared) => {
                if declared != value.ty {
                    tracing::warn!(
                        variable = name,
                        declared = self.type_name(declared),
                        assigned = self.type_name(value.ty),
                        "variable re-assigned with a different type, keeping the declared type"
                    );
                }

                self.emit(format_args!("{} = {};", name, value.expr));
            }
            None => {
                self.env.vars.insert(name.to_owned(), value.ty);
                self.emit(format_args!("{} {} = {};", self.type_name(value.ty), name, value.expr));
            }
        }
    }

    fn call(&mut self, at: usize, count: usize) -> Result<()> {
        if self.stack.len() < count + 1 {
            bail!(
                MalformedControlFlow,
                Location::Instruction(at),
                "call with {} argument(s) on an operand stack of {} value(s)",
                count,
                self.stack.len()
            );
        }

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            args.push(self.pop_operand(at)?);
        }
        args.reverse();

        let callee = match self.stack.pop() {
            Some(StackValue::Callable(callee)) => callee,
            Some(StackValue::Operand(operand)) => bail!(
                TypeMismatch,
                Location::Instruction(at),
                "`{}` of type `{}` is not callable",
                operand.expr,
                self.type_name(operand.ty)
            ),
            None => unreachable!("stack depth checked above"),
        };

        let types: Vec<Type> = args.iter().map(|arg| arg.ty).collect();
        let Some(variant) = callee.find_variant(&self.registry.types, &types) else {
            if !callee.accepts_arity(count) {
                return Err(CompileError::ArityMismatch {
                    location: Location::Instruction(at),
                    expected: arities(callee),
                    found: count,
                });
            }

            let found: Vec<&str> = types.iter().map(|ty| self.type_name(*ty)).collect();
            bail!(
                TypeMismatch,
                Location::Instruction(at),
                "no variant of `{}` accepts ({})",
                callee.name(),
                found.join(", ")
            );
        };

        let mut expr = format!("{}(", callee.name());
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                expr.push_str(", ");
            }
            expr.push_str(&arg.expr);
        }
        expr.push(')');

        self.stack
            .push(StackValue::Operand(Operand::atom(variant.end_type(), expr)));
        Ok(())
    }

    fn ret(&mut self, at: usize) -> Result<()> {
        let value = match self.stack.len() {
            0 => None,
            1 => Some(self.pop_operand(at)?),
            n => bail!(
                MalformedControlFlow,
                Location::Instruction(at),
                "return with {} values on the operand stack",
                n
            ),
        };

        let ty = value.as_ref().map_or(self.registry.prim.void, |value| value.ty);
        match self.env.ret {
            Some(expected) if expected != ty => bail!(
                TypeMismatch,
                Location::Instruction(at),
                "return type can only be unique: `{}` was returned before, now `{}`",
                self.type_name(expected),
                self.type_name(ty)
            ),
            Some(_) => {}
            None => self.env.ret = Some(ty),
        }

        match value {
            Some(value) => self.emit(format_args!("return {};", value.expr)),
            None => self.emit(format_args!("return;")),
        }
        Ok(())
    }

    fn close_blocks(&mut self, at: usize) -> Result<()> {
        while self.blocks.close(at) {
            self.expect_empty_stack(at)?;
            self.emit(format_args!("}}"));
        }
        Ok(())
    }

    fn pop_operand(&mut self, at: usize) -> Result<Operand> {
        match self.stack.pop() {
            Some(StackValue::Operand(operand)) => Ok(operand),
            Some(StackValue::Callable(callable)) => bail!(
                TypeMismatch,
                Location::Instruction(at),
                "function `{}` cannot be used as a value",
                callable.name()
            ),
            None => bail!(MalformedControlFlow, Location::Instruction(at), "operand stack is empty"),
        }
    }

    fn expect_empty_stack(&self, at: usize) -> Result<()> {
        if !self.stack.is_empty() {
            bail!(
                MalformedControlFlow,
                Location::Instruction(at),
                "{} value(s) left on the operand stack at a block boundary",
                self.stack.len()
            );
        }
        Ok(())
    }

    fn emit(&mut self, line: std::fmt::Arguments) {
        self.emit_at(self.blocks.depth(), line);
    }

    fn emit_at(&mut self, depth: usize, line: std::fmt::Arguments) {
        let mut buffer = String::new();
        emit_indent(&mut buffer, depth);
        buffer.write_fmt(line).ok();
        self.lines.push(buffer);
    }

    fn type_name(&self, ty: Type) -> &'a str {
        let registry: &'a Registry = self.registry;
        registry.types.name(ty)
    }
}

fn unknown(at: usize, name: &str, message: &str) -> CompileError {
    CompileError::UnknownIdentifier {
        location: Location::Instruction(at),
        name: name.to_owned(),
        message: message.to_owned(),
    }
}

fn arities(callee: &dyn Callable) -> String {
    let counts: Vec<String> = callee
        .variants()
        .iter()
        .map(|variant| variant.inputs().len().to_string())
        .collect();

    format!("{} argument(s) for `{}`", counts.join(" or "), callee.name())
}
