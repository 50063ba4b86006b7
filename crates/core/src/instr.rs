use crate::types::Operator;
use thiserror::Error;

/// A literal carried by [`Instruction::PushConst`].
///
/// Front ends may hand over any of these, only integers and floats have a shader representation.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    None,
}

/// A single elementary operation of a function body.
///
/// Jump targets are indices into the same instruction stream; a target equal to the stream
/// length refers to the end of the function.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// Push a literal.
    PushConst(Literal),
    /// Push a local variable or parameter.
    LoadLocal(String),
    /// Push a variable, falling back to a callable of the same name.
    LoadName(String),
    /// Push a callable: a bound shader or a built-in function.
    LoadGlobal(String),
    /// Pop a value into a local, declaring it on first write.
    StoreLocal(String),
    /// Pop right then left operand, push `left <op> right`.
    Binary(Operator),
    /// Pop `n` arguments and a callable, push the call.
    Call(usize),
    /// Pop a value and evaluate it for its side effects.
    Pop,
    /// Return the single value on the stack, or nothing.
    Return,
    /// Pop a boolean and skip to the target when it is false.
    JumpIfFalse(usize),
    /// Continue at the target.
    Jump(usize),
}

/// A function as produced by a front end: its name, its formal parameters and its body.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Instruction>,
}

/// A forward reference to a position in a [`FunctionBuilder`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Label(u32);

/// Incrementally builds a [`Function`], resolving jump labels on [`FunctionBuilder::finish`].
#[derive(Clone, Debug)]
pub struct FunctionBuilder {
    name: String,
    params: Vec<String>,
    body: Vec<Instruction>,
    labels: Vec<Option<usize>>,
    fixups: Vec<(usize, Label)>,
    foreign: Option<Label>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FunctionError {
    #[error("label {0:?} was used at instruction #{1} but never bound")]
    UnboundLabel(Label, usize),
    #[error("label {0:?} was not created by this builder")]
    ForeignLabel(Label),
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<String>, body: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            params,
            body,
        }
    }
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            body: Vec::new(),
            labels: Vec::new(),
            fixups: Vec::new(),
            foreign: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Append an instruction and return its index.
    pub fn push(&mut self, instruction: Instruction) -> usize {
        self.body.push(instruction);
        self.body.len() - 1
    }

    pub fn label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() as u32 - 1)
    }

    /// Bind `label` to the index of the next pushed instruction.
    ///
    /// A label from another builder is reported by [`FunctionBuilder::finish`].
    pub fn bind(&mut self, label: Label) {
        match self.labels.get_mut(label.0 as usize) {
            Some(slot) => *slot = Some(self.body.len()),
            None => {
                self.foreign.get_or_insert(label);
            }
        }
    }

    pub fn jump_if_false(&mut self, label: Label) -> usize {
        let at = self.push(Instruction::JumpIfFalse(0));
        self.fixups.push((at, label));
        at
    }

    pub fn jump(&mut self, label: Label) -> usize {
        let at = self.push(Instruction::Jump(0));
        self.fixups.push((at, label));
        at
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn finish(mut self) -> Result<Function, FunctionError> {
        if let Some(label) = self.foreign {
            return Err(FunctionError::ForeignLabel(label));
        }

        for (at, label) in self.fixups {
            let target = match self.labels.get(label.0 as usize) {
                Some(Some(target)) => *target,
                Some(None) => return Err(FunctionError::UnboundLabel(label, at)),
                None => return Err(FunctionError::ForeignLabel(label)),
            };
            match &mut self.body[at] {
                Instruction::JumpIfFalse(t) | Instruction::Jump(t) => *t = target,
                _ => unreachable!("fixup on a non-jump instruction"),
            }
        }

        Ok(Function {
            name: self.name,
            params: self.params,
            body: self.body,
        })
    }
}
