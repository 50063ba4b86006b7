use slotmap::{SlotMap, new_key_type};
use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Display},
};
use thiserror::Error;

new_key_type! {
    /// A type registered in a [`TypeLattice`].
    ///
    /// Types are compared by identity: two handles are equal only if they were returned by
    /// the same registration, regardless of their names.
    pub struct Type;
}

/// Binary operators understood by the lattice.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,

    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("operator `{op}` cannot be used on type `{ty}`")]
    UnsupportedOperator { op: Operator, ty: String },

    #[error("type `{rhs}` cannot be used with operator `{op}` on type `{lhs}`")]
    UnsupportedOperand { op: Operator, lhs: String, rhs: String },
}

/// The registry of scalar, vector and matrix types and the rules that combine them.
///
/// The lattice is append-only: types and rules can be added but never removed or changed,
/// so a fully built lattice can be shared freely between threads.
#[derive(Default)]
pub struct TypeLattice {
    types: SlotMap<Type, TypeInfo>,
    names: HashMap<String, Type>,

    int: Option<Type>,
    float: Option<Type>,
}

#[derive(Default)]
struct TypeInfo {
    name: String,
    operators: HashMap<Operator, HashMap<Type, Type>>,
    any: HashMap<Type, Type>,
    castable: HashSet<Type>,
}

impl Operator {
    pub const ARITHMETIC: [Operator; 4] = [Self::Add, Self::Sub, Self::Mul, Self::Div];
    pub const COMPARISON: [Operator; 6] = [Self::Lt, Self::Le, Self::Gt, Self::Ge, Self::Eq, Self::Ne];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }

    /// Binding strength in the emitted text, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Mul | Self::Div => 4,
            Self::Add | Self::Sub => 3,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => 2,
            Self::Eq | Self::Ne => 1,
        }
    }

    pub fn is_comparison(self) -> bool {
        Self::COMPARISON.contains(&self)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TypeLattice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new type under `name`. Registering a name twice returns the existing type.
    pub fn register(&mut self, name: &str) -> Type {
        if let Some(ty) = self.names.get(name) {
            return *ty;
        }

        let ty = self.types.insert(TypeInfo {
            name: name.to_owned(),
            ..TypeInfo::default()
        });

        match name {
            "int" => self.int = Some(ty),
            "float" => self.float = Some(ty),
            _ => {}
        }

        self.names.insert(name.to_owned(), ty);
        ty
    }

    /// `ty <op> rhs` produces `result`.
    pub fn link_operator(&mut self, ty: Type, op: Operator, rhs: Type, result: Type) -> &mut Self {
        if let Some(info) = self.types.get_mut(ty) {
            info.operators.entry(op).or_default().insert(rhs, result);
        }
        self
    }

    pub fn link_operators(&mut self, ty: Type, ops: &[Operator], rhs: Type, result: Type) -> &mut Self {
        for op in ops {
            self.link_operator(ty, *op, rhs, result);
        }
        self
    }

    /// `ty <op> rhs` produces `result` for every operator `ty` defines, bypassing the
    /// per-operator operand table.
    pub fn link_any(&mut self, ty: Type, rhs: Type, result: Type) -> &mut Self {
        if let Some(info) = self.types.get_mut(ty) {
            info.any.insert(rhs, result);
        }
        self
    }

    /// `ty` may be implicitly widened to `target` when matching call arguments.
    pub fn link_castable(&mut self, ty: Type, target: Type) -> &mut Self {
        if let Some(info) = self.types.get_mut(ty) {
            info.castable.insert(target);
        }
        self
    }

    pub fn name(&self, ty: Type) -> &str {
        self.types.get(ty).map_or("<unknown>", |info| info.name.as_str())
    }

    pub fn lookup(&self, name: &str) -> Option<Type> {
        self.names.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Type> + '_ {
        self.types.keys()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve the type of `lhs <op> rhs`, using `lhs` as the receiver.
    pub fn result_type(&self, op: Operator, lhs: Type, rhs: Type) -> Result<Type, TypeError> {
        let operands = self
            .types
            .get(lhs)
            .and_then(|info| info.operators.get(&op))
            .ok_or_else(|| TypeError::UnsupportedOperator {
                op,
                ty: self.name(lhs).to_owned(),
            })?;

        if let Some(result) = self.types[lhs].any.get(&rhs) {
            return Ok(*result);
        }

        operands.get(&rhs).copied().ok_or_else(|| TypeError::UnsupportedOperand {
            op,
            lhs: self.name(lhs).to_owned(),
            rhs: self.name(rhs).to_owned(),
        })
    }

    pub fn castable(&self, source: Type, target: Type) -> bool {
        if source == target {
            return true;
        }

        if self.int == Some(source) && self.float == Some(target) {
            return true;
        }

        self.types
            .get(source)
            .is_some_and(|info| info.castable.contains(&target))
    }
}

impl fmt::Debug for TypeLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.types.values().map(|info| info.name.as_str()))
            .finish()
    }
}
