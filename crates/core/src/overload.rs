use crate::types::{Type, TypeLattice};
use std::collections::HashMap;

/// One concrete signature of a callable: the argument types it expects and the type it produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
    end_type: Type,
    inputs: Vec<Type>,
}

/// Anything that can be invoked from a shader body.
///
/// Resolution picks the *first* variant that accepts the arguments, so variant order matters.
pub trait Callable {
    fn name(&self) -> &str;
    fn variants(&self) -> &[Variant];

    fn find_variant(&self, lattice: &TypeLattice, args: &[Type]) -> Option<&Variant> {
        self.variants().iter().find(|variant| variant.validate(lattice, args))
    }

    /// Whether any variant takes exactly `count` arguments.
    fn accepts_arity(&self, count: usize) -> bool {
        self.variants().iter().any(|variant| variant.inputs.len() == count)
    }
}

/// A named built-in function with an ordered list of variants.
#[derive(Clone, Debug)]
pub struct Overload {
    name: String,
    variants: Vec<Variant>,
}

/// Built-in functions by name.
#[derive(Clone, Debug, Default)]
pub struct OverloadRegistry {
    functions: HashMap<String, Overload>,
}

impl Variant {
    pub fn new(end_type: Type, inputs: impl Into<Vec<Type>>) -> Self {
        Self {
            end_type,
            inputs: inputs.into(),
        }
    }

    pub fn end_type(&self) -> Type {
        self.end_type
    }

    pub fn inputs(&self) -> &[Type] {
        &self.inputs
    }

    /// Check every argument against the expected input at the same position.
    pub fn validate(&self, lattice: &TypeLattice, args: &[Type]) -> bool {
        args.len() == self.inputs.len()
            && args
                .iter()
                .zip(&self.inputs)
                .all(|(arg, input)| lattice.castable(*arg, *input))
    }
}

impl Overload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    pub fn link_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }
}

impl Callable for Overload {
    fn name(&self) -> &str {
        &self.name
    }

    fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

impl OverloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an overload. Variants of an already registered name are appended after the existing ones.
    pub fn register(&mut self, overload: Overload) -> &mut Self {
        match self.functions.get_mut(&overload.name) {
            Some(existing) => existing.variants.extend(overload.variants),
            None => {
                self.functions.insert(overload.name.clone(), overload);
            }
        }
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&Overload> {
        self.functions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overload> + '_ {
        self.functions.values()
    }
}
