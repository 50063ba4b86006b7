use crate::{
    overload::{Overload, OverloadRegistry, Variant},
    types::{Operator, Type, TypeLattice},
};
use once_cell::sync::Lazy;

static GLSL: Lazy<Registry> = Lazy::new(Registry::glsl);

/// The built-in GLSL registry, built on first use and never modified afterwards.
pub fn glsl() -> &'static Registry {
    &GLSL
}

/// Types and built-in functions a shader body may refer to.
#[derive(Debug)]
pub struct Registry {
    pub types: TypeLattice,
    pub functions: OverloadRegistry,
    pub prim: Primitives,
}

/// Handles of the types every registry defines.
#[derive(Clone, Copy, Debug)]
pub struct Primitives {
    pub void: Type,
    pub boolean: Type,
    pub int: Type,
    pub float: Type,
    pub vec2: Type,
    pub vec3: Type,
    pub vec4: Type,
    pub mat2: Type,
    pub mat3: Type,
    pub mat4: Type,
}

impl Primitives {
    pub fn vec(&self, n: usize) -> Option<Type> {
        match n {
            2 => Some(self.vec2),
            3 => Some(self.vec3),
            4 => Some(self.vec4),
            _ => None,
        }
    }

    pub fn mat(&self, n: usize) -> Option<Type> {
        match n {
            2 => Some(self.mat2),
            3 => Some(self.mat3),
            4 => Some(self.mat4),
            _ => None,
        }
    }
}

impl Registry {
    /// Build the GLSL type lattice and constructor overloads.
    pub fn glsl() -> Self {
        use Operator::*;

        let mut types = TypeLattice::new();
        let prim = Primitives {
            void: types.register("void"),
            boolean: types.register("bool"),
            int: types.register("int"),
            float: types.register("float"),
            vec2: types.register("vec2"),
            vec3: types.register("vec3"),
            vec4: types.register("vec4"),
            mat2: types.register("mat2"),
            mat3: types.register("mat3"),
            mat4: types.register("mat4"),
        };

        let Primitives {
            boolean, int, float, ..
        } = prim;

        types
            .link_operators(int, &Operator::ARITHMETIC, int, int)
            .link_operators(int, &Operator::ARITHMETIC, float, float)
            .link_operators(float, &Operator::ARITHMETIC, int, float)
            .link_operators(float, &Operator::ARITHMETIC, float, float)
            .link_operators(int, &Operator::COMPARISON, int, boolean)
            .link_operators(int, &Operator::COMPARISON, float, boolean)
            .link_operators(float, &Operator::COMPARISON, int, boolean)
            .link_operators(float, &Operator::COMPARISON, float, boolean)
            .link_operators(boolean, &[Eq, Ne], boolean, boolean)
            .link_castable(int, float);

        let mut functions = OverloadRegistry::new();
        for n in 2..=4 {
            let (Some(vec), Some(mat)) = (prim.vec(n), prim.mat(n)) else {
                continue;
            };

            types
                .link_operators(vec, &[Add, Sub], vec, vec)
                .link_operators(mat, &[Add, Sub, Mul], mat, mat)
                .link_operator(mat, Mul, vec, vec);

            functions
                .register(Overload::new(format!("vec{n}")).link_variant(Variant::new(vec, vec![float; n])))
                .register(Overload::new(format!("mat{n}")).link_variant(Variant::new(mat, vec![vec; n])));
        }

        Self {
            types,
            functions,
            prim,
        }
    }
}
