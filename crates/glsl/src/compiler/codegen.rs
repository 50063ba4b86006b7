use shadermake_core::{InterfaceKind, Literal, ShaderOptions, Type, TypeLattice};
use std::fmt::Write;

/// Precedence of names, literals and calls: never parenthesized.
pub const PRECEDENCE_ATOM: u8 = u8::MAX;

pub fn emit_version_header(buffer: &mut String, version: u32) {
    writeln!(buffer, "#version {}", version).ok();
}

/// Interface declarations, one per line in insertion order, without a trailing newline.
pub fn emit_interface(buffer: &mut String, lattice: &TypeLattice, options: &ShaderOptions) {
    for (i, var) in options.variables().iter().enumerate() {
        if i > 0 {
            buffer.push('\n');
        }

        let ty = lattice.name(var.ty);
        let direction = match var.kind {
            InterfaceKind::Input => "in",
            InterfaceKind::Output => "out",
            InterfaceKind::Uniform => {
                write!(buffer, "uniform {} {};", ty, var.name).ok();
                continue;
            }
        };

        if let Some(location) = var.location {
            write!(buffer, "layout(location = {}) ", location).ok();
        }
        write!(buffer, "{} {} {};", direction, ty, var.name).ok();
    }
}

/// `<ret> <name> (<params>) {`, the body lines, then `}`.
pub fn emit_function(
    buffer: &mut String,
    lattice: &TypeLattice,
    name: &str,
    return_type: Type,
    params: &[(Type, String)],
    lines: &[String],
) {
    write!(buffer, "{} {} (", lattice.name(return_type), name).ok();
    for (i, (ty, param)) in params.iter().enumerate() {
        if i > 0 {
            buffer.push_str(", ");
        }
        write!(buffer, "{} {}", lattice.name(*ty), param).ok();
    }
    buffer.push_str(") {\n");

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            buffer.push('\n');
        }
        buffer.push_str(line);
    }
    buffer.push_str("\n}");
}

/// Text of a numeric literal, `None` for literals without a shader representation.
pub fn emit_literal(literal: &Literal) -> Option<String> {
    Some(match *literal {
        Literal::Float(f64::INFINITY) => "4e+100".to_owned(),
        Literal::Float(f64::NEG_INFINITY) => "(-4e+100)".to_owned(),
        Literal::Float(x) if x.is_nan() => "(0.0/0.0)".to_owned(),
        Literal::Float(x) if x.is_sign_positive() => format!("{:?}", x),
        Literal::Float(x) => format!("({:?})", x),
        Literal::Int(x) if x >= 0 => x.to_string(),
        // 2147483648 itself is not a valid `int` literal
        Literal::Int(x) if x == i64::from(i32::MIN) => "(-2147483647 - 1)".to_owned(),
        Literal::Int(x) => format!("({})", x),
        Literal::Bool(_) | Literal::Str(_) | Literal::None => return None,
    })
}

pub fn emit_indent(buffer: &mut String, depth: usize) {
    for _ in 0..depth {
        buffer.push('\t');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadermake_core::glsl;

    #[test]
    fn literals() {
        assert_eq!(emit_literal(&Literal::Int(0)).as_deref(), Some("0"));
        assert_eq!(emit_literal(&Literal::Int(-3)).as_deref(), Some("(-3)"));
        assert_eq!(emit_literal(&Literal::Float(2.0)).as_deref(), Some("2.0"));
        assert_eq!(emit_literal(&Literal::Float(0.25)).as_deref(), Some("0.25"));
        assert_eq!(emit_literal(&Literal::Float(-1.5)).as_deref(), Some("(-1.5)"));
        assert_eq!(emit_literal(&Literal::Float(f64::INFINITY)).as_deref(), Some("4e+100"));
        assert_eq!(emit_literal(&Literal::Float(f64::NEG_INFINITY)).as_deref(), Some("(-4e+100)"));
        assert_eq!(emit_literal(&Literal::Float(f64::NAN)).as_deref(), Some("(0.0/0.0)"));
        assert_eq!(
            emit_literal(&Literal::Int(i32::MIN.into())).as_deref(),
            Some("(-2147483647 - 1)")
        );
        assert_eq!(emit_literal(&Literal::Bool(true)), None);
        assert_eq!(emit_literal(&Literal::Str("x".into())), None);
        assert_eq!(emit_literal(&Literal::None), None);
    }

    #[test]
    fn interface_lines() {
        let glsl = glsl();
        let p = glsl.prim;
        let options = ShaderOptions::new()
            .add_input(p.vec2, "A", Some(0))
            .add_input(p.vec2, "B", None)
            .add_output(p.vec2, "C", Some(0))
            .add_output(p.vec2, "D", None)
            .add_uniform(p.vec2, "E");

        let mut buffer = String::new();
        emit_interface(&mut buffer, &glsl.types, &options);
        assert_eq!(
            buffer,
            [
                "layout(location = 0) in vec2 A;",
                "in vec2 B;",
                "layout(location = 0) out vec2 C;",
                "out vec2 D;",
                "uniform vec2 E;",
            ]
            .join("\n")
        );
    }

    #[test]
    fn function_frame() {
        let glsl = glsl();
        let p = glsl.prim;

        let mut buffer = String::new();
        emit_function(&mut buffer, &glsl.types, "main", p.void, &[], &[]);
        assert_eq!(buffer, "void main () {\n\n}");

        let mut buffer = String::new();
        emit_function(
            &mut buffer,
            &glsl.types,
            "f",
            p.float,
            &[(p.int, "x".into()), (p.vec2, "A".into())],
            &["\treturn 1.0;".into()],
        );
        assert_eq!(buffer, "float f (int x, vec2 A) {\n\treturn 1.0;\n}");
    }
}
