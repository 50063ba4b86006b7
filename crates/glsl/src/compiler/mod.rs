pub mod codegen;
mod eval;
mod flow;

use crate::{
    error::{CompileError, Location, Result},
    shader::CompiledShader,
};
use eval::Evaluator;
use shadermake_core::{Function, Registry, ShaderOptions, Type};
use std::sync::Arc;

pub struct Compiler<'a> {
    options: CompilerOptions,
    registry: &'a Registry,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CompilerOptions {
    /// Emit a `#version` line in [`Compiler::link`].
    pub glsl_version: Option<u32>,
}

impl Compiler<'static> {
    /// A compiler over the built-in GLSL registry.
    pub fn new(options: CompilerOptions) -> Self {
        Self::with_registry(options, shadermake_core::glsl())
    }
}

impl<'a> Compiler<'a> {
    pub fn with_registry(options: CompilerOptions, registry: &'a Registry) -> Self {
        Self { options, registry }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Compile `function` into a shader.
    ///
    /// `argument_types` gives one type per formal parameter. Every shader in `bound_shaders`
    /// is callable from the body and is prepended to the compiled text, in order.
    pub fn compile(
        &self,
        function: &Function,
        argument_types: &[Type],
        bound_shaders: &[Arc<CompiledShader>],
        interface: Option<&ShaderOptions>,
    ) -> Result<Arc<CompiledShader>> {
        let _span = tracing::debug_span!("compile", shader = function.name.as_str()).entered();

        if argument_types.len() != function.params.len() {
            return Err(CompileError::ArityMismatch {
                location: Location::Declaration,
                expected: format!("{} argument type(s) for `{}`", function.params.len(), function.name),
                found: argument_types.len(),
            });
        }

        let params: Vec<(Type, String)> = argument_types
            .iter()
            .copied()
            .zip(function.params.iter().cloned())
            .collect();

        let mut evaluator = Evaluator::new(self.registry, bound_shaders);
        for var in interface.map(ShaderOptions::variables).unwrap_or_default() {
            evaluator.declare(&var.name, var.ty);
        }
        for (ty, name) in &params {
            evaluator.declare(name, *ty);
        }

        let lowered = evaluator.run(&function.body)?;
        let return_type = lowered.return_type.unwrap_or(self.registry.prim.void);

        let mut text = String::new();
        if let Some(interface) = interface.filter(|interface| !interface.is_empty()) {
            codegen::emit_interface(&mut text, &self.registry.types, interface);
            text.push_str("\n\n");
        }
        codegen::emit_function(
            &mut text,
            &self.registry.types,
            &function.name,
            return_type,
            &params,
            &lowered.lines,
        );

        tracing::debug!(
            return_type = self.registry.types.name(return_type),
            statements = lowered.lines.len(),
            dependencies = bound_shaders.len(),
            "compiled shader"
        );

        Ok(Arc::new(CompiledShader::new(
            function.name.clone(),
            params,
            return_type,
            text,
            bound_shaders.to_vec(),
        )))
    }

    /// Final program text: the optional `#version` header and the full shader text.
    pub fn link(&self, shader: &CompiledShader) -> String {
        let mut buffer = String::new();
        if let Some(version) = self.options.glsl_version {
            codegen::emit_version_header(&mut buffer, version);
        }
        buffer.push_str(shader.render_text());
        buffer
    }
}
