use once_cell::sync::OnceCell;
use shadermake_core::{Callable, Type, Variant};
use std::sync::Arc;

/// A compiled shader function.
///
/// A compiled shader can be bound into another shader: it is then callable from that
/// shader's body with its own parameter list as the only signature, and its text is
/// prepended to the caller's text.
#[derive(Debug)]
pub struct CompiledShader {
    name: String,
    params: Vec<(Type, String)>,
    signature: Variant,
    text: String,
    dependencies: Vec<Arc<CompiledShader>>,
    rendered: OnceCell<String>,
}

impl CompiledShader {
    pub(crate) fn new(
        name: String,
        params: Vec<(Type, String)>,
        return_type: Type,
        text: String,
        dependencies: Vec<Arc<CompiledShader>>,
    ) -> Self {
        let signature = Variant::new(return_type, params.iter().map(|(ty, _)| *ty).collect::<Vec<_>>());

        Self {
            name,
            params,
            signature,
            text,
            dependencies,
            rendered: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[(Type, String)] {
        &self.params
    }

    pub fn return_type(&self) -> Type {
        self.signature.end_type()
    }

    pub fn dependencies(&self) -> &[Arc<CompiledShader>] {
        &self.dependencies
    }

    /// The text of this shader alone: interface declarations and the function.
    pub fn own_text(&self) -> &str {
        &self.text
    }

    /// The full text: every dependency (recursively) in declaration order, then this shader.
    ///
    /// Dependencies shared by several paths are repeated once per path.
    pub fn render_text(&self) -> &str {
        self.rendered.get_or_init(|| {
            let mut buffer = String::new();
            for dependency in &self.dependencies {
                buffer.push_str(dependency.render_text());
                buffer.push('\n');
            }
            buffer.push_str(&self.text);
            buffer
        })
    }
}

impl Callable for CompiledShader {
    fn name(&self) -> &str {
        &self.name
    }

    fn variants(&self) -> &[Variant] {
        std::slice::from_ref(&self.signature)
    }
}
