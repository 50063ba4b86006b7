use crate::types::Type;

/// Direction of an interface variable.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum InterfaceKind {
    Input,
    Output,
    Uniform,
}

/// Pipeline stage a shader is declared for. Carried along with the interface, the compiler does not branch on it.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// A named value declared outside of the function body and visible inside of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceVariable {
    pub kind: InterfaceKind,
    pub ty: Type,
    pub name: String,
    /// Explicit `layout(location = N)`, never set for uniforms.
    pub location: Option<u32>,
}

/// Interface declarations of a shader.
///
/// Variables are kept in insertion order, duplicates are not checked.
///
/// ```ignore
/// let options = ShaderOptions::new()
///     .fragment()
///     .add_input(prim.vec2, "uv", Some(0))
///     .add_output(prim.vec4, "color", Some(0))
///     .add_uniform(prim.float, "time");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderOptions {
    variables: Vec<InterfaceVariable>,
    stage: Option<ShaderStage>,
}

impl ShaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex(mut self) -> Self {
        self.stage = Some(ShaderStage::Vertex);
        self
    }

    pub fn fragment(mut self) -> Self {
        self.stage = Some(ShaderStage::Fragment);
        self
    }

    pub fn add_input(self, ty: Type, name: impl Into<String>, location: Option<u32>) -> Self {
        self.add(InterfaceKind::Input, ty, name.into(), location)
    }

    pub fn add_output(self, ty: Type, name: impl Into<String>, location: Option<u32>) -> Self {
        self.add(InterfaceKind::Output, ty, name.into(), location)
    }

    pub fn add_uniform(self, ty: Type, name: impl Into<String>) -> Self {
        self.add(InterfaceKind::Uniform, ty, name.into(), None)
    }

    pub fn stage(&self) -> Option<ShaderStage> {
        self.stage
    }

    pub fn variables(&self) -> &[InterfaceVariable] {
        &self.variables
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn add(mut self, kind: InterfaceKind, ty: Type, name: String, location: Option<u32>) -> Self {
        self.variables.push(InterfaceVariable {
            kind,
            ty,
            name,
            location,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::glsl;

    #[test]
    fn keeps_insertion_order() {
        let p = glsl().prim;
        let options = ShaderOptions::new()
            .vertex()
            .add_uniform(p.float, "time")
            .add_input(p.vec2, "A", Some(0))
            .add_output(p.vec4, "color", None)
            .add_input(p.vec2, "A", Some(1));

        let names: Vec<_> = options.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["time", "A", "color", "A"]);
        assert_eq!(options.stage(), Some(ShaderStage::Vertex));
        assert_eq!(options.variables()[0].location, None);
        assert_eq!(options.variables()[1].location, Some(0));
        assert_eq!(options.variables()[2].kind, InterfaceKind::Output);
    }

    #[test]
    fn stage_is_last_set() {
        let options = ShaderOptions::new().vertex().fragment();
        assert_eq!(options.stage(), Some(ShaderStage::Fragment));
        assert!(options.is_empty());
    }
}
