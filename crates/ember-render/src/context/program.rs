//! Program introspection and diagnostics text.

use crate::api::GlApi;
use crate::error::ContextError;

use super::{ProgramHandle, RenderContext, ShaderHandle};

/// Semantic type of one program input.
///
/// Attribute inputs always carry the generic [`InputType::Attribute`] tag;
/// their vector width only matters to the layout the caller binds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputType {
    Float1,
    Float2,
    Float3,
    Float4,
    /// 3x3 float matrix.
    Float9,
    /// 4x4 float matrix.
    Float16,
    Int1,
    Int2,
    Int3,
    Int4,
    Sampler2d,
    Attribute,
}

/// One discovered program input (uniform or attribute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInput {
    pub name: String,
    pub input_type: InputType,
    pub location: u32,
}

impl<A: GlApi> RenderContext<A> {
    /// Discovers the program's typed inputs: active uniforms first, then
    /// active attributes, each in the API's enumeration order.
    ///
    /// The program is activated through the cached setter as a side effect.
    /// Inputs whose resolved location is negative were optimized away by
    /// the API and are omitted: an absence, not an error. A uniform whose
    /// type has no semantic mapping fails with
    /// [`ContextError::UnsupportedUniformType`].
    pub fn program_inputs(
        &mut self,
        program: ProgramHandle,
    ) -> Result<Vec<ProgramInput>, ContextError> {
        self.set_program(program);

        let mut inputs = Vec::new();
        self.fill_uniform_inputs(program, &mut inputs)?;
        self.fill_attribute_inputs(program, &mut inputs);
        Ok(inputs)
    }

    fn fill_uniform_inputs(
        &mut self,
        program: ProgramHandle,
        inputs: &mut Vec<ProgramInput>,
    ) -> Result<(), ContextError> {
        let total = self.api.get_program_iv(program.0, gl::ACTIVE_UNIFORMS);

        for index in 0..total.max(0) as u32 {
            let (name, type_token) = self.api.get_active_uniform(program.0, index);
            self.check_errors();

            let input_type = match type_token {
                gl::FLOAT => InputType::Float1,
                gl::INT => InputType::Int1,
                gl::FLOAT_VEC2 => InputType::Float2,
                gl::INT_VEC2 => InputType::Int2,
                gl::FLOAT_VEC3 => InputType::Float3,
                gl::INT_VEC3 => InputType::Int3,
                gl::FLOAT_VEC4 => InputType::Float4,
                gl::INT_VEC4 => InputType::Int4,
                gl::FLOAT_MAT3 => InputType::Float9,
                gl::FLOAT_MAT4 => InputType::Float16,
                gl::SAMPLER_2D => InputType::Sampler2d,
                other => {
                    return Err(ContextError::UnsupportedUniformType {
                        name,
                        type_token: other,
                    });
                }
            };

            let location = self.api.get_uniform_location(program.0, &name);
            if location >= 0 {
                inputs.push(ProgramInput {
                    name,
                    input_type,
                    location: location as u32,
                });
            }
        }

        Ok(())
    }

    fn fill_attribute_inputs(&mut self, program: ProgramHandle, inputs: &mut Vec<ProgramInput>) {
        let total = self.api.get_program_iv(program.0, gl::ACTIVE_ATTRIBUTES);

        for index in 0..total.max(0) as u32 {
            let (name, _type_token) = self.api.get_active_attrib(program.0, index);
            self.check_errors();

            let location = self.api.get_attrib_location(program.0, &name);
            if location >= 0 {
                inputs.push(ProgramInput {
                    name,
                    input_type: InputType::Attribute,
                    location: location as u32,
                });
            }
        }
    }

    /// Compilation diagnostics for `shader`; empty when it compiled clean.
    pub fn shader_compilation_logs(&mut self, shader: ShaderHandle) -> String {
        if self.api.get_shader_iv(shader.0, gl::COMPILE_STATUS) == gl::TRUE as i32 {
            return String::new();
        }
        if self.api.get_shader_iv(shader.0, gl::INFO_LOG_LENGTH) <= 0 {
            return String::new();
        }
        self.api.get_shader_info_log(shader.0)
    }

    /// Link/validation diagnostics for `program`; empty when there are
    /// none. Text can be present even for a program that linked.
    pub fn program_info_logs(&mut self, program: ProgramHandle) -> String {
        if self.api.get_program_iv(program.0, gl::INFO_LOG_LENGTH) <= 0 {
            return String::new();
        }
        self.api.get_program_info_log(program.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{ActiveVar, Call, ProgramReflection, RecordingGl};
    use crate::context::RenderContext;
    use crate::error::ContextError;

    use super::InputType;

    fn context() -> RenderContext<RecordingGl> {
        let mut ctx = RenderContext::new(RecordingGl::new());
        ctx.api_mut().take_calls();
        ctx
    }

    // ── input discovery ───────────────────────────────────────────────────

    #[test]
    fn inputs_list_uniforms_before_attributes_in_order() {
        let mut ctx = context();
        let program = ctx.create_program();
        ctx.api_mut().set_reflection(program.raw(), ProgramReflection {
            uniforms: vec![
                ActiveVar::new("world_matrix", gl::FLOAT_MAT4, 0),
                ActiveVar::new("diffuse_map", gl::SAMPLER_2D, 4),
            ],
            attributes: vec![
                ActiveVar::new("position", gl::FLOAT_VEC3, 0),
                ActiveVar::new("uv", gl::FLOAT_VEC2, 1),
            ],
        });

        let inputs = ctx.program_inputs(program).unwrap();

        let described: Vec<(&str, InputType, u32)> = inputs
            .iter()
            .map(|input| (input.name.as_str(), input.input_type, input.location))
            .collect();
        assert_eq!(described, vec![
            ("world_matrix", InputType::Float16, 0),
            ("diffuse_map", InputType::Sampler2d, 4),
            ("position", InputType::Attribute, 0),
            ("uv", InputType::Attribute, 1),
        ]);
    }

    #[test]
    fn discovery_activates_the_program() {
        let mut ctx = context();
        let program = ctx.create_program();
        ctx.api_mut().take_calls();

        ctx.program_inputs(program).unwrap();
        assert!(ctx.api().calls().contains(&Call::UseProgram(program.raw())));
    }

    #[test]
    fn optimized_away_inputs_are_omitted() {
        let mut ctx = context();
        let program = ctx.create_program();
        ctx.api_mut().set_reflection(program.raw(), ProgramReflection {
            uniforms: vec![
                ActiveVar::new("used", gl::FLOAT, 2),
                ActiveVar::new("stripped", gl::FLOAT, -1),
            ],
            attributes: vec![ActiveVar::new("ghost", gl::FLOAT_VEC4, -1)],
        });

        let inputs = ctx.program_inputs(program).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].name, "used");
    }

    #[test]
    fn unsupported_uniform_type_is_fatal() {
        let mut ctx = context();
        let program = ctx.create_program();
        ctx.api_mut().set_reflection(program.raw(), ProgramReflection {
            uniforms: vec![ActiveVar::new("weird", gl::FLOAT_MAT2, 0)],
            attributes: vec![],
        });

        let result = ctx.program_inputs(program);
        assert_eq!(
            result,
            Err(ContextError::UnsupportedUniformType {
                name: "weird".to_owned(),
                type_token: gl::FLOAT_MAT2,
            })
        );
    }

    #[test]
    fn attribute_types_collapse_to_the_generic_tag() {
        let mut ctx = context();
        let program = ctx.create_program();
        ctx.api_mut().set_reflection(program.raw(), ProgramReflection {
            uniforms: vec![],
            attributes: vec![
                ActiveVar::new("a", gl::FLOAT, 0),
                ActiveVar::new("b", gl::FLOAT_VEC4, 1),
            ],
        });

        let inputs = ctx.program_inputs(program).unwrap();
        assert!(inputs.iter().all(|i| i.input_type == InputType::Attribute));
    }

    // ── diagnostics ───────────────────────────────────────────────────────

    #[test]
    fn compilation_logs_are_empty_for_clean_shaders() {
        let mut ctx = context();
        let shader = ctx.create_vertex_shader();

        assert_eq!(ctx.shader_compilation_logs(shader), "");
    }

    #[test]
    fn compilation_logs_surface_failures() {
        let mut ctx = context();
        let shader = ctx.create_fragment_shader();
        ctx.api_mut()
            .set_shader_failure(shader.raw(), "0:12: undeclared identifier");

        assert_eq!(
            ctx.shader_compilation_logs(shader),
            "0:12: undeclared identifier"
        );
    }

    #[test]
    fn program_logs_pass_through_link_text() {
        let mut ctx = context();
        let program = ctx.create_program();
        ctx.api_mut()
            .set_program_info_log(program.raw(), "warning: unused varying");

        assert_eq!(ctx.program_info_logs(program), "warning: unused varying");
    }
}
