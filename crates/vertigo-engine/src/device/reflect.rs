//! WGSL front end shared by every backend.
//!
//! `compile` parses and validates one stage with naga. `link` pairs a vertex
//! and a fragment stage, checks that every fragment input is written by the
//! vertex stage with the same type, and merges the resource bindings of both
//! modules. Attribute and uniform lookups by name run against the linked
//! interface.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, ImageClass, ImageDimension, Module, Type, TypeInner};

use super::api::ShaderStage;

/// A parsed and validated shader stage.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: ShaderStage,
    pub source: String,
    module: Module,
}

pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledStage, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    Ok(CompiledStage {
        stage,
        source: source.to_owned(),
        module,
    })
}

/// Kind of a bound shader resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceKind {
    /// `var<uniform>` of `size` bytes.
    Uniform { size: u32 },
    /// Sampled float 2D texture.
    Texture,
    /// Filtering sampler.
    Sampler,
}

/// One `@group(g) @binding(b)` resource of a linked program.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResourceSlot {
    pub name: Option<String>,
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
    pub vertex: bool,
    pub fragment: bool,
}

#[derive(Debug, Clone)]
struct Varying {
    name: Option<String>,
    location: u32,
    inner: TypeInner,
}

/// Interface of a successfully linked vertex/fragment pair.
#[derive(Debug, Clone)]
pub struct LinkedProgram {
    pub vertex_entry: String,
    pub fragment_entry: String,
    attributes: Vec<Varying>,
    resources: Vec<ResourceSlot>,
}

impl LinkedProgram {
    /// Location of the named vertex input.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| a.location)
    }

    /// Locations of every vertex input, ascending.
    pub fn attribute_locations(&self) -> impl Iterator<Item = u32> + '_ {
        self.attributes.iter().map(|a| a.location)
    }

    /// Index into [`resources`](Self::resources) of the named uniform.
    pub fn uniform_index(&self, name: &str) -> Option<usize> {
        self.resources.iter().position(|r| {
            matches!(r.kind, ResourceKind::Uniform { .. }) && r.name.as_deref() == Some(name)
        })
    }

    pub fn resources(&self) -> &[ResourceSlot] {
        &self.resources
    }

    /// Highest bind group index used, plus one.
    pub fn group_count(&self) -> u32 {
        self.resources.iter().map(|r| r.group + 1).max().unwrap_or(0)
    }
}

pub fn link(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<LinkedProgram, String> {
    if vertex.stage != ShaderStage::Vertex {
        return Err("object attached as vertex stage was compiled as a fragment shader".into());
    }
    if fragment.stage != ShaderStage::Fragment {
        return Err("object attached as fragment stage was compiled as a vertex shader".into());
    }

    let vs = entry_point(&vertex.module, naga::ShaderStage::Vertex)
        .ok_or("vertex stage has no @vertex entry point")?;
    let fs = entry_point(&fragment.module, naga::ShaderStage::Fragment)
        .ok_or("fragment stage has no @fragment entry point")?;

    let mut attributes = Vec::new();
    for arg in &vs.function.arguments {
        collect_varyings(
            &vertex.module,
            arg.ty,
            arg.binding.as_ref(),
            arg.name.as_deref(),
            &mut attributes,
        );
    }

    let mut outputs = Vec::new();
    if let Some(result) = &vs.function.result {
        collect_varyings(&vertex.module, result.ty, result.binding.as_ref(), None, &mut outputs);
    }

    let mut inputs = Vec::new();
    for arg in &fs.function.arguments {
        collect_varyings(
            &fragment.module,
            arg.ty,
            arg.binding.as_ref(),
            arg.name.as_deref(),
            &mut inputs,
        );
    }

    for input in &inputs {
        let label = input.name.as_deref().unwrap_or("<unnamed>");
        let Some(output) = outputs.iter().find(|o| o.location == input.location) else {
            return Err(format!(
                "fragment input `{label}` at location {} is not written by the vertex stage",
                input.location
            ));
        };
        if output.inner != input.inner {
            return Err(format!(
                "fragment input `{label}` at location {} does not match the vertex output type",
                input.location
            ));
        }
    }

    let mut resources = Vec::new();
    collect_resources(&vertex.module, ShaderStage::Vertex, &mut resources)?;
    collect_resources(&fragment.module, ShaderStage::Fragment, &mut resources)?;

    Ok(LinkedProgram {
        vertex_entry: vs.name.clone(),
        fragment_entry: fs.name.clone(),
        attributes,
        resources,
    })
}

fn entry_point(module: &Module, stage: naga::ShaderStage) -> Option<&naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.stage == stage)
}

fn collect_varyings(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    name: Option<&str>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            name: name.map(str::to_owned),
            location: *location,
            inner: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(Binding::Location { location, .. }) = &member.binding {
                        out.push(Varying {
                            name: member.name.clone(),
                            location: *location,
                            inner: module.types[member.ty].inner.clone(),
                        });
                    }
                }
            }
        }
    }
}

fn collect_resources(
    module: &Module,
    stage: ShaderStage,
    out: &mut Vec<ResourceSlot>,
) -> Result<(), String> {
    for (_, var) in module.global_variables.iter() {
        let Some(rb) = &var.binding else { continue };
        let inner = &module.types[var.ty].inner;

        let kind = match (var.space, inner) {
            (AddressSpace::Uniform, _) => ResourceKind::Uniform {
                size: inner.size(module.to_ctx()),
            },
            (
                AddressSpace::Handle,
                TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    class: ImageClass::Sampled { kind: naga::ScalarKind::Float, multi: false },
                },
            ) => ResourceKind::Texture,
            (AddressSpace::Handle, TypeInner::Sampler { comparison: false }) => {
                ResourceKind::Sampler
            }
            _ => {
                return Err(format!(
                    "unsupported resource `{}` at @group({}) @binding({})",
                    var.name.as_deref().unwrap_or("<unnamed>"),
                    rb.group,
                    rb.binding
                ));
            }
        };

        let (vertex, fragment) = match stage {
            ShaderStage::Vertex => (true, false),
            ShaderStage::Fragment => (false, true),
        };

        match out
            .iter_mut()
            .find(|r| r.group == rb.group && r.binding == rb.binding)
        {
            Some(existing) if existing.kind == kind => {
                existing.vertex |= vertex;
                existing.fragment |= fragment;
            }
            Some(existing) => {
                return Err(format!(
                    "@group({}) @binding({}) is declared as {:?} and {:?}",
                    rb.group, rb.binding, existing.kind, kind
                ));
            }
            None => out.push(ResourceSlot {
                name: var.name.clone(),
                group: rb.group,
                binding: rb.binding,
                kind,
                vertex,
                fragment,
            }),
        }
    }
    Ok(())
}
