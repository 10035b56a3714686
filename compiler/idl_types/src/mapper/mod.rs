//! WebIDL type -> PHP type rendering.

use idl_diagnostic::{GenError, Result};
use idl_ir::{Definition, DefinitionKind, GenericKind, Primitive, TypeKind, TypeNode};
use idl_registry::Registry;
use smallvec::SmallVec;

use crate::{Fidelity, Position, TypeContext};

/// Extended attribute that makes `null` acceptable wherever a string is
/// written.
const LEGACY_NULL: &str = "LegacyNullToEmptyString";

/// A definition mentioned by a type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Reference<'r> {
    pub name: &'r str,
    pub is_enum: bool,
}

/// Renders types against a frozen registry.
#[derive(Copy, Clone, Debug)]
pub struct TypeMapper<'r> {
    registry: &'r Registry,
    namespace: &'r str,
}

/// One rendering before nullability is applied.
struct Rendered {
    /// Alternatives, each a complete type expression.
    parts: Vec<String>,
    nullable: bool,
}

impl Rendered {
    fn one(part: impl Into<String>, nullable: bool) -> Self {
        Self {
            parts: vec![part.into()],
            nullable,
        }
    }
}

impl<'r> TypeMapper<'r> {
    pub fn new(registry: &'r Registry, namespace: &'r str) -> Self {
        Self {
            registry,
            namespace,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn namespace(&self) -> &'r str {
        self.namespace
    }

    /// Render `ty` at the requested fidelity.
    pub fn map(&self, ty: &TypeNode, ctx: TypeContext<'_>, fidelity: Fidelity) -> Result<String> {
        match fidelity {
            Fidelity::Binding => self.binding(ty, ctx),
            Fidelity::Documentation => self.documentation(ty, ctx),
        }
    }

    /// PHP signature type.
    pub fn binding(&self, ty: &TypeNode, ctx: TypeContext<'_>) -> Result<String> {
        let ty = self.registry.resolve_typedefs(ty)?;
        let nullable = is_nullable(&ty, ctx.position);

        let parts: Vec<String> = match &ty.kind {
            TypeKind::Union(_) | TypeKind::Generic(GenericKind::Promise, _) => {
                return Ok("mixed".to_string());
            }
            TypeKind::Generic(..) => vec!["array".to_string()],
            TypeKind::Named(name) => match Primitive::from_name(name) {
                Some(Primitive::Any) => return Ok("mixed".to_string()),
                Some(Primitive::Undefined) => {
                    return Ok(undefined(ctx.position).to_string());
                }
                Some(primitive) => vec![scalar(primitive).to_string()],
                None => {
                    let def = self.lookup(name)?;
                    match &def.kind {
                        DefinitionKind::Enum { .. } => vec!["string".to_string()],
                        kind => {
                            let mut parts = vec![self.qualify(name, ctx)];
                            if let Some(alt) = alternate(kind, ctx.position, Fidelity::Binding) {
                                parts.push(alt.to_string());
                            }
                            parts
                        }
                    }
                }
            },
        };

        Ok(match (parts.as_slice(), nullable) {
            ([single], true) => format!("?{single}"),
            (_, true) => format!("{}|null", parts.join("|")),
            (_, false) => parts.join("|"),
        })
    }

    /// PHPDoc type.
    pub fn documentation(&self, ty: &TypeNode, ctx: TypeContext<'_>) -> Result<String> {
        let rendered = self.doc(ty, ctx, true)?;
        Ok(join(rendered))
    }

    /// Every definition `ty` mentions, in first-mention order, once each.
    pub fn references(&self, ty: &TypeNode) -> Result<SmallVec<[Reference<'r>; 4]>> {
        let mut out = SmallVec::new();
        self.collect_references(ty, &mut out)?;
        Ok(out)
    }

    /// Whether `ty` is `undefined`, i.e. the method returns nothing.
    pub fn is_void(&self, ty: &TypeNode) -> Result<bool> {
        let ty = self.registry.resolve_typedefs(ty)?;
        Ok(matches!(
            ty.name().and_then(Primitive::from_name),
            Some(Primitive::Undefined)
        ))
    }

    /// The definition `ty` names directly, if any (after typedefs).
    pub fn definition_of(&self, ty: &TypeNode) -> Result<Option<&'r Definition>> {
        let ty = self.registry.resolve_typedefs(ty)?;
        Ok(ty.name().and_then(|name| self.registry.get(name)))
    }

    fn doc(&self, ty: &TypeNode, ctx: TypeContext<'_>, top: bool) -> Result<Rendered> {
        let ty = self.registry.resolve_typedefs(ty)?;
        let nullable = is_nullable(&ty, ctx.position);

        Ok(match &ty.kind {
            TypeKind::Named(name) => match Primitive::from_name(name) {
                Some(Primitive::Any) => Rendered::one("mixed", true),
                Some(Primitive::Undefined) => {
                    let position = if top { ctx.position } else { Position::Field };
                    Rendered::one(undefined(position), false)
                }
                Some(primitive) => Rendered::one(scalar(primitive), nullable),
                None => {
                    let def = self.lookup(name)?;
                    match &def.kind {
                        DefinitionKind::Enum { .. } => {
                            Rendered::one(format!("\\{}\\{name}::*", self.namespace), nullable)
                        }
                        kind => {
                            let mut parts = vec![self.qualify(name, ctx)];
                            if let Some(alt) =
                                alternate(kind, ctx.position, Fidelity::Documentation)
                            {
                                parts.push(alt.to_string());
                            }
                            Rendered { parts, nullable }
                        }
                    }
                }
            },
            TypeKind::Union(members) => {
                let mut rendered = Rendered {
                    parts: Vec::with_capacity(members.len()),
                    nullable,
                };
                for member in members {
                    let branch = self.doc(member, ctx, false)?;
                    rendered.nullable |= branch.nullable;
                    for part in branch.parts {
                        if !rendered.parts.contains(&part) {
                            rendered.parts.push(part);
                        }
                    }
                }
                rendered
            }
            TypeKind::Generic(GenericKind::Promise, _) => Rendered::one("mixed", nullable),
            TypeKind::Generic(GenericKind::Record, args) => {
                let [key, value] = args.as_slice() else {
                    return Err(arity_error(GenericKind::Record, args.len()));
                };
                let key = join(self.doc(key, ctx, false)?);
                let value = join(self.doc(value, ctx, false)?);
                Rendered::one(format!("array<{key}, {value}>"), nullable)
            }
            TypeKind::Generic(kind, args) => {
                let [element] = args.as_slice() else {
                    return Err(arity_error(*kind, args.len()));
                };
                let element = join(self.doc(element, ctx, false)?);
                Rendered::one(format!("list<{element}>"), nullable)
            }
        })
    }

    fn collect_references(
        &self,
        ty: &TypeNode,
        out: &mut SmallVec<[Reference<'r>; 4]>,
    ) -> Result<()> {
        let ty = self.registry.resolve_typedefs(ty)?;
        match &ty.kind {
            TypeKind::Named(name) => {
                if Primitive::from_name(name).is_some() {
                    return Ok(());
                }
                let def = self.lookup(name)?;
                let reference = Reference {
                    name: &def.name,
                    is_enum: def.is_enum(),
                };
                if !out.contains(&reference) {
                    out.push(reference);
                }
            }
            TypeKind::Union(members) | TypeKind::Generic(_, members) => {
                for member in members {
                    self.collect_references(member, out)?;
                }
            }
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<&'r Definition> {
        self.registry.get(name).ok_or_else(|| GenError::UnknownType {
            name: name.to_string(),
        })
    }

    /// The generated definition itself is written fully qualified; every
    /// other definition is imported.
    fn qualify(&self, name: &str, ctx: TypeContext<'_>) -> String {
        if name == ctx.definition {
            format!("\\{}\\{name}", self.namespace)
        } else {
            name.to_string()
        }
    }
}

fn is_nullable(ty: &TypeNode, position: Position) -> bool {
    ty.nullable || (position.is_input() && ty.ext_attrs.has(LEGACY_NULL))
}

fn scalar(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Integer => "int",
        Primitive::Float => "float",
        Primitive::String => "string",
        Primitive::Boolean => "bool",
        Primitive::Object => "object",
        Primitive::Any => "mixed",
        Primitive::Undefined => "null",
    }
}

/// `undefined` is `void` as a result and the `null` sentinel anywhere else.
fn undefined(position: Position) -> &'static str {
    match position {
        Position::Return => "void",
        Position::Setter | Position::Argument | Position::Field => "null",
    }
}

/// Extra accepted form for inputs of a definition type.
fn alternate(kind: &DefinitionKind, position: Position, fidelity: Fidelity) -> Option<&'static str> {
    if position == Position::Return {
        return None;
    }
    match (kind, fidelity) {
        (DefinitionKind::Dictionary, Fidelity::Binding) => Some("array"),
        (DefinitionKind::Dictionary, Fidelity::Documentation) => Some("array<string, mixed>"),
        (DefinitionKind::Callback { .. } | DefinitionKind::CallbackInterface, _) => Some("callable"),
        _ => None,
    }
}

fn join(rendered: Rendered) -> String {
    let mut text = rendered.parts.join("|");
    let has_null = rendered.parts.iter().any(|part| part == "null" || part == "void");
    if rendered.nullable && !has_null {
        text.push_str("|null");
    }
    text
}

fn arity_error(kind: GenericKind, found: usize) -> GenError {
    GenError::UnsupportedType {
        detail: format!(
            "`{}` takes {} type argument(s), found {found}",
            kind.keyword(),
            kind.arity()
        ),
    }
}
