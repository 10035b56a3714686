//! Per-file output state shared by the builders.

use idl_diagnostic::Result;
use idl_emit::{LineBuffer, Marker};
use idl_ir::{Argument, Definition, Signature, TypeNode};
use idl_registry::Registry;
use idl_types::{map_literal, Position, TypeContext, TypeMapper};

use crate::php::{self, MethodSig, Param};
use crate::{Access, Artifact, ArtifactKind, BuildContext, ImportTracker};

/// The file being generated for one (definition, kind) pair.
pub struct ArtifactWriter<'r> {
    registry: &'r Registry,
    mapper: TypeMapper<'r>,
    definition: &'r Definition,
    kind: ArtifactKind,
    imports: ImportTracker,
    imports_at: Marker,
    pub buf: LineBuffer,
}

impl<'r> ArtifactWriter<'r> {
    /// Start a file: `<?php`, strict types, namespace, import placeholder.
    pub fn new(cx: &BuildContext<'r>, definition: &'r Definition, kind: ArtifactKind) -> Self {
        let mut buf = LineBuffer::new();
        buf.line("<?php");
        buf.blank();
        buf.line("declare(strict_types=1);");
        buf.blank();
        buf.line(format!("namespace {};", kind.namespace(cx.namespace())));
        buf.blank();
        let imports_at = buf.marker();

        Self {
            registry: cx.registry(),
            mapper: TypeMapper::new(cx.registry(), cx.namespace()),
            definition,
            kind,
            imports: ImportTracker::new(definition.name.clone()),
            imports_at,
            buf,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn mapper(&self) -> TypeMapper<'r> {
        self.mapper
    }

    pub fn definition(&self) -> &'r Definition {
        self.definition
    }

    pub fn name(&self) -> &'r str {
        &self.definition.name
    }

    pub fn namespace(&self) -> &'r str {
        self.mapper.namespace()
    }

    /// `\{ns}\{Kind}\{name}`.
    pub fn qualified(&self, kind: ArtifactKind, name: &str) -> String {
        kind.qualify(self.namespace(), name)
    }

    /// Binding and documentation type of `ty`, recording its references.
    pub fn ty(&mut self, ty: &TypeNode, position: Position) -> Result<(String, String)> {
        let ctx = TypeContext::new(&self.definition.name, position);
        let binding = self.mapper.binding(ty, ctx)?;
        let doc = self.mapper.documentation(ty, ctx)?;
        for reference in self.mapper.references(ty)? {
            self.imports.note(reference, Access::Type);
        }
        Ok((binding, doc))
    }

    /// Import `name` for use as a class (`Name::cast(...)`), returning the
    /// spelling to write.
    pub fn class_ref(&mut self, name: &str) -> String {
        if name == self.definition.name {
            return self.qualified(ArtifactKind::Contract, name);
        }
        self.imports.note_name(name);
        name.to_string()
    }

    pub fn imports(&self) -> &ImportTracker {
        &self.imports
    }

    pub fn param(&mut self, argument: &Argument) -> Result<Param> {
        let (binding, doc) = self.ty(&argument.ty, Position::Argument)?;
        let mut param = Param::new(&argument.name, binding, doc);
        if argument.variadic {
            param.variadic = true;
        } else if argument.optional {
            let default = match &argument.default {
                Some(literal) => map_literal(literal)?,
                None => "null".to_string(),
            };
            param = param.with_default(default);
        }
        Ok(param)
    }

    pub fn params(&mut self, arguments: &[Argument]) -> Result<Vec<Param>> {
        arguments.iter().map(|argument| self.param(argument)).collect()
    }

    /// One method from all overloads of an operation.
    pub fn operation(
        &mut self,
        name: &str,
        overloads: &[&Signature],
        is_static: bool,
    ) -> Result<MethodSig> {
        let mut sigs = Vec::with_capacity(overloads.len());
        for signature in overloads {
            let (ret, ret_doc) = self.ty(&signature.ret, Position::Return)?;
            sigs.push(
                MethodSig::new(name)
                    .with_params(self.params(&signature.arguments)?)
                    .returning(ret, ret_doc)
                    .with_static(is_static),
            );
        }
        Ok(php::merge_overloads(name, sigs))
    }

    /// `__construct` from all constructor overloads.
    pub fn constructor(&mut self, overloads: &[&[Argument]]) -> Result<MethodSig> {
        let mut sigs = Vec::with_capacity(overloads.len());
        for arguments in overloads {
            sigs.push(MethodSig::new("__construct").with_params(self.params(arguments)?));
        }
        Ok(php::merge_overloads("__construct", sigs))
    }

    pub fn getter(&mut self, name: &str, ty: &TypeNode, is_static: bool) -> Result<MethodSig> {
        let (ret, ret_doc) = self.ty(ty, Position::Return)?;
        Ok(MethodSig::new(name)
            .returning(ret, ret_doc)
            .with_static(is_static))
    }

    pub fn setter(&mut self, name: &str, ty: &TypeNode, is_static: bool) -> Result<MethodSig> {
        let (binding, doc) = self.ty(ty, Position::Setter)?;
        Ok(MethodSig::new(name)
            .with_params(vec![Param::new("value", binding, doc)])
            .returning("void", "void")
            .with_static(is_static))
    }

    /// `getIterator(): \Iterator` documented with its key and value types.
    pub fn iterator(
        &mut self,
        name: &str,
        key: Option<&TypeNode>,
        value: &TypeNode,
    ) -> Result<MethodSig> {
        let key = match key {
            Some(key) => self.ty(key, Position::Return)?.1,
            None => "int".to_string(),
        };
        let (_, value) = self.ty(value, Position::Return)?;
        Ok(MethodSig::new(name)
            .returning("\\Iterator", format!("\\Iterator<{key}, {value}>")))
    }

    /// Docblock and `;`-terminated declaration.
    pub fn declare(&mut self, sig: &MethodSig, modifiers: &str) {
        self.buf.lines(php::doc_block(&sig.doc_lines()));
        self.buf.line(format!("{};", sig.declaration(modifiers)));
        self.buf.blank();
    }

    /// Docblock, declaration and body.
    pub fn define<F>(&mut self, sig: &MethodSig, modifiers: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.buf.lines(php::doc_block(&sig.doc_lines()));
        self.buf.line(sig.declaration(modifiers));
        self.buf.line("{");
        self.buf.indent();
        let result = body(self);
        self.buf.dedent();
        self.buf.line("}");
        self.buf.blank();
        result
    }

    /// A method whose body throws "not implemented".
    pub fn stub(&mut self, sig: &MethodSig) -> Result<()> {
        let line = php::not_implemented(&self.definition.name, &sig.name);
        self.define(sig, "public", |w| {
            w.buf.line(&line);
            Ok(())
        })
    }

    /// Fill the import placeholder and render.
    pub fn finish(mut self) -> Artifact {
        let lines = self.imports.lines(self.namespace());
        self.buf.fill(self.imports_at, lines);
        tracing::trace!(
            definition = %self.definition.name,
            kind = ?self.kind,
            imports = self.imports.len(),
            "artifact written"
        );
        Artifact::Generated(self.buf.finish())
    }
}
