//! Conversion of syntax-tree type expressions into the [`Type`] model.

use crate::error::{Construct, TypeError};
use crate::types::{FuncType, Param, Type, TypeKind};
use goiface_syntax::ast::{
    ArrayLen, AstArena, FieldList, Interner, Results, SignatureId, Type as AstType, TypeId,
};
use goiface_syntax::SyntaxTree;
use std::collections::HashSet;

type TResult<T> = Result<T, TypeError>;

/// Converts type expressions of one parsed file.
///
/// Bare identifiers found in `local_types` are qualified with `qualifier`,
/// since the generated code refers to them from another package. An empty
/// qualifier leaves them bare.
pub struct TypeParser<'a> {
    arena: &'a AstArena,
    interner: &'a Interner,
    local_types: &'a HashSet<String>,
    qualifier: &'a str,
}

impl<'a> TypeParser<'a> {
    pub fn new<R>(
        tree: &'a SyntaxTree<R>,
        local_types: &'a HashSet<String>,
        qualifier: &'a str,
    ) -> Self {
        Self {
            arena: &tree.arena,
            interner: &tree.interner,
            local_types,
            qualifier,
        }
    }

    pub fn parse(&self, id: TypeId) -> TResult<Type> {
        let span = self.arena.types.span(id);
        let unsupported = |construct| TypeError::Unsupported { construct, span };

        Ok(match self.arena.types[id] {
            AstType::Named { pkg, name, args } => {
                if !args.is_empty() {
                    return Err(unsupported(Construct::TypeArguments));
                }
                let name = self.interner.resolve(name.sym);
                match pkg {
                    Some(pkg) => Type::selector(self.interner.resolve(pkg.sym), name),
                    None => self.ident(name),
                }
            }
            AstType::Pointer { elem, .. } => Type::pointer(self.parse(elem)?),
            AstType::Slice { elem, .. } => Type::slice(self.parse(elem)?),
            AstType::Array { len, elem, .. } => match len {
                ArrayLen::Expr { raw, .. } => {
                    Type::array(self.interner.resolve(raw), self.parse(elem)?)
                }
                ArrayLen::Ellipsis(_) => return Err(unsupported(Construct::ImplicitArrayLength)),
            },
            AstType::Map { key, val, .. } => Type::map(self.parse(key)?, self.parse(val)?),
            AstType::Chan { dir, elem, .. } => Type::chan(dir.into(), self.parse(elem)?),
            AstType::Func { sig, .. } => Type::Func(self.parse_signature(sig)?),
            AstType::Interface { elems, .. } if elems.is_empty() => Type::AnyInterface,
            AstType::Interface { .. } => return Err(unsupported(Construct::NonEmptyInterface)),
            AstType::Struct { fields, .. } if fields.is_empty() => Type::EmptyStruct,
            AstType::Struct { .. } => return Err(unsupported(Construct::NonEmptyStruct)),
            AstType::Paren { typ, .. } => self.parse(typ)?,
            AstType::Ellipsis { .. } => return Err(unsupported(Construct::MisplacedVariadic)),
            AstType::Bad(_) => return Err(unsupported(Construct::Malformed)),
        })
    }

    fn ident(&self, name: &str) -> Type {
        if !self.qualifier.is_empty() && self.local_types.contains(name) {
            Type::qualified_ident(self.qualifier, name)
        } else {
            Type::ident(name)
        }
    }

    pub fn parse_signature(&self, id: SignatureId) -> TResult<FuncType> {
        let sig = &self.arena.signatures[id];
        Ok(FuncType {
            params: self.parse_params(&sig.params)?,
            results: self.parse_results(sig.results.as_ref())?,
        })
    }

    /// Flattens a parameter list to one [`Param`] per declared name.
    pub fn parse_params(&self, list: &FieldList) -> TResult<Vec<Param>> {
        let fields = self.arena.fields_list(list.fields);
        let mut out = Vec::with_capacity(fields.len());

        for (i, &field_id) in fields.iter().enumerate() {
            let field = &self.arena.fields[field_id];
            let names = self.arena.ident_names(field.names);
            let typ = self.arena.unparen(field.typ);

            let ty = match self.arena.types[typ] {
                AstType::Ellipsis { elem, .. } => {
                    if i + 1 != fields.len() || names.len() > 1 {
                        return Err(TypeError::VariadicNotLast {
                            span: self.arena.types.span(typ),
                        });
                    }
                    Type::variadic(self.parse(elem)?)
                }
                _ => self.parse(typ)?,
            };

            match names {
                [] => out.push(Param::unnamed(ty)),
                [name] => out.push(Param::named(self.interner.resolve(name.sym), ty)),
                names => out.extend(
                    names
                        .iter()
                        .map(|name| Param::named(self.interner.resolve(name.sym), ty.clone())),
                ),
            }
        }

        Ok(out)
    }

    pub fn parse_results(&self, results: Option<&Results>) -> TResult<Vec<Param>> {
        match results {
            None => Ok(Vec::new()),
            Some(Results::Type(typ)) => Ok(vec![Param::unnamed(self.parse(*typ)?)]),
            Some(Results::Params(list)) => {
                let params = self.parse_params(list)?;
                if params.iter().any(|p| p.ty.kind() == TypeKind::Variadic) {
                    return Err(TypeError::Unsupported {
                        construct: Construct::MisplacedVariadic,
                        span: list.l_paren.to(list.r_paren),
                    });
                }
                Ok(params)
            }
        }
    }
}
