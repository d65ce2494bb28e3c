use crate::ast::{self, Span};
use crate::error::Diag;

/// One comma-separated entry of a parameter list, before Go's
/// named/unnamed rule has been applied.
///
/// `a` alone is `{ names: [a], typ: None }`, `a int` is
/// `{ names: [a], typ: Some(int) }`, `[]byte` is `{ names: [], typ: Some(..) }`.
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub names: Vec<ast::IdentName>,
    pub typ: Option<ast::TypeId>,
    pub span: Span,
}

impl ParamDecl {
    #[inline]
    fn is_named(&self) -> bool {
        self.typ.is_some() && !self.names.is_empty()
    }
}

/// Applies Go's parameter-list rule: if any entry is `name Type`, all of
/// them are named and bare identifiers are grouped onto the next type
/// (`a, b int`); otherwise every entry, bare identifiers included, is a type.
pub fn resolve_param_list(
    arena: &mut ast::AstArena,
    params: Vec<ParamDecl>,
) -> Result<Vec<ast::FieldId>, Diag> {
    if !params.iter().any(ParamDecl::is_named) {
        return Ok(params
            .into_iter()
            .map(|param| {
                let typ = match (param.typ, param.names.first()) {
                    (Some(typ), _) => typ,
                    (None, Some(&name)) => named_type_from_ident(arena, name),
                    (None, None) => arena.types.alloc(ast::Type::Bad(param.span), param.span),
                };
                alloc_field(arena, ast::ListRef::EMPTY, typ, param.span)
            })
            .collect());
    }

    let mut out = Vec::with_capacity(params.len());
    let mut pending_names: Vec<ast::IdentName> = Vec::new();
    let mut pending_start: Option<u32> = None;

    for param in params {
        match param.typ {
            Some(typ) => {
                if param.names.is_empty() {
                    return Err(Diag::parse(param.span, "mixed named and unnamed parameters"));
                }
                let mut names = std::mem::take(&mut pending_names);
                names.extend(param.names);
                let names_ref = arena.list_ident_names(names);
                let span = Span {
                    start: pending_start.take().unwrap_or(param.span.start),
                    end: param.span.end,
                };
                out.push(alloc_field(arena, names_ref, typ, span));
            }
            None => {
                pending_start.get_or_insert(param.span.start);
                pending_names.extend(param.names);
            }
        }
    }

    if let Some(name) = pending_names.first() {
        return Err(Diag::parse(name.pos, "mixed named and unnamed parameters"));
    }

    Ok(out)
}

fn alloc_field(
    arena: &mut ast::AstArena,
    names: ast::ListRef<ast::IdentName>,
    typ: ast::TypeId,
    span: Span,
) -> ast::FieldId {
    arena.fields.alloc(
        ast::Field {
            names,
            typ,
            tag: None,
            is_embed: false,
        },
        span,
    )
}

fn named_type_from_ident(arena: &mut ast::AstArena, name: ast::IdentName) -> ast::TypeId {
    arena.types.alloc(
        ast::Type::Named {
            pkg: None,
            name,
            args: ast::ListRef::EMPTY,
        },
        name.pos,
    )
}
