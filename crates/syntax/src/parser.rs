//! Recursive-descent parser for Go declarations and type expressions.
//!
//! Only the declaration level is parsed. Function bodies and the right-hand
//! sides of `const`/`var` declarations are skipped by delimiter matching,
//! which is enough to enumerate types and method signatures.

use crate::ast::*;
use crate::error::Diag;
use crate::lexer::{Lexer, Tok};
use crate::parser_support::{resolve_param_list, ParamDecl};

type PResult<T> = Result<T, Diag>;

pub struct Parser<'src> {
    src: &'src str,
    toks: Vec<(usize, Tok<'src>, usize)>,
    pos: usize,
    prev_end: usize,
    pub(crate) arena: AstArena,
    pub(crate) interner: Interner,
    pub(crate) diags: Vec<Diag>,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str) -> Self {
        let mut lexer = Lexer::new(src);
        let toks: Vec<_> = lexer.by_ref().collect();
        let diags = lexer.take_diags();
        Self {
            src,
            toks,
            pos: 0,
            prev_end: 0,
            arena: AstArena::new(),
            interner: Interner::new(),
            diags,
        }
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    #[inline]
    fn peek(&self) -> Option<Tok<'src>> {
        self.peek_at(0)
    }

    #[inline]
    fn peek_at(&self, n: usize) -> Option<Tok<'src>> {
        self.toks.get(self.pos + n).map(|&(_, t, _)| t)
    }

    #[inline]
    fn at(&self, tok: Tok<'_>) -> bool {
        self.peek() == Some(tok)
    }

    #[inline]
    fn at_ident(&self) -> bool {
        matches!(self.peek(), Some(Tok::Ident(_)))
    }

    /// Span of the current token, or an empty span at EOF.
    #[inline]
    fn here(&self) -> Span {
        match self.toks.get(self.pos) {
            Some(&(s, _, e)) => Span::new(s, e),
            None => Span::empty_at(self.src.len()),
        }
    }

    #[inline]
    fn start(&self) -> usize {
        self.here().start as usize
    }

    #[inline]
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    fn bump(&mut self) -> Span {
        let span = self.here();
        if self.pos < self.toks.len() {
            self.prev_end = span.end as usize;
            self.pos += 1;
        }
        span
    }

    fn eat(&mut self, tok: Tok<'_>) -> Option<Span> {
        self.at(tok).then(|| self.bump())
    }

    fn expect(&mut self, tok: Tok<'_>, what: &str) -> PResult<Span> {
        self.eat(tok).ok_or_else(|| self.unexpected(what))
    }

    fn expect_ident(&mut self) -> PResult<IdentName> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                let pos = self.bump();
                let sym = self.interner.intern(name);
                Ok(IdentName { sym, pos })
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// A `;` terminator, which Go lets you omit before a closing `)` or `}`.
    fn expect_terminator(&mut self, close: Tok<'_>) -> PResult<()> {
        if self.eat(Tok::Semi).is_some() || self.at(close) {
            Ok(())
        } else {
            Err(self.unexpected("`;` or newline"))
        }
    }

    fn unexpected(&self, expected: &str) -> Diag {
        let found = match self.peek() {
            Some(tok) => tok.to_string(),
            None => "EOF".to_string(),
        };
        Diag::parse(self.here(), format!("unexpected {found}; expected {expected}"))
    }

    /// Index of the token after the bracket group opening at `open`, which
    /// must be a `[`.
    fn after_brackets(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, &(_, tok, _)) in self.toks.iter().enumerate().skip(open) {
            match tok {
                Tok::LBrack => depth += 1,
                Tok::RBrack => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// True when the bracket group at `self.pos + n` is followed by one of `follow`.
    fn brackets_followed_by(&self, n: usize, follow: &[Tok<'_>]) -> bool {
        self.after_brackets(self.pos + n)
            .and_then(|i| self.toks.get(i))
            .is_some_and(|(_, tok, _)| follow.contains(tok))
    }

    /// Skips a balanced `open ... close` group, both included.
    fn skip_balanced(&mut self, open: Tok<'_>, close: Tok<'_>, what: &str) -> PResult<(Span, Span)> {
        let l = self.expect(open, what)?;
        let mut depth = 1usize;
        loop {
            match self.peek() {
                None => {
                    return Err(Diag::parse(l, format!("unterminated {what}")));
                }
                Some(tok) if tok == close => {
                    depth -= 1;
                    let r = self.bump();
                    if depth == 0 {
                        return Ok((l, r));
                    }
                }
                Some(tok) if tok == open => {
                    depth += 1;
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Error recovery: skip to the next `;` that is outside any delimiters or
    /// directly precedes a declaration keyword, and consume it.
    fn recover(&mut self, start: usize) -> Span {
        let mut depth = 0i32;
        while let Some(tok) = self.peek() {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => depth -= 1,
                Tok::Semi if depth <= 0 || self.peek_at(1).is_some_and(starts_decl) => {
                    self.bump();
                    break;
                }
                _ => {}
            }
            self.bump();
        }
        self.span_from(start)
    }

    // =========================================================================
    // Source file
    // =========================================================================

    pub fn parse_source_file(&mut self) -> PResult<SourceFile> {
        let package_pos = self.expect(Tok::KwPackage, "`package`")?;
        let name = self.expect_ident()?;
        if self.peek().is_some() {
            self.expect(Tok::Semi, "`;` or newline after package clause")?;
        }

        let mut decls = Vec::new();
        while self.peek().is_some() {
            if self.eat(Tok::Semi).is_some() {
                continue;
            }

            let start = self.start();
            match self.parse_top_level_decl() {
                Ok(decl) => decls.push(decl),
                Err(diag) => {
                    self.diags.push(diag);
                    let span = self.recover(start);
                    let id = self.arena.decls.alloc(Decl::Bad(span), span);
                    decls.push(TopLevelDecl::Decl(id));
                }
            }
        }

        let decls = self.arena.list_top_decls(decls);
        Ok(SourceFile {
            package_pos,
            name,
            decls,
        })
    }

    fn parse_top_level_decl(&mut self) -> PResult<TopLevelDecl> {
        let decl = match self.peek() {
            Some(Tok::KwImport) => TopLevelDecl::Decl(self.parse_gen_decl(GenDeclKind::Import)?),
            Some(Tok::KwType) => TopLevelDecl::Decl(self.parse_gen_decl(GenDeclKind::Type)?),
            Some(Tok::KwConst) => TopLevelDecl::Decl(self.skip_value_decl(GenDeclKind::Const)?),
            Some(Tok::KwVar) => TopLevelDecl::Decl(self.skip_value_decl(GenDeclKind::Var)?),
            Some(Tok::KwFunc) => TopLevelDecl::Func(self.parse_func_decl()?),
            _ => return Err(self.unexpected("declaration")),
        };

        if self.peek().is_some() {
            self.expect(Tok::Semi, "`;` or newline after declaration")?;
        }
        Ok(decl)
    }

    fn parse_gen_decl(&mut self, kind: GenDeclKind) -> PResult<DeclId> {
        let start = self.start();
        let kw_pos = self.bump();

        let mut specs = Vec::new();
        let (l_paren, r_paren) = if let Some(l) = self.eat(Tok::LParen) {
            while !self.at(Tok::RParen) && self.peek().is_some() {
                specs.push(self.parse_spec(kind)?);
                self.expect_terminator(Tok::RParen)?;
            }
            let r = self.expect(Tok::RParen, "`)`")?;
            (Some(l), Some(r))
        } else {
            specs.push(self.parse_spec(kind)?);
            (None, None)
        };

        let specs = self.arena.list_specs(specs);
        let decl = Decl::Gen(GenDecl {
            kw_pos,
            kind,
            l_paren,
            specs,
            r_paren,
        });
        let span = self.span_from(start);
        Ok(self.arena.decls.alloc(decl, span))
    }

    fn parse_spec(&mut self, kind: GenDeclKind) -> PResult<Spec> {
        match kind {
            GenDeclKind::Import => self.parse_import_spec().map(Spec::Import),
            GenDeclKind::Type => self.parse_type_spec().map(Spec::Type),
            GenDeclKind::Const | GenDeclKind::Var => Err(self.unexpected("import or type spec")),
        }
    }

    fn parse_import_spec(&mut self) -> PResult<ImportSpecId> {
        let start = self.start();
        let name = match self.peek() {
            Some(Tok::Dot) => Some(ImportName::Dot(self.bump())),
            Some(Tok::Ident("_")) => Some(ImportName::Blank(self.bump())),
            Some(Tok::Ident(_)) => Some(ImportName::Name(self.expect_ident()?)),
            _ => None,
        };

        let (path, path_pos) = match self.peek() {
            Some(Tok::StringLit(raw) | Tok::RawStringLit(raw)) => {
                let pos = self.bump();
                let unquoted = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
                (self.interner.intern(unquoted), pos)
            }
            _ => return Err(self.unexpected("import path")),
        };

        let span = self.span_from(start);
        Ok(self.arena.imports.alloc(
            ImportSpec {
                name,
                path,
                path_pos,
            },
            span,
        ))
    }

    fn parse_type_spec(&mut self) -> PResult<TypeSpecId> {
        let start = self.start();
        let name = self.expect_ident()?;
        let type_params = if self.at_type_params() {
            Some(self.parse_type_params()?)
        } else {
            None
        };
        let assign_pos = self.eat(Tok::Assign);
        let typ = self.parse_type()?;

        let span = self.span_from(start);
        Ok(self.arena.type_specs.alloc(
            TypeSpec {
                name,
                type_params,
                assign_pos,
                typ,
                alias: assign_pos.is_some(),
            },
            span,
        ))
    }

    /// `type T[P any]` versus `type T [N]int`: a bracket opening with an
    /// identifier that is directly followed by the start of a constraint.
    fn at_type_params(&self) -> bool {
        self.at(Tok::LBrack)
            && matches!(self.peek_at(1), Some(Tok::Ident(_)))
            && matches!(
                self.peek_at(2),
                Some(
                    Tok::Ident(_)
                        | Tok::Comma
                        | Tok::Tilde
                        | Tok::LBrack
                        | Tok::LParen
                        | Tok::KwInterface
                        | Tok::KwFunc
                        | Tok::KwMap
                        | Tok::KwChan
                        | Tok::KwStruct
                )
            )
    }

    fn parse_type_params(&mut self) -> PResult<TypeParamsId> {
        let start = self.start();
        let l_brack = self.expect(Tok::LBrack, "`[`")?;

        let mut decls = Vec::new();
        loop {
            let decl_start = self.start();
            let mut names = vec![self.expect_ident()?];
            while self.eat(Tok::Comma).is_some() {
                names.push(self.expect_ident()?);
            }
            let constraint = self.parse_type_elem()?;
            let names = self.arena.list_ident_names(names);
            let span = self.span_from(decl_start);
            decls.push(
                self.arena
                    .type_param_decls
                    .alloc(TypeParamDecl { names, constraint }, span),
            );

            if self.eat(Tok::Comma).is_none() || self.at(Tok::RBrack) {
                break;
            }
        }

        let r_brack = self.expect(Tok::RBrack, "`]`")?;
        let params = self.arena.list_type_param_decl_ids(decls);
        let span = self.span_from(start);
        Ok(self.arena.type_params.alloc(
            TypeParams {
                l_brack,
                params,
                r_brack,
            },
            span,
        ))
    }

    fn parse_type_elem(&mut self) -> PResult<TypeElem> {
        let mut terms = Vec::new();
        loop {
            let term = match self.eat(Tok::Tilde) {
                Some(tilde_pos) => TypeTerm::Tilde {
                    tilde_pos,
                    typ: self.parse_type()?,
                },
                None => TypeTerm::Type {
                    typ: self.parse_type()?,
                },
            };
            terms.push(term);
            if self.eat(Tok::Pipe).is_none() {
                break;
            }
        }
        Ok(TypeElem {
            terms: self.arena.list_type_terms(terms),
        })
    }

    fn skip_value_decl(&mut self, kind: GenDeclKind) -> PResult<DeclId> {
        let start = self.start();
        let kw_pos = self.bump();

        let (l_paren, r_paren) = if self.at(Tok::LParen) {
            let (l, r) = self.skip_balanced(Tok::LParen, Tok::RParen, "declaration group")?;
            (Some(l), Some(r))
        } else {
            let mut depth = 0usize;
            while let Some(tok) = self.peek() {
                match tok {
                    Tok::Semi if depth == 0 => break,
                    Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                    Tok::RParen | Tok::RBrack | Tok::RBrace => {
                        depth = depth
                            .checked_sub(1)
                            .ok_or_else(|| self.unexpected("end of declaration"))?;
                    }
                    _ => {}
                }
                self.bump();
            }
            (None, None)
        };

        let decl = Decl::Gen(GenDecl {
            kw_pos,
            kind,
            l_paren,
            specs: ListRef::EMPTY,
            r_paren,
        });
        let span = self.span_from(start);
        Ok(self.arena.decls.alloc(decl, span))
    }

    fn parse_func_decl(&mut self) -> PResult<FuncDeclId> {
        let start = self.start();
        let func_pos = self.expect(Tok::KwFunc, "`func`")?;
        let recv = if self.at(Tok::LParen) {
            Some(self.parse_receiver()?)
        } else {
            None
        };
        let name = self.expect_ident()?;
        let type_params = if self.at(Tok::LBrack) {
            Some(self.parse_type_params()?)
        } else {
            None
        };
        let signature = self.parse_signature()?;
        let body = if self.at(Tok::LBrace) {
            let (l_brace, r_brace) = self.skip_balanced(Tok::LBrace, Tok::RBrace, "function body")?;
            Some(Block { l_brace, r_brace })
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(self.arena.funcs.alloc(
            FuncDecl {
                func_pos,
                recv,
                name,
                type_params,
                signature,
                body,
            },
            span,
        ))
    }

    fn parse_receiver(&mut self) -> PResult<Receiver> {
        let l_paren = self.expect(Tok::LParen, "`(`")?;
        let name = match (self.peek(), self.peek_at(1)) {
            (Some(Tok::Ident(_)), Some(Tok::Ident(_) | Tok::Star | Tok::LParen)) => {
                Some(self.expect_ident()?)
            }
            _ => None,
        };
        let typ = self.parse_type()?;
        self.eat(Tok::Comma);
        let r_paren = self.expect(Tok::RParen, "`)`")?;
        Ok(Receiver {
            l_paren,
            name,
            typ,
            r_paren,
        })
    }

    // =========================================================================
    // Signatures and parameters
    // =========================================================================

    fn parse_signature(&mut self) -> PResult<SignatureId> {
        let start = self.start();
        let params = self.parse_parameters()?;
        let results = if self.at(Tok::LParen) {
            Some(Results::Params(self.parse_parameters()?))
        } else if self.peek().is_some_and(starts_type) {
            Some(Results::Type(self.parse_type()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(self
            .arena
            .signatures
            .alloc(Signature { params, results }, span))
    }

    fn parse_parameters(&mut self) -> PResult<FieldList> {
        let l_paren = self.expect(Tok::LParen, "`(`")?;

        let mut entries = Vec::new();
        while !self.at(Tok::RParen) {
            entries.push(self.parse_param_entry()?);
            if self.eat(Tok::Comma).is_none() {
                break;
            }
        }
        let r_paren = self.expect(Tok::RParen, "`)`")?;

        let fields = resolve_param_list(&mut self.arena, entries)?;
        Ok(FieldList {
            l_paren,
            fields: self.arena.list_fields(fields),
            r_paren,
        })
    }

    fn parse_param_entry(&mut self) -> PResult<ParamDecl> {
        let start = self.start();

        if !self.at_ident() {
            let typ = self.parse_param_type()?;
            return Ok(ParamDecl {
                names: Vec::new(),
                typ: Some(typ),
                span: self.span_from(start),
            });
        }

        let is_type_only = match self.peek_at(1) {
            Some(Tok::Comma | Tok::RParen) => {
                let name = self.expect_ident()?;
                return Ok(ParamDecl {
                    names: vec![name],
                    typ: None,
                    span: self.span_from(start),
                });
            }
            Some(Tok::Dot) => true,
            Some(Tok::LBrack) => self.brackets_followed_by(1, &[Tok::Comma, Tok::RParen]),
            Some(Tok::Ellipsis) => false,
            Some(tok) => !starts_type(tok),
            None => true,
        };

        if is_type_only {
            let typ = self.parse_type()?;
            return Ok(ParamDecl {
                names: Vec::new(),
                typ: Some(typ),
                span: self.span_from(start),
            });
        }

        let name = self.expect_ident()?;
        let typ = self.parse_param_type()?;
        Ok(ParamDecl {
            names: vec![name],
            typ: Some(typ),
            span: self.span_from(start),
        })
    }

    /// A parameter type, which unlike other types may be variadic.
    fn parse_param_type(&mut self) -> PResult<TypeId> {
        let start = self.start();
        match self.eat(Tok::Ellipsis) {
            Some(ellipsis_pos) => {
                let elem = self.parse_type()?;
                let span = self.span_from(start);
                Ok(self
                    .arena
                    .types
                    .alloc(Type::Ellipsis { ellipsis_pos, elem }, span))
            }
            None => self.parse_type(),
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn parse_type(&mut self) -> PResult<TypeId> {
        let start = self.start();
        let typ = match self.peek() {
            Some(Tok::Ident(_)) => return self.parse_type_name(),
            Some(Tok::Star) => {
                let star_pos = self.bump();
                Type::Pointer {
                    star_pos,
                    elem: self.parse_type()?,
                }
            }
            Some(Tok::LBrack) => self.parse_array_or_slice()?,
            Some(Tok::KwMap) => {
                let map_pos = self.bump();
                self.expect(Tok::LBrack, "`[`")?;
                let key = self.parse_type()?;
                self.expect(Tok::RBrack, "`]`")?;
                let val = self.parse_type()?;
                Type::Map { map_pos, key, val }
            }
            Some(Tok::KwChan) => {
                let chan_pos = self.bump();
                let dir = if self.eat(Tok::Arrow).is_some() {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Type::Chan {
                    dir,
                    chan_pos,
                    elem: self.parse_type()?,
                }
            }
            Some(Tok::Arrow) => {
                self.bump();
                let chan_pos = self.expect(Tok::KwChan, "`chan`")?;
                Type::Chan {
                    dir: ChanDir::Recv,
                    chan_pos,
                    elem: self.parse_type()?,
                }
            }
            Some(Tok::KwFunc) => {
                let func_pos = self.bump();
                Type::Func {
                    func_pos,
                    sig: self.parse_signature()?,
                }
            }
            Some(Tok::KwStruct) => self.parse_struct_type()?,
            Some(Tok::KwInterface) => self.parse_interface_type()?,
            Some(Tok::LParen) => {
                let l_paren = self.bump();
                let typ = self.parse_type()?;
                self.expect(Tok::RParen, "`)`")?;
                Type::Paren { l_paren, typ }
            }
            _ => return Err(self.unexpected("type")),
        };

        let span = self.span_from(start);
        Ok(self.arena.types.alloc(typ, span))
    }

    fn parse_type_name(&mut self) -> PResult<TypeId> {
        let start = self.start();
        let first = self.expect_ident()?;
        let (pkg, name) = if self.eat(Tok::Dot).is_some() {
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };

        let args = if self.at(Tok::LBrack) {
            self.bump();
            let mut args = Vec::new();
            while !self.at(Tok::RBrack) {
                args.push(self.parse_type()?);
                if self.eat(Tok::Comma).is_none() {
                    break;
                }
            }
            self.expect(Tok::RBrack, "`]`")?;
            self.arena.list_types(args)
        } else {
            ListRef::EMPTY
        };

        let span = self.span_from(start);
        Ok(self.arena.types.alloc(Type::Named { pkg, name, args }, span))
    }

    fn parse_array_or_slice(&mut self) -> PResult<Type> {
        let l_brack = self.bump();

        if self.eat(Tok::RBrack).is_some() {
            return Ok(Type::Slice {
                l_brack,
                elem: self.parse_type()?,
            });
        }

        let len = if self.at(Tok::Ellipsis) && self.peek_at(1) == Some(Tok::RBrack) {
            let pos = self.bump();
            ArrayLen::Ellipsis(pos)
        } else {
            let open = self.pos - 1;
            let close = self
                .after_brackets(open)
                .map(|i| i - 1)
                .ok_or_else(|| Diag::parse(l_brack, "unterminated array length"))?;
            let first = self.here();
            while self.pos < close {
                self.bump();
            }
            let span = Span::new(first.start as usize, self.prev_end);
            let raw = self
                .src
                .get(span.start as usize..span.end as usize)
                .unwrap_or_default()
                .trim();
            ArrayLen::Expr {
                raw: self.interner.intern(raw),
                span,
            }
        };
        self.expect(Tok::RBrack, "`]`")?;

        Ok(Type::Array {
            l_brack,
            len,
            elem: self.parse_type()?,
        })
    }

    fn parse_struct_type(&mut self) -> PResult<Type> {
        let struct_pos = self.bump();
        self.expect(Tok::LBrace, "`{`")?;

        let mut fields = Vec::new();
        while !self.at(Tok::RBrace) && self.peek().is_some() {
            fields.push(self.parse_field_decl()?);
            self.expect_terminator(Tok::RBrace)?;
        }
        self.expect(Tok::RBrace, "`}`")?;

        Ok(Type::Struct {
            struct_pos,
            fields: self.arena.list_fields(fields),
        })
    }

    fn parse_field_decl(&mut self) -> PResult<FieldId> {
        const FIELD_END: &[Tok<'static>] = &[Tok::Semi, Tok::RBrace];
        let start = self.start();

        let embedded = match (self.peek(), self.peek_at(1)) {
            (Some(Tok::Star), _) => true,
            (Some(Tok::Ident(_)), Some(Tok::Dot)) => true,
            (Some(Tok::Ident(_)), Some(Tok::LBrack)) => {
                self.brackets_followed_by(1, FIELD_END)
                    || matches!(
                        self.after_brackets(self.pos + 1)
                            .and_then(|i| self.toks.get(i)),
                        Some((_, Tok::StringLit(_) | Tok::RawStringLit(_), _))
                    )
            }
            (
                Some(Tok::Ident(_)),
                None | Some(Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_)),
            ) => true,
            _ => false,
        };

        let (names, typ) = if embedded {
            (ListRef::EMPTY, self.parse_type()?)
        } else {
            let mut names = vec![self.expect_ident()?];
            while self.eat(Tok::Comma).is_some() {
                names.push(self.expect_ident()?);
            }
            let typ = self.parse_type()?;
            (self.arena.list_ident_names(names), typ)
        };

        let tag = match self.peek() {
            Some(Tok::StringLit(_) | Tok::RawStringLit(_)) => Some(self.bump()),
            _ => None,
        };

        let span = self.span_from(start);
        Ok(self.arena.fields.alloc(
            Field {
                names,
                typ,
                tag,
                is_embed: embedded,
            },
            span,
        ))
    }

    fn parse_interface_type(&mut self) -> PResult<Type> {
        let interface_pos = self.bump();
        self.expect(Tok::LBrace, "`{`")?;

        let mut elems = Vec::new();
        while !self.at(Tok::RBrace) && self.peek().is_some() {
            let elem = match (self.peek(), self.peek_at(1)) {
                (Some(Tok::Ident(_)), Some(Tok::LParen)) => {
                    let name = self.expect_ident()?;
                    InterfaceElem::Method {
                        name,
                        sig: self.parse_signature()?,
                    }
                }
                _ => InterfaceElem::TypeElem(self.parse_type_elem()?),
            };
            elems.push(elem);
            self.expect_terminator(Tok::RBrace)?;
        }
        self.expect(Tok::RBrace, "`}`")?;

        Ok(Type::Interface {
            interface_pos,
            elems: self.arena.list_interface_elems(elems),
        })
    }

    /// Parses a standalone type expression, allowing a trailing `;`.
    pub fn parse_type_expr(&mut self) -> PResult<TypeId> {
        let typ = self.parse_type()?;
        self.eat(Tok::Semi);
        match self.peek() {
            None => Ok(typ),
            Some(_) => Err(self.unexpected("end of type expression")),
        }
    }
}

#[inline]
fn starts_decl(tok: Tok<'_>) -> bool {
    matches!(
        tok,
        Tok::KwImport | Tok::KwType | Tok::KwFunc | Tok::KwConst | Tok::KwVar
    )
}

/// Tokens that can begin a type.
#[inline]
fn starts_type(tok: Tok<'_>) -> bool {
    matches!(
        tok,
        Tok::Ident(_)
            | Tok::Star
            | Tok::LBrack
            | Tok::LParen
            | Tok::Arrow
            | Tok::KwMap
            | Tok::KwChan
            | Tok::KwFunc
            | Tok::KwStruct
            | Tok::KwInterface
    )
}
