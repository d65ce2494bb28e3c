//! Go declaration and type-expression front end (Logos lexer + hand-written parser).
//!
//! - The lexer uses Logos and implements Go semicolon insertion.
//! - The parser builds an arena AST of package clause, imports, type and
//!   function declarations, and full type expressions. Bodies are skipped.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
mod parser_support;
pub mod walk;

pub use error::{line_col, Diag, DiagKind, ParseFailure};
pub use lexer::Lexer;

use ast::{AstArena, Interner, SourceFile, Symbol, TypeId};
use parser::Parser;

/// Parsed AST together with the storage its ids point into.
#[derive(Debug)]
pub struct SyntaxTree<R> {
    pub arena: AstArena,
    pub interner: Interner,
    pub root: R,
}

impl<R> SyntaxTree<R> {
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }
}

pub type ParsedFile = SyntaxTree<SourceFile>;
pub type ParsedType = SyntaxTree<TypeId>;

/// Parses a whole Go source file.
///
/// Declarations that fail to parse are replaced by `Decl::Bad` and parsing
/// continues; any diagnostic (lexical or syntactic) fails the whole call.
pub fn parse_source(src: &str) -> Result<ParsedFile, ParseFailure> {
    let mut p = Parser::new(src);
    let root = p.parse_source_file();
    finish(p, root)
}

/// Parses a single type expression such as `map[string][]*pkg.T`.
pub fn parse_type_expr(src: &str) -> Result<ParsedType, ParseFailure> {
    let mut p = Parser::new(src);
    let root = p.parse_type_expr();
    finish(p, root)
}

fn finish<R>(p: Parser<'_>, root: Result<R, Diag>) -> Result<SyntaxTree<R>, ParseFailure> {
    let Parser {
        arena,
        interner,
        mut diags,
        ..
    } = p;

    match root {
        Ok(root) if diags.is_empty() => {
            return Ok(SyntaxTree {
                arena,
                interner,
                root,
            })
        }
        Ok(_) => {}
        Err(diag) => diags.push(diag),
    }
    diags.sort_by_key(|d| d.span.start);
    Err(ParseFailure { diags })
}
