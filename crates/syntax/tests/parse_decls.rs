use goiface_syntax::ast::{
    Decl, GenDeclKind, ImportName, Spec, TopLevelDecl, Type,
};
use goiface_syntax::{line_col, parse_source, DiagKind, ParsedFile};

const SOURCE: &str = r#"// Package store is a tiny key/value store.
package store

import (
	"context"
	stdio "io"
	_ "embed"
	. "strings"
)

import "sync"

const (
	DefaultSize = 16
	maxSize     = 1 << 20
)

var ErrMissing = errors.New("missing")

// Store keeps values in memory.
type Store struct {
	mu   sync.Mutex
	data map[string][]byte
}

type (
	Key   string
	Alias = Key
	Set[T comparable] map[T]struct{}
	Block [4]byte
)

func New(size int) *Store {
	if size > maxSize {
		size = maxSize
	}
	return &Store{data: make(map[string][]byte, size)}
}

func (s *Store) Get(ctx context.Context, k Key) ([]byte, error) {
	s.mu.Lock()
	defer s.mu.Unlock()
	return s.data[string(k)], nil
}

func (Store) Dump(w stdio.Writer) {}

func Map[T, U any](xs []T, f func(T) U) []U { return nil }
"#;

fn parse() -> ParsedFile {
    parse_source(SOURCE).unwrap_or_else(|e| panic!("{e}: {:?}", e.diags))
}

#[test]
fn package_and_imports() {
    let f = parse();
    assert_eq!(f.resolve(f.root.name.sym), "store");

    let mut imports = Vec::new();
    for decl in f.arena.top_decls(f.root.decls) {
        let TopLevelDecl::Decl(id) = *decl else { continue };
        let Decl::Gen(gen) = f.arena.decls[id] else { continue };
        if gen.kind != GenDeclKind::Import {
            continue;
        }
        for spec in f.arena.specs_list(gen.specs) {
            let Spec::Import(imp) = *spec else { continue };
            let imp = f.arena.imports[imp];
            let name = match imp.name {
                None => None,
                Some(ImportName::Dot(_)) => Some(".".to_string()),
                Some(ImportName::Blank(_)) => Some("_".to_string()),
                Some(ImportName::Name(n)) => Some(f.resolve(n.sym).to_string()),
            };
            imports.push((name, f.resolve(imp.path).to_string()));
        }
    }

    assert_eq!(
        imports,
        vec![
            (None, "context".to_string()),
            (Some("stdio".to_string()), "io".to_string()),
            (Some("_".to_string()), "embed".to_string()),
            (Some(".".to_string()), "strings".to_string()),
            (None, "sync".to_string()),
        ]
    );
}

#[test]
fn value_declarations_are_kept_empty() {
    let f = parse();
    let kinds: Vec<_> = f
        .arena
        .top_decls(f.root.decls)
        .iter()
        .filter_map(|d| match *d {
            TopLevelDecl::Decl(id) => match f.arena.decls[id] {
                Decl::Gen(g) => Some((g.kind, g.specs.len())),
                Decl::Bad(_) => None,
            },
            TopLevelDecl::Func(_) => None,
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            (GenDeclKind::Import, 4),
            (GenDeclKind::Import, 1),
            (GenDeclKind::Const, 0),
            (GenDeclKind::Var, 0),
            (GenDeclKind::Type, 1),
            (GenDeclKind::Type, 4),
        ]
    );
}

#[test]
fn type_specs() {
    let f = parse();
    let specs: Vec<_> = (0..f.arena.type_specs.len() as u32)
        .map(|i| f.arena.type_specs[goiface_syntax::ast::Id::from_raw(i)])
        .collect();

    let names: Vec<_> = specs.iter().map(|s| f.resolve(s.name.sym)).collect();
    assert_eq!(names, ["Store", "Key", "Alias", "Set", "Block"]);

    assert!(specs[2].alias);
    assert!(specs[3].type_params.is_some());
    assert!(specs[4].type_params.is_none());
    assert!(matches!(f.arena.types[specs[4].typ], Type::Array { .. }));
}

#[test]
fn funcs_and_methods() {
    let f = parse();
    let funcs: Vec<_> = f
        .arena
        .top_decls(f.root.decls)
        .iter()
        .filter_map(|d| match *d {
            TopLevelDecl::Func(id) => Some(f.arena.funcs[id]),
            TopLevelDecl::Decl(_) => None,
        })
        .collect();
    assert_eq!(funcs.len(), 4);

    let new = funcs[0];
    assert!(new.recv.is_none());
    assert!(new.body.is_some());

    let get = funcs[1];
    let recv = get.recv.expect("receiver");
    assert_eq!(recv.name.map(|n| f.resolve(n.sym)), Some("s"));
    assert!(matches!(f.arena.types[recv.typ], Type::Pointer { .. }));
    let sig = f.arena.signatures[get.signature];
    assert_eq!(f.arena.fields_list(sig.params.fields).len(), 2);

    let dump = funcs[2];
    assert!(dump.recv.expect("receiver").name.is_none());

    let map = funcs[3];
    let tp = f.arena.type_params[map.type_params.expect("type params")];
    let decls = f.arena.type_param_decl_ids(tp.params);
    assert_eq!(decls.len(), 1);
    assert_eq!(f.arena.ident_names(f.arena.type_param_decls[decls[0]].names).len(), 2);
}

#[test]
fn bodyless_func_declaration() {
    let f = parse_source("package p\n\nfunc now() int64\n").expect("parse");
    let [TopLevelDecl::Func(id)] = f.arena.top_decls(f.root.decls) else {
        panic!("expected one func");
    };
    assert!(f.arena.funcs[*id].body.is_none());
}

#[test]
fn errors_are_collected_with_positions() {
    let src = "package p\n\ntype A map[string\n\ntype B int\n\nfunc (x *B) }\n";
    let err = parse_source(src).unwrap_err();
    assert_eq!(err.diags.len(), 2, "{:?}", err.diags);
    assert!(err.diags.iter().all(|d| d.kind == DiagKind::Parse));
    assert_eq!(line_col(src, err.diags[0].span.start).0, 3);
    assert_eq!(line_col(src, err.diags[1].span.start).0, 7);
}

#[test]
fn lexical_errors_fail_the_parse() {
    let err = parse_source("package p\ntype T \"unterminated\n").unwrap_err();
    assert!(err.diags.iter().any(|d| d.kind == DiagKind::Lex));
}

#[test]
fn missing_package_clause() {
    let err = parse_source("type T int\n").unwrap_err();
    assert!(err.diags[0].message.contains("expected `package`"));
}
