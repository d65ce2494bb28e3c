use goiface::{find_source_files, generate, Construct, Error, Options, TypeError};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const STORE: &str = indoc! {r#"
    // Package store keeps records.
    package store

    import (
        "context"
        "io"

        kv "github.com/acme/kv/v2"
    )

    // Store persists records.
    type Store struct {
        db *kv.DB
    }

    type Record struct{ ID string }

    type cursor struct{}

    func New(db *kv.DB) *Store { return &Store{db: db} }

    func (s *Store) Get(ctx context.Context, id string) (*Record, error) {
        if id == "" {
            return nil, nil
        }
        return &Record{ID: id}, nil
    }

    func (s *Store) Put(ctx context.Context, recs ...Record) error { return nil }

    func (s Store) Dump(w io.Writer) (n int64, err error) {
        return 0, nil
    }

    func (s *Store) close() {}
"#};

const ITER: &str = indoc! {r#"
    package store

    import kvstore "github.com/acme/kv/v2"

    func (s *Store) Scan(prefix string, fn func(k, v []byte) bool) kvstore.Stats {
        return kvstore.Stats{}
    }

    func (c *cursor) Next() bool { return false }
"#};

const GEN: &str = indoc! {r#"
    //go:build ignore

    package main

    func (s *Store) Hidden() {}
"#};

fn package_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, src) in files {
        fs::write(dir.path().join(name), src).expect("write source");
    }
    dir
}

fn options(dir: &Path, struct_name: &str, source_import_path: Option<&str>) -> Options {
    Options {
        files: find_source_files(dir).expect("list files"),
        struct_name: struct_name.into(),
        interface_name: format!("{struct_name}API"),
        output_package: "api".into(),
        source_import_path: source_import_path.map(str::to_owned),
    }
}

fn generate_string(opts: &Options) -> String {
    let out = generate(opts).unwrap_or_else(|e| panic!("generate: {e}"));
    String::from_utf8(out).expect("utf-8 output")
}

#[test]
fn finds_package_files_only() {
    let dir = package_dir(&[
        ("store.go", STORE),
        ("store_test.go", "package store\n"),
        ("README.md", "# store\n"),
        ("iter.go", ITER),
    ]);
    fs::create_dir(dir.path().join("internal")).expect("mkdir");
    fs::write(dir.path().join("internal/x.go"), "package internal\n").expect("write");

    let files = find_source_files(dir.path()).expect("list files");
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().and_then(|n| n.to_str()).unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["iter.go", "store.go"]);
}

#[test]
fn generates_interface_from_all_package_files() {
    let dir = package_dir(&[("store.go", STORE), ("iter.go", ITER), ("gen.go", GEN)]);
    let opts = options(dir.path(), "Store", Some("github.com/acme/store"));

    let want = concat!(
        "// Code generated by goiface. DO NOT EDIT.\n",
        "\n",
        "package api\n",
        "\n",
        "import (\n",
        "\t\"context\"\n",
        "\tkvstore \"github.com/acme/kv/v2\"\n",
        "\t\"github.com/acme/store\"\n",
        "\t\"io\"\n",
        ")\n",
        "\n",
        "type StoreAPI interface {\n",
        "\tScan(prefix string, fn func([]byte, []byte) bool) kvstore.Stats\n",
        "\tGet(ctx context.Context, id string) (*store.Record, error)\n",
        "\tPut(ctx context.Context, recs ...store.Record) error\n",
        "\tDump(w io.Writer) (n int64, err error)\n",
        "}\n",
    );
    assert_eq!(generate_string(&opts), want);
}

#[test]
fn same_package_output_keeps_local_types_bare() {
    let dir = package_dir(&[("store.go", STORE)]);
    let opts = options(dir.path(), "Store", None);

    let want = concat!(
        "// Code generated by goiface. DO NOT EDIT.\n",
        "\n",
        "package api\n",
        "\n",
        "import (\n",
        "\t\"context\"\n",
        "\t\"io\"\n",
        ")\n",
        "\n",
        "type StoreAPI interface {\n",
        "\tGet(ctx context.Context, id string) (*Record, error)\n",
        "\tPut(ctx context.Context, recs ...Record) error\n",
        "\tDump(w io.Writer) (n int64, err error)\n",
        "}\n",
    );
    assert_eq!(generate_string(&opts), want);
}

#[test]
fn single_import_is_not_grouped() {
    let src = indoc! {r#"
        package clock

        import "time"

        type Clock struct{}

        func (Clock) Now() time.Time { return time.Now() }
        func (c *Clock) Sleep(d time.Duration) {}
    "#};
    let dir = package_dir(&[("clock.go", src)]);
    let opts = options(dir.path(), "Clock", None);

    let want = concat!(
        "// Code generated by goiface. DO NOT EDIT.\n",
        "\n",
        "package api\n",
        "\n",
        "import \"time\"\n",
        "\n",
        "type ClockAPI interface {\n",
        "\tNow() time.Time\n",
        "\tSleep(d time.Duration)\n",
        "}\n",
    );
    assert_eq!(generate_string(&opts), want);
}

#[test]
fn unresolved_qualifiers_are_left_out_of_imports() {
    let src = indoc! {r#"
        package svc

        type Service struct{}

        func (s *Service) Handle(r *http.Request) {}
    "#};
    let dir = package_dir(&[("svc.go", src)]);
    let out = generate_string(&options(dir.path(), "Service", None));

    assert!(!out.contains("import"), "{out}");
    assert!(out.contains("\tHandle(r *http.Request)\n"), "{out}");
}

#[test]
fn missing_struct() {
    let dir = package_dir(&[("store.go", STORE)]);
    let err = generate(&options(dir.path(), "Cache", None)).unwrap_err();
    assert!(matches!(&err, Error::StructNotFound(name) if name == "Cache"), "{err:?}");
}

#[test]
fn struct_without_exported_methods() {
    let src = indoc! {r#"
        package store

        type Store struct{}

        type cursor struct{}

        func (c *cursor) Next() bool { return false }
        func (s *Store) flush() error { return nil }
    "#};
    let dir = package_dir(&[("store.go", src)]);
    let err = generate(&options(dir.path(), "Store", None)).unwrap_err();
    assert!(matches!(&err, Error::NoMethods(name) if name == "Store"), "{err:?}");
    assert_eq!(err.to_string(), "type Store has no exported methods");
}

#[test]
fn no_files() {
    let opts = Options {
        struct_name: "Store".into(),
        ..Options::default()
    };
    assert!(matches!(generate(&opts), Err(Error::NoSourceFiles)));
}

#[test]
fn unsupported_type_reports_position() {
    let src = indoc! {r#"
        package store

        type Store struct{}

        func (s *Store) Watch(fn interface{ Notify() }) {}
    "#};
    let dir = package_dir(&[("store.go", src)]);
    let opts = options(dir.path(), "Store", Some("example.com/store"));
    let err = generate(&opts).unwrap_err();

    let Error::Type {
        path,
        line,
        column,
        source,
    } = &err
    else {
        panic!("expected a type error, got {err:?}");
    };
    assert_eq!(path, &dir.path().join("store.go"));
    assert_eq!((*line, *column), (5, 26));
    assert!(matches!(
        source,
        TypeError::Unsupported {
            construct: Construct::NonEmptyInterface,
            ..
        }
    ));
    assert!(err.to_string().ends_with("store.go:5:26: unsupported interface with methods or embedded types"));
}

#[test]
fn generic_receivers_are_rejected() {
    let src = indoc! {r#"
        package list

        type List[T any] struct{}

        func (l *List[T]) Len() int { return 0 }
    "#};
    let dir = package_dir(&[("list.go", src)]);
    let err = generate(&options(dir.path(), "List", None)).unwrap_err();
    assert!(
        matches!(
            &err,
            Error::Type {
                source: TypeError::Unsupported {
                    construct: Construct::GenericReceiver,
                    ..
                },
                line: 5,
                ..
            }
        ),
        "{err:?}"
    );
}

#[test]
fn syntax_errors_name_the_file() {
    let src = "package store\n\nfunc (s *Store) Get( {\n";
    let dir = package_dir(&[("broken.go", src)]);
    let err = generate(&options(dir.path(), "Store", None)).unwrap_err();

    let Error::Parse { path, line, .. } = &err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(path, &dir.path().join("broken.go"));
    assert_eq!(*line, 3);
}

#[test]
fn source_package_is_aliased_when_an_import_takes_its_name() {
    let src = indoc! {r#"
        package log

        import "log"

        type Logger struct{ std *log.Logger }

        func (l *Logger) Std() *log.Logger { return l.std }
        func (l *Logger) With(prefix string) *Logger { return l }
    "#};
    let dir = package_dir(&[("logger.go", src)]);
    let opts = options(dir.path(), "Logger", Some("example.com/mylog/log"));

    let want = concat!(
        "// Code generated by goiface. DO NOT EDIT.\n",
        "\n",
        "package api\n",
        "\n",
        "import (\n",
        "\tlog2 \"example.com/mylog/log\"\n",
        "\t\"log\"\n",
        ")\n",
        "\n",
        "type LoggerAPI interface {\n",
        "\tStd() *log.Logger\n",
        "\tWith(prefix string) *log2.Logger\n",
        "}\n",
    );
    assert_eq!(generate_string(&opts), want);
}

#[test]
fn one_name_bound_to_two_paths_is_aliased() {
    let a = indoc! {r#"
        package svc

        import "errors"

        type Svc struct{}

        func (s *Svc) A() errors.X { return nil }
    "#};
    let b = indoc! {r#"
        package svc

        import "github.com/pkg/errors"

        func (s *Svc) B(err errors.Y) errors.Y { return err }
    "#};
    let dir = package_dir(&[("a.go", a), ("b.go", b)]);
    let out = generate_string(&options(dir.path(), "Svc", None));

    let want = concat!(
        "import (\n",
        "\t\"errors\"\n",
        "\terrors2 \"github.com/pkg/errors\"\n",
        ")\n",
        "\n",
        "type SvcAPI interface {\n",
        "\tA() errors.X\n",
        "\tB(err errors2.Y) errors2.Y\n",
        "}\n",
    );
    assert!(out.ends_with(want), "{out}");
}

#[test]
fn one_path_under_two_names_is_imported_once() {
    let a = indoc! {r#"
        package store

        import kv "example.com/kv"

        type Store struct{}

        func (s *Store) DB() *kv.DB { return nil }
    "#};
    let b = indoc! {r#"
        package store

        import kvstore "example.com/kv"

        func (s *Store) Stats() kvstore.Stats { return kvstore.Stats{} }
    "#};
    let dir = package_dir(&[("a.go", a), ("b.go", b)]);
    let out = generate_string(&options(dir.path(), "Store", None));

    assert!(out.contains("\nimport \"example.com/kv\"\n"), "{out}");
    assert!(out.contains("\tDB() *kv.DB\n\tStats() kv.Stats\n"), "{out}");
}

#[test]
fn resultless_func_types_have_no_trailing_space() {
    let src = indoc! {r#"
        package client

        import "net/http"

        type Client struct{}

        func (c *Client) Do(req *http.Request, opts ...func(*http.Request)) (*http.Response, error) {
            return nil, nil
        }

        func (c *Client) OnClose() func() { return func() {} }
    "#};
    let dir = package_dir(&[("client.go", src)]);
    let out = generate_string(&options(dir.path(), "Client", None));

    assert!(
        out.contains("\tDo(req *http.Request, opts ...func(*http.Request)) (*http.Response, error)\n"),
        "{out}"
    );
    assert!(out.contains("\tOnClose() func()\n"), "{out}");
}
