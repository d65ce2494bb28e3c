//! Interface generation: collect the exported methods of a type across the
//! files of its package and print them as a Go interface declaration.

use crate::error::{Construct, Error, Result, TypeError};
use crate::typeparser::TypeParser;
use crate::types::{FuncType, QualifierKind};
use goiface_syntax::ast::{
    AstArena, FuncDecl, FuncDeclId, ImportName, ImportSpecId, Interner, Type as AstType,
    TypeId, TypeSpecId,
};
use goiface_syntax::walk::Visitor;
use goiface_syntax::{line_col, parse_source, ParsedFile};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const GENERATED_HEADER: &str = "// Code generated by goiface. DO NOT EDIT.";

#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Files of the source package.
    pub files: Vec<PathBuf>,
    /// Type whose methods make up the interface.
    pub struct_name: String,
    pub interface_name: String,
    /// Package clause of the generated file.
    pub output_package: String,
    /// Import path of the source package. When set, the source package's own
    /// types are qualified and imported; when `None` the generated file is
    /// assumed to live in the source package itself.
    ///
    /// Local types are qualified with the source package's name, not
    /// `output_package`, since the generated file refers to them through
    /// this import.
    pub source_import_path: Option<String>,
}

/// Lists the non-test `.go` files directly inside `dir`, sorted by name.
pub fn find_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            Error::Io {
                path,
                source: err.into(),
            }
        })?;

        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_file() && name.ends_with(".go") && !name.ends_with("_test.go") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Generates the interface source for `opts`.
pub fn generate(opts: &Options) -> Result<Vec<u8>> {
    if opts.files.is_empty() {
        return Err(Error::NoSourceFiles);
    }

    let loaded = opts
        .files
        .iter()
        .map(|path| SourceUnit::load(path))
        .collect::<Result<Vec<_>>>()?;

    let package = dominant_package(&loaded);
    let units: Vec<&SourceUnit> = loaded
        .iter()
        .filter(|unit| {
            let keep = unit.package() == package;
            if !keep {
                warn!(
                    path = %unit.path.display(),
                    package = unit.package(),
                    expected = package,
                    "skipping file from another package"
                );
            }
            keep
        })
        .collect();

    let decls: Vec<FileDecls<'_>> = units.iter().map(|unit| FileDecls::collect(&unit.tree)).collect();

    let local_types: HashSet<String> = decls
        .iter()
        .flat_map(|d| d.types.iter().copied())
        .filter(|name| is_exported(name))
        .map(str::to_owned)
        .collect();

    if !decls
        .iter()
        .any(|d| d.types.contains(&opts.struct_name.as_str()))
    {
        return Err(Error::StructNotFound(opts.struct_name.clone()));
    }

    let qualifier = match opts.source_import_path {
        Some(_) => package,
        None => "",
    };

    let mut methods = Vec::new();
    let mut import_tables = Vec::with_capacity(units.len());

    for (index, (unit, decls)) in units.iter().zip(&decls).enumerate() {
        let types = TypeParser::new(&unit.tree, &local_types, qualifier);
        import_tables.push(decls.import_table(&unit.tree));

        for &id in &decls.funcs {
            let func = &unit.tree.arena.funcs[id];
            if !unit.is_method_of(func, &opts.struct_name)? {
                continue;
            }
            let name = unit.tree.resolve(func.name.sym);
            if !is_exported(name) {
                continue;
            }

            let sig = types
                .parse_signature(func.signature)
                .map_err(|err| unit.type_error(err))?;
            debug!(path = %unit.path.display(), method = name, "collected method");

            methods.push(Method {
                unit: index,
                name: name.to_owned(),
                sig,
            });
        }
    }

    if methods.is_empty() {
        return Err(Error::NoMethods(opts.struct_name.clone()));
    }

    // Selectors bind their names first, so the source package is the one
    // aliased when a file imports another package under the same name.
    let mut imports = ImportTable::default();
    for kind in [QualifierKind::Imported, QualifierKind::Local] {
        for method in &mut methods {
            let file_imports = &import_tables[method.unit];
            let unit = units[method.unit];
            let name = method.name.as_str();

            method.sig.for_each_qualifier_mut(&mut |found, package| {
                if found != kind {
                    return;
                }
                let path = match kind {
                    QualifierKind::Local => opts.source_import_path.as_deref(),
                    QualifierKind::Imported => file_imports.get(package.as_str()).copied(),
                };
                match path {
                    Some(path) => *package = imports.bind(package, path),
                    None => {
                        if imports.unresolved.insert(package.clone()) {
                            warn!(
                                path = %unit.path.display(),
                                method = name,
                                qualifier = %package,
                                "no import found for package qualifier; leaving it out"
                            );
                        }
                    }
                }
            });
        }
    }
    let imports = imports.into_imports();

    info!(
        interface = %opts.interface_name,
        methods = methods.len(),
        imports = imports.len(),
        "generated interface"
    );

    let file = InterfaceFile {
        package: &opts.output_package,
        imports: &imports,
        interface_name: &opts.interface_name,
        methods: &methods,
    };
    Ok(file.to_string().into_bytes())
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Package name declared by most files. `main` and external test packages
/// only win when nothing else is present; ties go to the first file.
fn dominant_package(units: &[SourceUnit]) -> &str {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (i, unit) in units.iter().enumerate() {
        counts.entry(unit.package()).or_insert((0, i)).0 += 1;
    }

    let demoted = |name: &str| name == "main" || name.ends_with("_test");
    counts
        .into_iter()
        .max_by(|(a, (a_count, a_first)), (b, (b_count, b_first))| {
            demoted(*b)
                .cmp(&demoted(*a))
                .then(a_count.cmp(b_count))
                .then(b_first.cmp(a_first))
        })
        .map_or("", |(name, _)| name)
}

/// Package name an import path declares by convention: the last element,
/// skipping a `/vN` major-version suffix and a `.vN` gopkg.in suffix.
pub fn default_package_name(path: &str) -> &str {
    let mut elems = path.rsplit('/');
    let last = elems.next().unwrap_or(path);
    let name = if is_major_version(last) {
        elems.next().unwrap_or(last)
    } else {
        last
    };

    match name.rsplit_once('.') {
        Some((base, suffix)) if is_major_version(suffix) => base,
        _ => name,
    }
}

fn is_major_version(s: &str) -> bool {
    s.strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

// =============================================================================
// Source files
// =============================================================================

struct SourceUnit {
    path: PathBuf,
    src: String,
    tree: ParsedFile,
}

impl SourceUnit {
    fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let tree = parse_source(&src).map_err(|failure| {
            let (line, column, message) = match failure.diags.first() {
                Some(d) => {
                    let (line, column) = line_col(&src, d.span.start);
                    (line, column, d.message.clone())
                }
                None => (1, 1, failure.to_string()),
            };
            Error::Parse {
                path: path.to_path_buf(),
                line,
                column,
                message,
                diags: failure.diags,
            }
        })?;

        let unit = Self {
            path: path.to_path_buf(),
            src,
            tree,
        };
        debug!(path = %path.display(), package = unit.package(), "parsed source file");
        Ok(unit)
    }

    fn package(&self) -> &str {
        self.tree.resolve(self.tree.root.name.sym)
    }

    fn type_error(&self, err: TypeError) -> Error {
        let (line, column) = line_col(&self.src, err.span().start);
        Error::Type {
            path: self.path.clone(),
            line,
            column,
            source: err,
        }
    }

    /// True for a method declared on `T` or `*T`. Methods on an instantiated
    /// generic receiver are rejected.
    fn is_method_of(&self, func: &FuncDecl, type_name: &str) -> Result<bool> {
        let Some(recv) = func.recv else {
            return Ok(false);
        };
        let arena = &self.tree.arena;
        let base = receiver_base(arena, recv.typ);

        match arena.types[base] {
            AstType::Named {
                pkg: None,
                name,
                args,
            } if self.tree.resolve(name.sym) == type_name => {
                if args.is_empty() {
                    Ok(true)
                } else {
                    Err(self.type_error(TypeError::Unsupported {
                        construct: Construct::GenericReceiver,
                        span: arena.types.span(recv.typ),
                    }))
                }
            }
            _ => Ok(false),
        }
    }
}

fn receiver_base(arena: &AstArena, typ: TypeId) -> TypeId {
    let typ = arena.unparen(typ);
    match arena.types[typ] {
        AstType::Pointer { elem, .. } => arena.unparen(elem),
        _ => typ,
    }
}

/// Top-level declarations of one file, gathered with a visitor.
struct FileDecls<'t> {
    interner: &'t Interner,
    imports: Vec<ImportSpecId>,
    types: Vec<&'t str>,
    funcs: Vec<FuncDeclId>,
}

impl<'t> FileDecls<'t> {
    fn collect(tree: &'t ParsedFile) -> Self {
        let mut decls = Self {
            interner: &tree.interner,
            imports: Vec::new(),
            types: Vec::new(),
            funcs: Vec::new(),
        };
        decls.visit_source_file(&tree.arena, &tree.root);
        decls
    }

    /// Package qualifier to import path, for named and plain imports.
    fn import_table(&self, tree: &'t ParsedFile) -> HashMap<&'t str, &'t str> {
        let mut table = HashMap::new();
        for &id in &self.imports {
            let spec = &tree.arena.imports[id];
            let path = tree.resolve(spec.path);
            let name = match spec.name {
                None => default_package_name(path),
                Some(ImportName::Name(name)) => tree.resolve(name.sym),
                Some(ImportName::Dot(_) | ImportName::Blank(_)) => continue,
            };
            table.insert(name, path);
        }
        table
    }
}

impl<'t> Visitor<'t> for FileDecls<'t> {
    fn visit_import_spec(&mut self, _: &'t AstArena, id: ImportSpecId) {
        self.imports.push(id);
    }

    fn visit_type_spec(&mut self, a: &'t AstArena, id: TypeSpecId) {
        self.types.push(self.interner.resolve(a.type_specs[id].name.sym));
    }

    fn visit_func_decl(&mut self, _: &'t AstArena, id: FuncDeclId) {
        self.funcs.push(id);
    }
}

// =============================================================================
// Output
// =============================================================================

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Import {
    path: String,
    alias: Option<String>,
}

impl Import {
    fn new(path: &str, qualifier: &str) -> Self {
        let alias = (default_package_name(path) != qualifier).then(|| qualifier.to_owned());
        Self {
            path: path.to_owned(),
            alias,
        }
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{alias} {:?}", self.path),
            None => write!(f, "{:?}", self.path),
        }
    }
}

struct Method {
    /// Index of the declaring file.
    unit: usize,
    name: String,
    sig: FuncType,
}

/// Import names chosen for the generated file, one path per name.
#[derive(Default)]
struct ImportTable {
    by_name: BTreeMap<String, String>,
    /// Qualifiers with no import; kept as written, so never reused.
    unresolved: HashSet<String>,
}

impl ImportTable {
    /// Name under which `path` is imported, preferring `name`. A path
    /// already bound keeps its first name; a name taken by another path
    /// gets a numeric suffix.
    fn bind(&mut self, name: &str, path: &str) -> String {
        if self.by_name.get(name).is_some_and(|bound| bound == path) {
            return name.to_owned();
        }
        if let Some((bound, _)) = self.by_name.iter().find(|(_, p)| *p == path) {
            return bound.clone();
        }

        let mut alias = name.to_owned();
        let mut n = 1;
        while self.by_name.contains_key(&alias) || self.unresolved.contains(&alias) {
            n += 1;
            alias = format!("{name}{n}");
        }
        if alias != name {
            debug!(path, name, alias = %alias, "import name already taken; aliasing");
        }
        self.by_name.insert(alias.clone(), path.to_owned());
        alias
    }

    fn into_imports(self) -> BTreeSet<Import> {
        self.by_name
            .iter()
            .map(|(name, path)| Import::new(path, name))
            .collect()
    }
}

struct InterfaceFile<'a> {
    package: &'a str,
    imports: &'a BTreeSet<Import>,
    interface_name: &'a str,
    methods: &'a [Method],
}

impl fmt::Display for InterfaceFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{GENERATED_HEADER}")?;
        writeln!(f)?;
        writeln!(f, "package {}", self.package)?;

        match self.imports.len() {
            0 => {}
            1 => {
                for import in self.imports {
                    writeln!(f, "\nimport {import}")?;
                }
            }
            _ => {
                writeln!(f, "\nimport (")?;
                for import in self.imports {
                    writeln!(f, "\t{import}")?;
                }
                writeln!(f, ")")?;
            }
        }

        writeln!(f, "\ntype {} interface {{", self.interface_name)?;
        for method in self.methods {
            writeln!(f, "\t{}{}", method.name, method.sig.display_named())?;
        }
        writeln!(f, "}}")
    }
}
