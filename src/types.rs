//! Normalized type model and its canonical Go rendering.
//!
//! A [`Type`] is built by [`crate::typeparser::TypeParser`] from a syntax
//! tree and rendered with [`std::fmt::Display`]. Every variant has a
//! rendering, so formatting cannot fail.

use std::collections::BTreeSet;
use std::fmt::{self, Write as _};

/// Channel direction as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

impl From<goiface_syntax::ast::ChanDir> for ChanDir {
    fn from(dir: goiface_syntax::ast::ChanDir) -> Self {
        use goiface_syntax::ast::ChanDir as Ast;
        match dir {
            Ast::Both => ChanDir::Both,
            Ast::Send => ChanDir::Send,
            Ast::Recv => ChanDir::Recv,
        }
    }
}

/// A Go type expression, one variant per supported shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// `Name`, or `package.Name` when the name was re-qualified as a local type.
    Ident {
        name: String,
        package: Option<String>,
    },
    /// `package.Name` as written in source.
    Selector { package: String, name: String },
    Pointer(Box<Type>),
    /// `[]T`
    Slice(Box<Type>),
    /// `[len]T`, length kept as source text.
    Array { len: String, elem: Box<Type> },
    /// `...T`; only valid as the type of the last parameter.
    Variadic(Box<Type>),
    Map { key: Box<Type>, value: Box<Type> },
    Chan { dir: ChanDir, elem: Box<Type> },
    Func(FuncType),
    /// `interface{}`. Non-empty interfaces are not modelled.
    AnyInterface,
    /// `struct{}`. Non-empty structs are not modelled.
    EmptyStruct,
}

/// Discriminant of a [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    Ident,
    Selector,
    Pointer,
    Slice,
    Array,
    Variadic,
    Map,
    Chan,
    Func,
    AnyInterface,
    EmptyStruct,
}

/// Origin of a package qualifier inside a [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualifierKind {
    /// A local type re-qualified with the source package.
    Local,
    /// A `package.Name` selector written in source.
    Imported,
}

/// Function signature. Params and results keep declaration order, with
/// grouped declarations (`a, b int`) already expanded to one entry per name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FuncType {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Option<String>,
    pub ty: Type,
}

impl Param {
    pub fn named(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: Type) -> Self {
        Self { name: None, ty }
    }
}

impl Type {
    pub fn ident(name: impl Into<String>) -> Self {
        Type::Ident {
            name: name.into(),
            package: None,
        }
    }

    /// An identifier re-qualified under `package`.
    pub fn qualified_ident(package: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Ident {
            name: name.into(),
            package: Some(package.into()),
        }
    }

    pub fn selector(package: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Selector {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn pointer(elem: Type) -> Self {
        Type::Pointer(Box::new(elem))
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }

    pub fn array(len: impl Into<String>, elem: Type) -> Self {
        Type::Array {
            len: len.into(),
            elem: Box::new(elem),
        }
    }

    pub fn variadic(elem: Type) -> Self {
        Type::Variadic(Box::new(elem))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan(dir: ChanDir, elem: Type) -> Self {
        Type::Chan {
            dir,
            elem: Box::new(elem),
        }
    }

    pub fn func(params: Vec<Param>, results: Vec<Param>) -> Self {
        Type::Func(FuncType { params, results })
    }

    pub const fn kind(&self) -> TypeKind {
        match self {
            Type::Ident { .. } => TypeKind::Ident,
            Type::Selector { .. } => TypeKind::Selector,
            Type::Pointer(_) => TypeKind::Pointer,
            Type::Slice(_) => TypeKind::Slice,
            Type::Array { .. } => TypeKind::Array,
            Type::Variadic(_) => TypeKind::Variadic,
            Type::Map { .. } => TypeKind::Map,
            Type::Chan { .. } => TypeKind::Chan,
            Type::Func(_) => TypeKind::Func,
            Type::AnyInterface => TypeKind::AnyInterface,
            Type::EmptyStruct => TypeKind::EmptyStruct,
        }
    }

    /// The single child of a pointer, slice, array, variadic or channel type.
    pub fn child(&self) -> Option<&Type> {
        match self {
            Type::Pointer(elem)
            | Type::Slice(elem)
            | Type::Variadic(elem)
            | Type::Array { elem, .. }
            | Type::Chan { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// Every package qualifier the rendered type refers to.
    pub fn packages(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_packages(&mut out);
        out
    }

    /// Calls `f` on every package qualifier, allowing it to be renamed.
    pub fn for_each_qualifier_mut(&mut self, f: &mut impl FnMut(QualifierKind, &mut String)) {
        match self {
            Type::Ident {
                package: Some(package),
                ..
            } => f(QualifierKind::Local, package),
            Type::Selector { package, .. } => f(QualifierKind::Imported, package),
            Type::Map { key, value } => {
                key.for_each_qualifier_mut(f);
                value.for_each_qualifier_mut(f);
            }
            Type::Func(func) => func.for_each_qualifier_mut(f),
            Type::Pointer(elem)
            | Type::Slice(elem)
            | Type::Variadic(elem)
            | Type::Array { elem, .. }
            | Type::Chan { elem, .. } => elem.for_each_qualifier_mut(f),
            Type::Ident { package: None, .. } | Type::AnyInterface | Type::EmptyStruct => {}
        }
    }

    fn collect_packages<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Type::Ident {
                package: Some(package),
                ..
            }
            | Type::Selector { package, .. } => {
                out.insert(package.as_str());
            }
            Type::Map { key, value } => {
                key.collect_packages(out);
                value.collect_packages(out);
            }
            Type::Func(func) => func.collect_packages(out),
            other => {
                if let Some(child) = other.child() {
                    child.collect_packages(out);
                }
            }
        }
    }
}

impl FuncType {
    pub fn for_each_qualifier_mut(&mut self, f: &mut impl FnMut(QualifierKind, &mut String)) {
        for param in self.params.iter_mut().chain(&mut self.results) {
            param.ty.for_each_qualifier_mut(f);
        }
    }

    pub fn packages(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_packages(&mut out);
        out
    }

    fn collect_packages<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        for param in self.params.iter().chain(&self.results) {
            param.ty.collect_packages(out);
        }
    }

    /// Renders `(params) results` keeping parameter names, as in a method
    /// declaration. Named results are always parenthesized.
    pub fn display_named(&self) -> impl fmt::Display + '_ {
        NamedSignature(self)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.render(false), f)
    }
}

/// `func(T1, T2) R`: parameter names dropped, a single result bare, two or
/// more parenthesized. With no results the separating space is still written.
impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_func(f, self, false)
    }
}

impl Type {
    /// With `gofmt` set, a func type without results gets no trailing space.
    fn render(&self, gofmt: bool) -> Render<'_> {
        Render { ty: self, gofmt }
    }
}

struct Render<'a> {
    ty: &'a Type,
    gofmt: bool,
}

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gofmt = self.gofmt;
        match self.ty {
            Type::Ident {
                name,
                package: None,
            } => f.write_str(name),
            Type::Ident {
                name,
                package: Some(package),
            }
            | Type::Selector { package, name } => write!(f, "{package}.{name}"),
            Type::Pointer(elem) => write!(f, "*{}", elem.render(gofmt)),
            Type::Slice(elem) => write!(f, "[]{}", elem.render(gofmt)),
            Type::Array { len, elem } => write!(f, "[{len}]{}", elem.render(gofmt)),
            Type::Variadic(elem) => write!(f, "...{}", elem.render(gofmt)),
            Type::Map { key, value } => {
                write!(f, "map[{}]{}", key.render(gofmt), value.render(gofmt))
            }
            Type::Chan { dir, elem } => {
                let elem = elem.render(gofmt);
                match dir {
                    // `chan <-chan T` would read as `chan<- chan T`.
                    ChanDir::Both
                        if matches!(elem.ty, Type::Chan { dir: ChanDir::Recv, .. }) =>
                    {
                        write!(f, "chan ({elem})")
                    }
                    ChanDir::Both => write!(f, "chan {elem}"),
                    ChanDir::Send => write!(f, "chan<- {elem}"),
                    ChanDir::Recv => write!(f, "<-chan {elem}"),
                }
            }
            Type::Func(func) => write_func(f, func, gofmt),
            Type::AnyInterface => f.write_str("interface{}"),
            Type::EmptyStruct => f.write_str("struct{}"),
        }
    }
}

fn write_func(f: &mut fmt::Formatter<'_>, func: &FuncType, gofmt: bool) -> fmt::Result {
    f.write_str("func(")?;
    write_types(f, &func.params, gofmt)?;
    f.write_char(')')?;
    match func.results.as_slice() {
        [] if gofmt => Ok(()),
        [] => f.write_char(' '),
        [single] => write!(f, " {}", single.ty.render(gofmt)),
        results => {
            f.write_str(" (")?;
            write_types(f, results, gofmt)?;
            f.write_char(')')
        }
    }
}

fn write_types(f: &mut fmt::Formatter<'_>, params: &[Param], gofmt: bool) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        fmt::Display::fmt(&param.ty.render(gofmt), f)?;
    }
    Ok(())
}

struct NamedSignature<'a>(&'a FuncType);

impl fmt::Display for NamedSignature<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        write_params(f, &self.0.params)?;
        f.write_char(')')?;

        match self.0.results.as_slice() {
            [] => Ok(()),
            [Param { name: None, ty }] => write!(f, " {}", ty.render(true)),
            results => {
                f.write_str(" (")?;
                write_params(f, results)?;
                f.write_char(')')
            }
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[Param]) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        let ty = param.ty.render(true);
        match &param.name {
            Some(name) => write!(f, "{name} {ty}")?,
            None => fmt::Display::fmt(&ty, f)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_leaves() {
        assert_eq!(Type::ident("int").to_string(), "int");
        assert_eq!(Type::qualified_ident("out", "Foo").to_string(), "out.Foo");
        assert_eq!(Type::selector("io", "Reader").to_string(), "io.Reader");
        assert_eq!(Type::AnyInterface.to_string(), "interface{}");
        assert_eq!(Type::EmptyStruct.to_string(), "struct{}");
    }

    #[test]
    fn renders_composites() {
        let t = Type::pointer(Type::map(
            Type::ident("string"),
            Type::slice(Type::array("4", Type::ident("byte"))),
        ));
        assert_eq!(t.to_string(), "*map[string][][4]byte");
        assert_eq!(
            Type::chan(ChanDir::Recv, Type::chan(ChanDir::Send, Type::ident("int"))).to_string(),
            "<-chan chan<- int"
        );
        assert_eq!(
            Type::chan(ChanDir::Both, Type::chan(ChanDir::Recv, Type::ident("int"))).to_string(),
            "chan (<-chan int)"
        );
    }

    #[test]
    fn func_result_arity() {
        let int = || Param::unnamed(Type::ident("int"));
        let err = || Param::unnamed(Type::ident("error"));

        assert_eq!(Type::func(vec![int()], vec![]).to_string(), "func(int) ");
        assert_eq!(Type::func(vec![int()], vec![err()]).to_string(), "func(int) error");
        assert_eq!(
            Type::func(vec![int()], vec![int(), err()]).to_string(),
            "func(int) (int, error)"
        );
    }

    #[test]
    fn func_drops_param_names() {
        let t = Type::func(
            vec![
                Param::named("a", Type::ident("int")),
                Param::named("rest", Type::variadic(Type::ident("string"))),
            ],
            vec![Param::named("err", Type::ident("error"))],
        );
        assert_eq!(t.to_string(), "func(int, ...string) error");
    }

    #[test]
    fn named_signature_keeps_names() {
        let sig = FuncType {
            params: vec![
                Param::named("ctx", Type::selector("context", "Context")),
                Param::named("ids", Type::variadic(Type::ident("int"))),
            ],
            results: vec![Param::named("n", Type::ident("int"))],
        };
        assert_eq!(
            sig.display_named().to_string(),
            "(ctx context.Context, ids ...int) (n int)"
        );

        let sig = FuncType {
            params: vec![],
            results: vec![Param::unnamed(Type::ident("error"))],
        };
        assert_eq!(sig.display_named().to_string(), "() error");
        assert_eq!(FuncType::default().display_named().to_string(), "()");
    }

    #[test]
    fn named_signature_has_no_space_after_resultless_funcs() {
        let callback = || Type::func(vec![Param::unnamed(Type::ident("int"))], vec![]);
        let sig = FuncType {
            params: vec![
                Param::named("opts", Type::variadic(callback())),
                Param::named("hooks", Type::map(Type::ident("string"), callback())),
            ],
            results: vec![Param::unnamed(Type::func(vec![Param::unnamed(callback())], vec![]))],
        };
        assert_eq!(
            sig.display_named().to_string(),
            "(opts ...func(int), hooks map[string]func(int)) func(func(int))"
        );
        assert_eq!(
            Type::Func(sig).to_string(),
            "func(...func(int) , map[string]func(int) ) func(func(int) ) "
        );
    }

    #[test]
    fn qualifiers_can_be_renamed_by_origin() {
        let mut t = Type::map(
            Type::selector("log", "Level"),
            Type::func(vec![Param::unnamed(Type::qualified_ident("log", "Logger"))], vec![]),
        );
        t.for_each_qualifier_mut(&mut |kind, package| {
            if kind == QualifierKind::Local {
                *package = "log2".to_string();
            }
        });
        assert_eq!(t.to_string(), "map[log.Level]func(log2.Logger) ");
    }

    #[test]
    fn packages_are_collected_from_every_position() {
        let t = Type::func(
            vec![Param::unnamed(Type::map(
                Type::selector("time", "Month"),
                Type::qualified_ident("out", "Foo"),
            ))],
            vec![Param::unnamed(Type::chan(
                ChanDir::Both,
                Type::pointer(Type::selector("io", "Reader")),
            ))],
        );
        assert_eq!(
            t.packages().into_iter().collect::<Vec<_>>(),
            ["io", "out", "time"]
        );
        assert!(Type::ident("int").packages().is_empty());
    }

    #[test]
    fn kind_and_child() {
        let t = Type::slice(Type::ident("T"));
        assert_eq!(t.kind(), TypeKind::Slice);
        assert_eq!(t.child().map(Type::kind), Some(TypeKind::Ident));
        assert_eq!(Type::map(Type::ident("K"), Type::ident("V")).child(), None);
    }
}
