//! Locating a Go package on disk from its module path and version.
//!
//! Versioned packages live in the module cache
//! (`$GOMODCACHE/<escaped path>@<version>`); unversioned ones are looked up
//! in `$GOPATH/src` first and then in the cache, newest version wins.

use crate::error::ModuleError;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Go environment relevant to package lookup.
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub gomodcache: Option<PathBuf>,
    /// First entry of `GOPATH`.
    pub gopath: Option<PathBuf>,
}

impl Env {
    /// `GOPATH`, defaulting to `~/go` like the go command.
    pub fn gopath(&self) -> Option<PathBuf> {
        self.gopath
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join("go")))
    }

    pub fn mod_cache(&self) -> Option<PathBuf> {
        self.gomodcache
            .clone()
            .or_else(|| self.gopath().map(|p| p.join("pkg").join("mod")))
    }
}

/// A module path, optionally pinned to a version and narrowed to a package
/// directory inside the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub path: String,
    pub version: Option<String>,
    pub subdir: Option<String>,
}

impl Module {
    /// Accepts `path`, `path@version` and `path@version/subdir`. A non-empty
    /// `version` argument overrides a version embedded in `source_pkg`.
    pub fn parse(source_pkg: &str, version: Option<&str>) -> Result<Self, ModuleError> {
        let source_pkg = source_pkg.trim().trim_end_matches('/');
        let (path, embedded, subdir) = match source_pkg.split_once('@') {
            None => (source_pkg, None, None),
            Some((path, rest)) => match rest.split_once('/') {
                Some((version, subdir)) => (path, Some(version), Some(subdir)),
                None => (path, Some(rest), None),
            },
        };

        if path.is_empty() {
            return Err(ModuleError::EmptyPath);
        }

        let version = match version.map(str::trim).filter(|v| !v.is_empty()) {
            Some(explicit) => {
                if let Some(embedded) = embedded.filter(|v| *v != explicit) {
                    debug!(embedded, explicit, "explicit version overrides the embedded one");
                }
                Some(explicit)
            }
            None => embedded,
        };

        if let Some(v) = version {
            if parse_semver(v).is_none() {
                return Err(ModuleError::InvalidVersion(v.to_owned()));
            }
        }

        Ok(Self {
            path: path.to_owned(),
            version: version.map(str::to_owned),
            subdir: subdir.filter(|s| !s.is_empty()).map(str::to_owned),
        })
    }

    /// Go import path of the package in `sub` (relative to `subdir`).
    pub fn import_path(&self, sub: Option<&str>) -> String {
        let mut out = self.path.clone();
        for part in [self.subdir.as_deref(), sub].into_iter().flatten() {
            let part = part.trim_matches('/');
            if !part.is_empty() {
                out.push('/');
                out.push_str(part);
            }
        }
        out
    }

    /// On-disk directory of the package in `sub` (relative to `subdir`).
    pub fn directory(&self, env: &Env, sub: Option<&str>) -> Result<PathBuf, ModuleError> {
        let root = match &self.version {
            Some(version) => {
                let cache = env.mod_cache().ok_or(ModuleError::NoModCache)?;
                let root = cache.join(format!("{}@{}", escape_path(&self.path), escape_path(version)));
                if !root.is_dir() {
                    return Err(ModuleError::NotFound {
                        module: format!("{}@{version}", self.path),
                        searched: root,
                    });
                }
                root
            }
            None => self.unversioned_root(env)?,
        };

        let mut dir = root;
        for part in [self.subdir.as_deref(), sub].into_iter().flatten() {
            dir.extend(part.split('/').filter(|p| !p.is_empty()));
        }
        debug!(module = %self.path, dir = %dir.display(), "resolved package directory");
        Ok(dir)
    }

    fn unversioned_root(&self, env: &Env) -> Result<PathBuf, ModuleError> {
        if let Some(gopath) = env.gopath() {
            let dir = gopath.join("src").join(&self.path);
            if dir.is_dir() {
                return Ok(dir);
            }
        }

        let cache = env.mod_cache().ok_or(ModuleError::NoModCache)?;
        let escaped = escape_path(&self.path);
        let (parent, base) = match escaped.rsplit_once('/') {
            Some((parent, base)) => (cache.join(parent), base),
            None => (cache.clone(), escaped.as_str()),
        };

        latest_cached_version(&parent, base)?.ok_or_else(|| ModuleError::NotFound {
            module: self.path.clone(),
            searched: parent.join(format!("{base}@*")),
        })
    }
}

/// Directory `<dir>/<base>@<version>` with the highest semantic version.
fn latest_cached_version(dir: &Path, base: &str) -> Result<Option<PathBuf>, ModuleError> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let prefix = format!("{base}@");
    let mut best: Option<(Semver, PathBuf)> = None;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| ModuleError::Io {
            path: dir.to_path_buf(),
            source: err.into(),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        let Some(version) = name.strip_prefix(&prefix).and_then(|v| parse_semver(&unescape(v))) else {
            continue;
        };

        if best.as_ref().map_or(true, |(b, _)| version > *b) {
            best = Some((version, entry.into_path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}

/// Module path escaping of the module cache: every upper-case letter becomes
/// `!` followed by its lower-case form.
pub fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn unescape(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut bang = false;
    for c in path.chars() {
        match (bang, c) {
            (false, '!') => bang = true,
            (true, c) => {
                out.push(c.to_ascii_uppercase());
                bang = false;
            }
            (false, c) => out.push(c),
        }
    }
    out
}

/// `vMAJOR.MINOR.PATCH[-pre][+build]`; `vMAJOR` and `vMAJOR.MINOR` are
/// accepted as shorthands.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Semver {
    core: [u64; 3],
    pre: Option<String>,
}

impl Ord for Semver {
    fn cmp(&self, other: &Self) -> Ordering {
        self.core.cmp(&other.core).then_with(|| match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => cmp_prerelease(a, b),
        })
    }
}

impl PartialOrd for Semver {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn cmp_prerelease(a: &str, b: &str) -> Ordering {
    let mut a_ids = a.split('.');
    let mut b_ids = b.split('.');
    loop {
        match (a_ids.next(), b_ids.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn parse_semver(v: &str) -> Option<Semver> {
    let v = v.strip_prefix('v')?;
    let v = v.split_once('+').map_or(v, |(v, _build)| v);
    let (core, pre) = match v.split_once('-') {
        Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_owned())),
        Some(_) => return None,
        None => (v, None),
    };

    let mut parts = [0u64; 3];
    let mut n = 0;
    for part in core.split('.') {
        if n == 3 || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        parts[n] = part.parse().ok()?;
        n += 1;
    }

    (n > 0).then_some(Semver { core: parts, pre })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_forms() {
        let m = Module::parse("github.com/hashicorp/vault@v1.8.2/api", None).expect("parse");
        assert_eq!(m.path, "github.com/hashicorp/vault");
        assert_eq!(m.version.as_deref(), Some("v1.8.2"));
        assert_eq!(m.subdir.as_deref(), Some("api"));
        assert_eq!(m.import_path(None), "github.com/hashicorp/vault/api");

        let m = Module::parse("github.com/mattermost/mattermost-server/v5", None).expect("parse");
        assert_eq!(m.version, None);
        assert_eq!(m.import_path(Some("model")), "github.com/mattermost/mattermost-server/v5/model");
    }

    #[test]
    fn explicit_version_wins() {
        let m = Module::parse("example.com/m@v1.0.0", Some("v1.2.0")).expect("parse");
        assert_eq!(m.version.as_deref(), Some("v1.2.0"));
        let m = Module::parse("example.com/m@v1.0.0", Some("  ")).expect("parse");
        assert_eq!(m.version.as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(Module::parse("", None), Err(ModuleError::EmptyPath)));
        assert!(matches!(Module::parse("@v1.0.0", None), Err(ModuleError::EmptyPath)));
        assert!(matches!(
            Module::parse("example.com/m", Some("latest")),
            Err(ModuleError::InvalidVersion(v)) if v == "latest"
        ));
    }

    #[test]
    fn escaping_round_trips() {
        assert_eq!(escape_path("github.com/Azure/SDK"), "github.com/!azure/!s!d!k");
        assert_eq!(unescape("github.com/!azure/!s!d!k"), "github.com/Azure/SDK");
    }

    #[test]
    fn semver_ordering() {
        let v = |s| parse_semver(s).expect(s);
        assert!(v("v1.10.0") > v("v1.9.3"));
        assert!(v("v1.0.0") > v("v1.0.0-rc.1"));
        assert!(v("v1.0.0-rc.10") > v("v1.0.0-rc.2"));
        assert!(v("v2") > v("v1.99.99"));
        assert!(v("v0.0.0-20210101000000-abcdef123456") < v("v0.0.1"));
        assert!(parse_semver("1.0.0").is_none());
        assert!(parse_semver("v1.x").is_none());
    }

    #[test]
    fn versioned_directory_in_mod_cache() {
        let cache = tempfile::tempdir().expect("tempdir");
        let root = cache.path().join("github.com/!burnt!sushi/toml@v1.3.2");
        std::fs::create_dir_all(root.join("internal")).expect("mkdir");

        let env = Env {
            gomodcache: Some(cache.path().to_path_buf()),
            gopath: None,
        };
        let m = Module::parse("github.com/BurntSushi/toml", Some("v1.3.2")).expect("parse");
        assert_eq!(m.directory(&env, Some("internal")).expect("dir"), root.join("internal"));

        let missing = Module::parse("github.com/BurntSushi/toml", Some("v9.9.9")).expect("parse");
        assert!(matches!(
            missing.directory(&env, None),
            Err(ModuleError::NotFound { .. })
        ));
    }

    #[test]
    fn unversioned_prefers_gopath_then_latest_cached() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let gopath = tmp.path().join("gopath");
        let cache = tmp.path().join("cache");
        for v in ["v1.2.0", "v1.10.0", "v1.11.0-beta.1"] {
            std::fs::create_dir_all(cache.join(format!("example.com/lib@{v}"))).expect("mkdir");
        }

        let env = Env {
            gomodcache: Some(cache.clone()),
            gopath: Some(gopath.clone()),
        };
        let m = Module::parse("example.com/lib", None).expect("parse");
        assert_eq!(
            m.directory(&env, None).expect("dir"),
            cache.join("example.com/lib@v1.11.0-beta.1")
        );

        std::fs::create_dir_all(gopath.join("src/example.com/lib")).expect("mkdir");
        assert_eq!(
            m.directory(&env, None).expect("dir"),
            gopath.join("src/example.com/lib")
        );
    }
}
