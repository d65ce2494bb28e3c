use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "goiface")]
#[command(about = "Generate a Go interface from the exported methods of a struct", long_about = None)]
#[command(version)]
#[command(after_help = "Example:\n  goiface -s github.com/hashicorp/vault@v1.8.2/api -p vault -t Client -i Client -o vault/client.go")]
pub struct Cli {
    /// Go import path of the package declaring the struct (path, path@version or path@version/subdir)
    #[arg(short = 's', long = "source-pkg")]
    pub source_pkg: String,

    /// Version of the source module, for example v1.9.0
    #[arg(short = 'v', long = "source-version")]
    pub source_version: Option<String>,

    /// Package directory relative to the module root
    #[arg(short = 'm', long = "module-path")]
    pub module_path: Option<String>,

    /// Package name of the generated file
    #[arg(short = 'p', long = "result-pkg")]
    pub result_pkg: String,

    /// Struct whose exported methods make up the interface
    #[arg(short = 't', long = "struct-name")]
    pub struct_name: String,

    /// Name of the generated interface
    #[arg(short = 'i', long = "interface-name")]
    pub interface_name: String,

    /// Output file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Go module cache directory
    #[arg(long, env = "GOMODCACHE", hide_env_values = true)]
    pub gomodcache: Option<PathBuf>,

    /// GOPATH (first entry is used)
    #[arg(long, env = "GOPATH", hide_env_values = true)]
    pub gopath: Option<std::ffi::OsString>,

    /// Log debug output (RUST_LOG overrides)
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub fn go_env(&self) -> crate::gomodule::Env {
        crate::gomodule::Env {
            gomodcache: self
                .gomodcache
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            gopath: self
                .gopath
                .as_deref()
                .and_then(|list| std::env::split_paths(list).next())
                .filter(|p| !p.as_os_str().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() {
        let cli = Cli::try_parse_from([
            "goiface", "-s", "example.com/m@v1.0.0/pkg", "-p", "out", "-t", "Client", "-i",
            "ClientAPI", "-o", "out/client.go", "--gopath", "/a:/b",
        ])
        .expect("parse");

        assert_eq!(cli.source_pkg, "example.com/m@v1.0.0/pkg");
        assert_eq!(cli.result_pkg, "out");
        assert_eq!(cli.interface_name, "ClientAPI");
        assert_eq!(cli.output, PathBuf::from("out/client.go"));
        assert_eq!(cli.go_env().gopath, Some(PathBuf::from("/a")));
    }

    #[test]
    fn required_flags() {
        assert!(Cli::try_parse_from(["goiface", "-s", "example.com/m"]).is_err());
    }
}
