use anyhow::{Context, Result};
use clap::Parser;
use goiface::cli::Cli;
use goiface::gomodule::Module;
use goiface::{find_source_files, generate, Options};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let module = Module::parse(&cli.source_pkg, cli.source_version.as_deref())
        .context("Invalid source package")?;
    let sub = cli.module_path.as_deref();
    let dir = module
        .directory(&cli.go_env(), sub)
        .context("Failed to locate the source package")?;

    let files = find_source_files(&dir)
        .with_context(|| format!("Failed to list Go files in {}", dir.display()))?;
    info!(dir = %dir.display(), files = files.len(), "found source files");

    let code = generate(&Options {
        files,
        struct_name: cli.struct_name.clone(),
        interface_name: cli.interface_name.clone(),
        output_package: cli.result_pkg.clone(),
        source_import_path: Some(module.import_path(sub)),
    })
    .with_context(|| format!("Failed to generate interface {}", cli.interface_name))?;

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(&cli.output, code)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    info!(output = %cli.output.display(), "wrote interface");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "goiface=debug" } else { "goiface=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
