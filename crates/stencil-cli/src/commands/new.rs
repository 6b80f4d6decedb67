//! Implementation of the `stencil new` command.
//!
//! Responsibility: translate CLI arguments and config defaults into
//! `RawParameters`, pick a template source, call the core generator, and
//! display results. No business logic lives here.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use stencil_adapters::{BuiltinTemplates, DirectoryTemplateLoader, LocalFilesystem, TokenRenderer};
use stencil_core::{
    application::{
        ConflictPolicy, GeneratorService, MaterializeOptions, TemplateLoader, TemplateService,
    },
    domain::{
        FileMode, GenerationManifest, ParamField, RawParameters, RelativePath, RenderedFile,
        TemplateSource, WriteOutcome,
    },
};

use crate::{
    cli::{NewArgs, OutputFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `stencil new` command.
///
/// Dispatch sequence:
/// 1. Collect parameters from flags, config defaults, or a prompt
/// 2. Load the template source (directory or bundled skeleton)
/// 3. `--dry-run`: render in memory and list what would be written
/// 4. Otherwise materialize under the output directory
/// 5. Print the manifest and next steps
#[instrument(skip_all, fields(plugin = %args.name))]
pub fn execute(
    args: NewArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    // 1. Parameters
    let module = resolve_module(&args, &config, &global, &output)?;
    let raw = build_parameters(&args, &config, module);
    let root = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&args.name));
    let options = MaterializeOptions {
        conflict: conflict_policy(&args, &config),
    };

    debug!(
        root = %root.display(),
        conflict = %options.conflict,
        "Parameters collected"
    );

    // 2. Template source
    let template_dir = args.template_dir.as_ref().or(config.templates.dir.as_ref());
    let source = load_source(template_dir)?;
    info!(
        source = source.name(),
        entries = source.len(),
        "Template source loaded"
    );

    let service = GeneratorService::new(
        source,
        Box::new(TokenRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );

    // 3. Dry run: render but do not write.
    if args.dry_run {
        let planned = service.preview(&raw)?;
        return show_plan(&planned, &root, &output);
    }

    // 4. Generate
    if output.format() != OutputFormat::Json {
        output.header(&format!("Creating '{}'...", args.name))?;
    }
    let spinner = output.spinner("Rendering templates");
    let result = service.generate(&raw, &root, &options);
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let manifest = result?;

    // 5. Report
    show_manifest(&manifest, &output)?;

    if output.format() != OutputFormat::Json && !output.is_quiet() {
        output.print("")?;
        output.print("Next steps:")?;
        output.print(&format!("  cd {}", root.display()))?;
        output.print("  make build test")?;
    }

    Ok(())
}

// ── Parameter collection ──────────────────────────────────────────────────────

/// `--module`, then `<defaults.module_prefix>/<name>`, then a prompt.
///
/// `None` lets core validation report the missing `ModulePath`.
fn resolve_module(
    args: &NewArgs,
    config: &AppConfig,
    global: &GlobalArgs,
    output: &OutputManager,
) -> CliResult<Option<String>> {
    if let Some(module) = &args.module {
        return Ok(Some(module.clone()));
    }
    if let Some(prefix) = &config.defaults.module_prefix {
        return Ok(Some(format!("{}/{}", prefix.trim_end_matches('/'), args.name)));
    }
    if global.quiet || output.format() != OutputFormat::Human {
        return Ok(None);
    }
    prompt_module(&args.name)
}

#[cfg(feature = "interactive")]
fn prompt_module(name: &str) -> CliResult<Option<String>> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }
    dialoguer::Input::<String>::new()
        .with_prompt("Module path")
        .with_initial_text(format!("github.com/you/{name}"))
        .interact_text()
        .map(Some)
        .map_err(|e| CliError::InvalidInput {
            message: "failed to read the module path".into(),
            source: Some(Box::new(e)),
        })
}

#[cfg(not(feature = "interactive"))]
fn prompt_module(_name: &str) -> CliResult<Option<String>> {
    Ok(None)
}

/// Flags win over config defaults; unset optional fields are left out so
/// template defaults apply.
pub fn build_parameters(args: &NewArgs, config: &AppConfig, module: Option<String>) -> RawParameters {
    let mut raw = RawParameters::new().with(ParamField::PluginName.as_str(), &args.name);
    if let Some(module) = module {
        raw.insert(ParamField::ModulePath.as_str(), module);
    }

    let optional = [
        (ParamField::AuthorName, &args.author_name, &config.defaults.author_name),
        (ParamField::AuthorEmail, &args.author_email, &config.defaults.author_email),
        (ParamField::Description, &args.description, &config.defaults.description),
    ];
    for (field, flag, default) in optional {
        if let Some(value) = flag.as_ref().or(default.as_ref()) {
            raw.insert(field.as_str(), value);
        }
    }
    raw
}

pub fn conflict_policy(args: &NewArgs, config: &AppConfig) -> ConflictPolicy {
    if args.force {
        ConflictPolicy::Overwrite
    } else if args.skip_existing {
        ConflictPolicy::Skip
    } else {
        config.templates.conflict
    }
}

fn load_source(template_dir: Option<&PathBuf>) -> CliResult<Arc<TemplateSource>> {
    let loader: Box<dyn TemplateLoader> = match template_dir {
        Some(dir) => Box::new(DirectoryTemplateLoader::new(dir)),
        None => Box::new(BuiltinTemplates::new()),
    };
    Ok(TemplateService::new(loader).load()?)
}

// ── UI helpers ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PlannedFile<'a> {
    path: &'a RelativePath,
    source: &'a RelativePath,
    bytes: usize,
    mode: FileMode,
}

fn show_plan(planned: &[RenderedFile], root: &Path, out: &OutputManager) -> CliResult<()> {
    if out.format() == OutputFormat::Json {
        let rows: Vec<_> = planned
            .iter()
            .map(|f| PlannedFile {
                path: &f.path,
                source: &f.source,
                bytes: f.size(),
                mode: f.mode,
            })
            .collect();
        out.json(&rows)?;
        return Ok(());
    }

    out.info(&format!(
        "Dry run: would write {} file(s) under {}",
        planned.len(),
        root.display()
    ))?;
    for file in planned {
        out.print(&format!("  {} {:>7}  {}", file.mode, file.size(), file.path))?;
    }
    Ok(())
}

fn show_manifest(manifest: &GenerationManifest, out: &OutputManager) -> CliResult<()> {
    if out.format() == OutputFormat::Json {
        out.json(manifest)?;
        return Ok(());
    }

    for file in manifest.files() {
        let tag = match file.outcome {
            WriteOutcome::Created => "create",
            WriteOutcome::Overwritten => "overwrite",
            WriteOutcome::Skipped => "skip",
        };
        out.print(&format!("  {tag:<9} {}", file.path))?;
    }

    let written = manifest.written().count();
    let skipped = manifest.skipped().count();
    out.success(&format!(
        "Wrote {written} file(s) to {}",
        manifest.root().display()
    ))?;
    if skipped > 0 {
        out.warning(&format!("{skipped} existing file(s) left untouched"))?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
