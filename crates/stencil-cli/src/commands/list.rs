//! Implementation of the `stencil list` command.

use std::path::PathBuf;

use stencil_adapters::{BuiltinTemplates, DirectoryTemplateLoader};
use stencil_core::application::{EntryInfo, TemplateLoader, TemplateService};

use crate::{
    cli::{ListArgs, ListFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let dir: Option<PathBuf> = args.template_dir.or(config.templates.dir);
    let loader: Box<dyn TemplateLoader> = match &dir {
        Some(dir) => Box::new(DirectoryTemplateLoader::new(dir)),
        None => Box::new(BuiltinTemplates::new()),
    };

    let source = TemplateService::new(loader).load()?;
    let entries = TemplateService::describe(&source)?;

    match args.format {
        ListFormat::Table => {
            output.header(&format!(
                "Template '{}' ({} entries):",
                source.name(),
                entries.len()
            ))?;
            for entry in &entries {
                output.print(&table_row(entry))?;
            }
        }

        // JSON must stay parseable in pipes, so it is never suppressed.
        ListFormat::Json => output.json(&entries)?,

        ListFormat::List => {
            for entry in &entries {
                println!("{}", entry.source);
            }
        }

        ListFormat::Csv => {
            println!("source,output,parameterized,mode,bytes,fields");
            for entry in &entries {
                println!("{}", csv_row(entry));
            }
        }
    }

    Ok(())
}

fn table_row(entry: &EntryInfo) -> String {
    let marker = if entry.parameterized { "*" } else { " " };
    format!(
        "  {marker} {} {:>6}  {}  ->  {}",
        entry.mode, entry.bytes, entry.source, entry.output
    )
}

fn csv_row(entry: &EntryInfo) -> String {
    let fields: Vec<&str> = entry.fields.iter().map(|f| f.as_str()).collect();
    [
        csv_field(entry.source.as_str()),
        csv_field(entry.output.as_str()),
        entry.parameterized.to_string(),
        entry.mode.to_string(),
        entry.bytes.to_string(),
        csv_field(&fields.join(" ")),
    ]
    .join(",")
}

/// Quote a field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
