//! `xref process` command implementation.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use xref_core::{DocletSet, Page, SourceFile};

use crate::error::CliError;
use crate::input::InputArgs;
use crate::output::Output;

/// Arguments for the process command.
#[derive(Args)]
pub(crate) struct ProcessArgs {
    #[command(flatten)]
    pub(crate) input: InputArgs,

    /// Output file for processed doclets (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the output JSON.
    #[arg(long)]
    pretty: bool,
}

/// Written document: rewritten doclets and the pages to generate.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessedDocs<'a> {
    doclets: &'a DocletSet,
    pages: &'a [Page],
    source_files: &'a [SourceFile],
}

impl ProcessArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.input.load_config()?;
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        output.info(&format!("Doclets: {}", self.input.doclets_path().display()));

        let published = self.input.publish(&config)?;

        let docs = ProcessedDocs {
            doclets: &published.doclets,
            pages: &published.pages,
            source_files: &published.source_files,
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&docs)
        } else {
            serde_json::to_string(&docs)
        }
        .map_err(|source| CliError::Json {
            path: self
                .output
                .as_ref()
                .map_or_else(|| "stdout".to_owned(), |p| p.display().to_string()),
            source,
        })?;

        match &self.output {
            Some(path) => std::fs::write(path, json)?,
            None => output.result(&json)?,
        }

        output.heading("Summary");
        output.count("Doclets", published.doclets.len());
        output.count("Links", published.registry.len());
        output.count("Aliases", published.aliases.added.len());
        output.count("Pages", published.pages.len());
        output.count("Sources", published.source_files.len());
        output.warn_list("Ambiguous", &published.aliases.ambiguous);

        if let Some(path) = &self.output {
            output.success(&format!("Processed doclets written to {}", path.display()));
        }
        Ok(())
    }
}
