//! Input arguments and loading shared by all commands.

use std::path::{Path, PathBuf};

use clap::Args;
use xref_config::{CliSettings, Config};
use xref_core::{DocletSet, PublishConfig, PublishOutput, Publisher, Tutorial};

use crate::error::CliError;

/// Doclet, tutorial and configuration inputs.
#[derive(Args)]
pub(crate) struct InputArgs {
    /// Doclet JSON array produced by the documentation parser.
    doclets: PathBuf,

    /// Tutorial JSON array of `{name, title, children}` objects.
    #[arg(long)]
    tutorials: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover xref.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show full long names in the navigation (overrides config).
    #[arg(long)]
    use_longname_in_nav: bool,

    /// Base URL for ticket links (overrides config).
    #[arg(long, env = "XREF_PHABRICATOR_BASE_URL")]
    phabricator_base_url: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl InputArgs {
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            use_longname_in_nav: self.use_longname_in_nav.then_some(true),
            phabricator_base_url: self.phabricator_base_url.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Read the inputs and run the pipeline.
    pub(crate) fn publish(&self, config: &Config) -> Result<PublishOutput, CliError> {
        let doclets = read_doclets(&self.doclets)?;
        let tutorials = match &self.tutorials {
            Some(path) => read_tutorials(path)?,
            None => Vec::new(),
        };
        tracing::debug!(
            doclet_count = doclets.len(),
            tutorial_count = tutorials.len(),
            "Inputs loaded"
        );
        let publisher = Publisher::new(publish_config(config));
        Ok(publisher.run(doclets, &tutorials)?)
    }

    pub(crate) fn doclets_path(&self) -> &Path {
        &self.doclets
    }
}

fn read_doclets(path: &Path) -> Result<DocletSet, CliError> {
    let content = std::fs::read_to_string(path)?;
    DocletSet::from_json(&content).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn read_tutorials(path: &Path) -> Result<Vec<Tutorial>, CliError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Pipeline settings from the `[templates]` section.
pub(crate) fn publish_config(config: &Config) -> PublishConfig {
    PublishConfig {
        ticket_base_url: config.templates.phabricator_base_url.clone(),
        ticket_prefix: config.templates.ticket_prefix.clone(),
        link_map: config.templates.link_map.clone(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_read_tutorials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tutorials.json");
        std::fs::write(
            &path,
            r#"[{"name": "intro", "title": "Intro", "children": [{"name": "setup"}]}]"#,
        )
        .unwrap();

        let tutorials = read_tutorials(&path).unwrap();

        assert_eq!(tutorials.len(), 1);
        assert_eq!(tutorials[0].children[0].display_title(), "setup");
    }

    #[test]
    fn test_read_doclets_reports_path_on_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doclets.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = read_doclets(&path).unwrap_err();

        assert!(matches!(err, CliError::Json { .. }));
        assert!(err.to_string().contains("doclets.json"));
    }

    #[test]
    fn test_read_doclets_missing_file() {
        let err = read_doclets(Path::new("/nonexistent/doclets.json")).unwrap_err();

        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_publish_config_from_templates() {
        let mut config = Config::default();
        config.templates.phabricator_base_url = "https://tickets.example.org/".to_owned();
        config
            .templates
            .link_map
            .insert("external:Promise".to_owned(), "https://example.org/Promise".to_owned());

        let publish = publish_config(&config);

        assert_eq!(publish.ticket_base_url, "https://tickets.example.org/");
        assert_eq!(publish.ticket_prefix, "T");
        assert_eq!(
            publish.link_map.get("external:Promise").map(String::as_str),
            Some("https://example.org/Promise")
        );
    }
}
