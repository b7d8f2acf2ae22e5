//! `xref nav` command implementation.

use clap::Args;
use xref_nav::{NavConfig, NavTree};

use crate::error::CliError;
use crate::input::InputArgs;
use crate::output::Output;

/// Arguments for the nav command.
#[derive(Args)]
pub(crate) struct NavArgs {
    #[command(flatten)]
    pub(crate) input: InputArgs,

    /// Page filename to highlight (e.g. "module-ui.html").
    #[arg(short, long, default_value = "index.html")]
    page: String,

    /// Print the navigation as JSON instead of markup.
    #[arg(long)]
    json: bool,
}

impl NavArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.input.load_config()?;
        let published = self.input.publish(&config)?;

        let nav_config = NavConfig {
            use_longname_in_nav: config.templates.use_longname_in_nav,
        };
        let tree = NavTree::build(&published.members, &published.registry, &nav_config);
        let view = tree.view(&self.page);
        if view.current().is_empty() {
            output.warning(&format!("Page {} is not in the navigation", self.page));
        }

        let rendered = if self.json {
            serde_json::to_string_pretty(&view.items()).map_err(|source| CliError::Json {
                path: "stdout".to_owned(),
                source,
            })?
        } else {
            view.render()
        };
        output.result(&rendered)?;
        Ok(())
    }
}
