//! `wikisync convert` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use wikisync_renderer::Converter;

use crate::error::CliError;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Path to the markdown document.
    file: PathBuf,
}

impl ConvertArgs {
    /// Print the storage markup of the document to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or converted.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let raw = std::fs::read_to_string(&self.file)?;
        let markup = Converter::new().convert(&raw)?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(markup.as_bytes())?;
        writeln!(stdout)?;
        Ok(())
    }
}
