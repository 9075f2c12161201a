use std::io::Read;

use anyhow::Context;

pub fn to_file_or_stdout(maybe_file_name: Option<&String>, output: &str) -> anyhow::Result<()> {
    if let Some(file_name) = maybe_file_name {
        tracing::debug!("Writing output to {file_name}");
        std::fs::write(file_name, output).with_context(|| format!("Unable to write {file_name}"))
    } else {
        print!("{output}");
        Ok(())
    }
}

pub fn from_file_or_stdin(maybe_file_name: Option<&String>) -> anyhow::Result<String> {
    match maybe_file_name {
        Some(f) => std::fs::read_to_string(f).with_context(|| format!("Unable to read {f}")),
        None => {
            tracing::debug!("No input files specified, using stdin");
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Error when reading from stdin")?;
            Ok(buf)
        }
    }
}
