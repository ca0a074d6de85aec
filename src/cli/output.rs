use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print `value` as JSON/YAML, or run `human` for the plain format.
    pub fn emit<T, F>(self, value: &T, human: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T),
    {
        match self {
            OutputFormat::Human => human(value),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        }
        Ok(())
    }
}
