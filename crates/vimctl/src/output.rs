//! Structured output for `-o json` and `-o yaml`

use serde::Serialize;

use crate::cli;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// Structured format selected on the command line, if any
    pub fn from_cli(format: cli::OutputFormat) -> Option<Self> {
        match format {
            cli::OutputFormat::Json => Some(Self::Json),
            cli::OutputFormat::Yaml => Some(Self::Yaml),
            cli::OutputFormat::Auto => None,
        }
    }
}

pub fn render<T: Serialize>(data: T, format: OutputFormat) -> Result<String> {
    let value = serde_json::to_value(data)?;
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&value)?,
        OutputFormat::Yaml => serde_yaml::to_string(&value)?,
    })
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    println!("{}", render(data, format)?.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auto_has_no_structured_format() {
        assert_eq!(OutputFormat::from_cli(cli::OutputFormat::Auto), None);
        assert_eq!(
            OutputFormat::from_cli(cli::OutputFormat::Yaml),
            Some(OutputFormat::Yaml)
        );
    }

    #[test]
    fn renders_json_and_yaml() {
        let data = json!({"item_name": "myFolder", "item_type": "Folder"});

        let rendered = render(&data, OutputFormat::Json).unwrap();
        assert!(rendered.contains("\"item_name\": \"myFolder\""));

        let rendered = render(&data, OutputFormat::Yaml).unwrap();
        assert!(rendered.contains("item_name: myFolder"));
    }
}
