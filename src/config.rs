use std::path::PathBuf;

/// Where the viewer loads the model from, relative to the project root.
pub const DEFAULT_OUTPUT_PATH: &str = "src/models/machine.glb";

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub output_path: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl GeneratorConfig {
    /// `args` excludes the program name. The first argument, if any,
    /// replaces the default destination.
    pub fn from_args(args: &[String]) -> Self {
        let path = args
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_OUTPUT_PATH);
        Self {
            output_path: PathBuf::from(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectConfig {
    pub input_path: PathBuf,
    pub json: bool,
}

impl InspectConfig {
    pub fn from_args(args: &[String]) -> Self {
        let json = args.iter().any(|a| a == "--json");
        let path = args
            .iter()
            .find(|a| !a.starts_with("--"))
            .map(String::as_str)
            .unwrap_or(DEFAULT_OUTPUT_PATH);
        Self {
            input_path: PathBuf::from(path),
            json,
        }
    }
}
