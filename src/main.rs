use std::env;
use std::process::ExitCode;

use log::info;
use machine_asset::config::GeneratorConfig;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = GeneratorConfig::from_args(&args);
    info!("generating {}", config.output_path.display());

    match machine_asset::generate(&config) {
        Ok(path) => {
            let path = path.canonicalize().unwrap_or(path);
            println!("Generated {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to generate: {}", e);
            ExitCode::FAILURE
        }
    }
}
