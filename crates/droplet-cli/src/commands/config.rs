use clap::Subcommand;
use droplet_core::{Config, CoreError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a config value
    Get { key: String },
    /// Set a config value and persist it
    Set { key: String, value: String },
    /// Print the whole config as TOML
    Show,
    /// Print the config file path
    Path,
}

pub fn run(action: ConfigAction) -> droplet_core::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(CoreError::Custom(format!("unknown config key: {key}"))),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigAction::Show => {
            let config = Config::load_or_default();
            let rendered =
                toml::to_string_pretty(&config).map_err(|e| CoreError::Custom(e.to_string()))?;
            print!("{rendered}");
        }
        ConfigAction::Path => {
            println!("{}", Config::file_path()?.display());
        }
    }
    Ok(())
}
