use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, CONFIG_FILE};
use crate::model::config::{BoardConfig, ColumnConfig};

/// Validate that a column ID is lowercase alphanumeric with hyphens/underscores only.
fn validate_column_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("column id cannot be empty".to_string());
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(format!(
            "invalid column id '{}': use lowercase letters, digits, '-' or '_'",
            id
        ));
    }
    Ok(())
}

/// Build the config `deals init` writes from its arguments.
pub fn init_config(args: &InitArgs) -> Result<BoardConfig, String> {
    let mut config = BoardConfig::default();
    for pair in args.column.chunks(2) {
        let [id, name] = pair else {
            return Err("--column takes an id and a name".to_string());
        };
        validate_column_id(id)?;
        if config.columns.iter().any(|c| &c.id == id) {
            return Err(format!("duplicate column id '{}'", id));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("column '{}' needs a name", id));
        }
        config.columns.push(ColumnConfig {
            id: id.clone(),
            name: name.to_string(),
        });
    }
    Ok(config)
}

pub fn cmd_init(board_dir: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_io::config_path(board_dir);
    if path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    std::fs::create_dir_all(board_dir)?;
    let config = init_config(&args)?;
    config_io::write_config(board_dir, &config)?;
    println!("Wrote {}", board_dir.join(CONFIG_FILE).display());
    Ok(())
}
