mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::engine::Engine;
use crate::io::config_io;
use crate::io::json_store::JsonFileStore;
use crate::io::persist::Persistence;
use crate::io::recovery;
use crate::model::card::CardDraft;
use crate::ops::board_ops::MoveRequest;
use crate::ops::check;
use crate::ops::drop_position::DropGeometry;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let board_dir = resolve_board_dir(cli.board_dir.as_deref())?;

    match cli.command {
        Commands::Init(args) => cmd_init(&board_dir, args),

        // Read commands
        Commands::Show => cmd_show(&board_dir, json),
        Commands::DropIndex(args) => cmd_drop_index(&board_dir, args, json),
        Commands::Check => cmd_check(&board_dir, json),
        Commands::Recovery(args) => cmd_recovery(&board_dir, args, json),

        // Write commands
        Commands::Add(args) => cmd_add(&board_dir, args, json),
        Commands::Rm(args) => cmd_rm(&board_dir, args),
        Commands::Mv(args) => cmd_mv(&board_dir, args),
        Commands::Rename(args) => cmd_rename(&board_dir, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_board_dir(dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match dir {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(std::env::current_dir()?),
    }
}

fn open_engine(board_dir: &Path) -> Result<Engine<JsonFileStore>, Box<dyn std::error::Error>> {
    let config = config_io::read_config(board_dir)?;
    let store = JsonFileStore::new(config_io::state_path(board_dir, &config));
    Ok(Engine::from_config(store, &config))
}

/// Parse `key=value`. The value is taken as JSON when it parses, otherwise
/// as a plain string.
fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid field '{}': expected KEY=VALUE", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid field '{}': empty key", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(board_dir: &Path, json: bool) -> CmdResult {
    let engine = open_engine(board_dir)?;
    let board = engine.board();
    if json {
        println!("{}", serde_json::to_string_pretty(&BoardJson::new(board))?);
    } else {
        print!("{}", format_board(board));
    }
    if let Some(count) = recovery::recovery_entry_count(board_dir) {
        eprintln!(
            "note: {} entr{} in the recovery log (see `deals recovery`)",
            count,
            if count == 1 { "y" } else { "ies" }
        );
    }
    Ok(())
}

fn cmd_drop_index(board_dir: &Path, args: DropIndexArgs, json: bool) -> CmdResult {
    let engine = open_engine(board_dir)?;
    let column = engine
        .board()
        .column(&args.column)
        .ok_or_else(|| format!("column not found: {}", args.column))?;
    let geometry: DropGeometry = engine.geometry();
    let index = geometry.drop_index(args.offset_y, column.len());
    if json {
        println!(
            "{}",
            serde_json::json!({
                "column": column.id,
                "offset_y": args.offset_y,
                "card_count": column.len(),
                "index": index,
            })
        );
    } else {
        println!("{}", index);
    }
    Ok(())
}

fn cmd_check(board_dir: &Path, json: bool) -> CmdResult {
    // Read the raw state: opening a store would replace a malformed board
    // with the seed before we got to look at it.
    let config = config_io::read_config(board_dir)?;
    let mut store = JsonFileStore::new(config_io::state_path(board_dir, &config));
    let board = match store.load()? {
        Some(board) => board,
        None => config.seed_board(),
    };
    let result = check::check_board(&board);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_check(&result));
        if result.valid {
            println!("Board is valid.");
        }
    }

    if result.valid {
        Ok(())
    } else {
        Err("board has integrity errors".into())
    }
}

fn cmd_recovery(board_dir: &Path, args: RecoveryArgs, json: bool) -> CmdResult {
    let entries = recovery::read_recovery_entries(board_dir, args.limit, None);
    if json {
        let values: Vec<Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else if entries.is_empty() {
        println!("Recovery log is empty.");
    } else {
        for entry in &entries {
            print!("{}", entry.to_display_markdown());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(board_dir: &Path, args: AddArgs, json: bool) -> CmdResult {
    let mut engine = open_engine(board_dir)?;
    if let Some(column) = &args.column
        && engine.board().column(column).is_none()
    {
        return Err(format!("column not found: {}", column).into());
    }
    if engine.board().columns.is_empty() {
        return Err("board has no columns".into());
    }

    let mut fields = IndexMap::new();
    for raw in &args.fields {
        let (key, value) = parse_field(raw)?;
        fields.insert(key, value);
    }

    let draft = CardDraft {
        column: args.column,
        title: args.title,
        value: args.value,
        fields,
    };
    let id = engine
        .add_card(draft)?
        .ok_or("card was not added")?;

    if json {
        let card = engine.board().card(&id).ok_or("card was not added")?;
        println!("{}", serde_json::to_string_pretty(card)?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_rm(board_dir: &Path, args: RmArgs) -> CmdResult {
    let mut engine = open_engine(board_dir)?;
    if !engine.delete_card(&args.id)? {
        return Err(format!("card not found: {}", args.id).into());
    }
    Ok(())
}

fn cmd_mv(board_dir: &Path, args: MvArgs) -> CmdResult {
    let mut engine = open_engine(board_dir)?;
    let board = engine.board();

    let (ci, index) = board
        .locate(&args.id)
        .ok_or_else(|| format!("card not found: {}", args.id))?;
    if board.column(&args.column).is_none() {
        return Err(format!("column not found: {}", args.column).into());
    }

    let request = MoveRequest {
        card_id: args.id.clone(),
        source_column: board.columns[ci].id.clone(),
        source_index: index,
        target_column: args.column.clone(),
        target_index: args.index.unwrap_or(usize::MAX),
    };
    if !engine.move_card(&request) {
        println!("{} is already there", args.id);
    }
    Ok(())
}

fn cmd_rename(board_dir: &Path, args: RenameArgs) -> CmdResult {
    let mut engine = open_engine(board_dir)?;
    if engine.board().column(&args.column).is_none() {
        return Err(format!("column not found: {}", args.column).into());
    }
    if args.name.trim().is_empty() {
        return Err("column name cannot be blank".into());
    }
    engine.rename_column(&args.column, &args.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_json_and_plain() {
        assert_eq!(
            parse_field("probability=0.4").unwrap(),
            ("probability".to_string(), serde_json::json!(0.4))
        );
        assert_eq!(
            parse_field("tags=[\"a\",\"b\"]").unwrap(),
            ("tags".to_string(), serde_json::json!(["a", "b"]))
        );
        assert_eq!(
            parse_field("company=Acme Corp").unwrap(),
            ("company".to_string(), serde_json::json!("Acme Corp"))
        );
        assert_eq!(
            parse_field("note=a=b").unwrap(),
            ("note".to_string(), serde_json::json!("a=b"))
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }
}
