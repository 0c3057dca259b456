//! Command-line front end over one record collection.
//!
//! # Responsibility
//! - Map flags onto `StoreConfig` and a model, then run one repository call.
//! - Print results as JSON on stdout and failures on stderr.

use clap::{Parser, Subcommand};
use flatstore_core::{
    bookmark_model, init_logging, QueryError, QueryResult, Record, RecordRepository, RepoError,
    SchemaModel, StoreConfig,
};
use log::debug;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "flatstore")]
#[command(version, about = "Query and edit flat JSON record collections", long_about = None)]
struct Cli {
    /// Directory holding `<Type>s.json` collection files.
    #[arg(long, env = "FLATSTORE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Record type; `Bookmark` uses the built-in bookmark model.
    #[arg(long = "type", default_value = "Bookmark")]
    type_name: String,

    /// Uniqueness key for non-bookmark types.
    #[arg(long)]
    key: Option<String>,

    /// Write indented JSON.
    #[arg(long)]
    pretty: bool,

    /// Enables file logging into this directory.
    #[arg(long, env = "FLATSTORE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[arg(long, default_value_t = flatstore_core::default_log_level().to_string())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List records, optionally sorted and filtered.
    List {
        /// Query parameter as `key=value`; repeat for several.
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Show one record.
    Get { id: u64 },
    /// Add a record given as a JSON object.
    Add { json: String },
    /// Replace a record given as a JSON object carrying its `Id`.
    Update { json: String },
    /// Remove a record by id.
    Remove { id: u64 },
    /// Remove records by position in the collection.
    RemoveIndex {
        #[arg(required = true)]
        indices: Vec<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::new(&cli.data_dir)?.with_pretty_json(cli.pretty);
    let model = select_model(&cli.type_name, cli.key.as_deref());
    let mut repo = RecordRepository::new(model, &config);
    debug!(
        "event=cli_run module=cli status=start file={}",
        repo.file_path().display()
    );

    match cli.command {
        Command::List { params } => {
            let params = flatstore_core::QueryParams::from_pairs(params);
            let query = (!params.is_empty()).then_some(&params);
            println!("{}", list_output(repo.get_all(query))?);
        }
        Command::Get { id } => match repo.get(id) {
            Some(record) => print_json(&record)?,
            None => return Err(RepoError::NotFound(id).into()),
        },
        Command::Add { json } => {
            let stored = repo.add(parse_record(&json)?).inspect_err(print_conflict)?;
            print_json(&stored)?;
        }
        Command::Update { json } => {
            repo.update(parse_record(&json)?).inspect_err(print_conflict)?;
            println!("updated");
        }
        Command::Remove { id } => {
            if !repo.remove(id)? {
                return Err(RepoError::NotFound(id).into());
            }
            println!("removed {id}");
        }
        Command::RemoveIndex { indices } => {
            let removed = repo.remove_by_index(&indices)?;
            println!("removed {removed}");
        }
    }

    Ok(())
}

fn select_model(type_name: &str, key: Option<&str>) -> SchemaModel {
    if type_name == flatstore_core::model::bookmark::BOOKMARK_TYPE {
        return bookmark_model();
    }
    let model = SchemaModel::new(type_name);
    match key {
        Some(key) => model.key(key),
        None => model,
    }
}

fn parse_record(json: &str) -> Result<Record, Box<dyn Error>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Record::from_value(value).ok_or_else(|| "record must be a JSON object".into())
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Text printed for `list`; only an empty result is reported on stdout.
fn list_output(result: QueryResult<Vec<Record>>) -> Result<String, Box<dyn Error>> {
    match result {
        Ok(records) => Ok(serde_json::to_string_pretty(&records)?),
        Err(QueryError::NoResults) => Ok(QueryError::NoResults.to_string()),
        Err(err) => Err(err.into()),
    }
}

/// Rejected candidate carried by a key conflict.
fn conflict_candidate(err: &RepoError) -> Option<&Record> {
    match err {
        RepoError::Conflict { candidate, .. } => Some(candidate),
        _ => None,
    }
}

fn print_conflict(err: &RepoError) {
    if let Some(candidate) = conflict_candidate(err) {
        if let Err(print_err) = print_json(candidate) {
            eprintln!("warning: could not print conflicting record: {print_err}");
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
