use greentea_mysql::config::{default_config_path, load_config};
use greentea_mysql::core::db::{ConnectParams, Connection, MysqlClient};
use greentea_mysql::core::{MysqlError, Result};
use greentea_mysql::results_grid::{ExportFormat, ResultsGrid};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  greentea-mysql [--config PATH] [--format text|csv|json] SQL
  greentea-mysql [--format text|csv|json] HOST USER PASSWORD DBNAME [PORT] SQL";

/// Parsed command line
#[derive(Debug, PartialEq)]
struct Options {
    target: Target,
    format: Option<ExportFormat>,
    sql: String,
}

#[derive(Debug, PartialEq)]
enum Target {
    ConfigFile(Option<PathBuf>),
    Params(ConnectParams),
}

fn parse_args(args: &[String]) -> std::result::Result<Options, String> {
    let mut config = None;
    let mut format = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--format" => {
                let name = iter.next().ok_or("--format needs a value")?;
                format = Some(name.parse::<ExportFormat>().map_err(|e| e.to_string())?);
            }
            "-h" | "--help" => return Err(String::new()),
            _ => positional.push(arg.clone()),
        }
    }

    let sql = positional.pop().ok_or("missing SQL statement")?;
    let target = match positional.as_slice() {
        [] => Target::ConfigFile(config),
        [host, user, password, dbname, rest @ ..] if rest.len() <= 1 && config.is_none() => {
            let mut params = ConnectParams::new(host, user, password, dbname);
            if let Some(port) = rest.first() {
                let port = port.parse().map_err(|_| format!("invalid port '{}'", port))?;
                params = params.with_port(port);
            }
            Target::Params(params)
        }
        _ => return Err("expected either SQL alone or HOST USER PASSWORD DBNAME [PORT] SQL".to_string()),
    };

    Ok(Options { target, format, sql })
}

fn run(options: Options) -> Result<()> {
    let (params, configured_format) = match options.target {
        Target::Params(params) => (params, ExportFormat::Text),
        Target::ConfigFile(path) => {
            let path = path
                .or_else(default_config_path)
                .ok_or_else(|| MysqlError::Config("no config file given and no config dir found".to_string()))?;
            let config = load_config(&path)?;
            let format = config.format()?;
            (config.mysql, format)
        }
    };
    let format = options.format.unwrap_or(configured_format);

    let mut conn = Connection::with_library(MysqlClient, params)?;
    conn.connect()?;
    info!(host = %conn.params().host, "connected");

    conn.query(&options.sql)?;
    match conn.store_result() {
        Ok(rs) => {
            let output = ResultsGrid::from_result_set(&rs).export(format)?;
            print!("{}", output);
            if format == ExportFormat::Text {
                println!("{} row(s) in set", rs.num_rows());
            }
        }
        // The statement succeeded, so an empty detail means it had no result set
        Err(MysqlError::StoreResult { detail }) if detail.is_empty() => println!("Query OK"),
        Err(e) => return Err(e),
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
