use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use tool_server::dispatch::{AccountBookTool, Dispatcher, TimetableTool};
use tool_server::ledger::{
    ConnectError, DEFAULT_CONFIG_FILE, DEFAULT_WORKSHEET, GoogleConnector, LedgerConfig,
    MemorySheet, SheetSession,
};
use tool_server::logging;
use tool_server::mcp::McpServer;
use tool_server::timetable::{
    DATE_FORMAT, DEFAULT_BASE_URL, DEFAULT_MAX_RESULTS, DEFAULT_TIMEOUT_SECS, ReportOptions,
    TIME_FORMAT, TimetableClient, TimetableConfig, TimetableRequest,
};
use tool_server::web::{AppState, create_router};

#[derive(Parser, Debug)]
#[command(
    name = "tool-server",
    version,
    about = "Calculator, THSR timetable and account book tools for LLM clients"
)]
struct Cli {
    /// Account book configuration file
    #[arg(long, global = true, env = "TOOL_SERVER_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, env = "TOOL_SERVER_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Where account book entries are kept
    #[arg(long, global = true, value_enum, default_value_t, env = "TOOL_SERVER_LEDGER")]
    ledger: LedgerBackend,

    /// Timetable search endpoint
    #[arg(long, global = true, env = "THSR_TIMETABLE_URL", default_value = DEFAULT_BASE_URL)]
    timetable_url: String,

    /// Timetable request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
enum LedgerBackend {
    /// Google Sheets spreadsheet named in the configuration file
    #[default]
    Google,
    /// In-process sheet, lost on exit
    Memory,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP over stdin/stdout (the default)
    Serve,
    /// Serve the tools over HTTP
    ServeHttp {
        #[arg(long, env = "TOOL_SERVER_ADDR", default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    /// Print the timetable for one or more routes
    Timetable {
        start: String,
        destination: String,
        /// Travel date, YYYY/MM/DD (default today)
        #[arg(long)]
        date: Option<String>,
        /// Earliest departure, HH:MM (default now)
        #[arg(long)]
        time: Option<String>,
        /// Further routes on the same date, as START:DESTINATION
        #[arg(long = "also")]
        also: Vec<Route>,
        /// Trains listed per route; 0 lists all
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS as i64)]
        max_results: i64,
    },
}

/// `START:DESTINATION` pair.
#[derive(Debug, Clone, PartialEq)]
struct Route {
    start: String,
    destination: String,
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':').map(|(a, b)| (a.trim(), b.trim())) {
            Some((start, destination)) if !start.is_empty() && !destination.is_empty() => Ok(Self {
                start: start.to_string(),
                destination: destination.to_string(),
            }),
            _ => Err(format!("expected START:DESTINATION, got {s:?}")),
        }
    }
}

impl Cli {
    fn timetable_config(&self) -> TimetableConfig {
        TimetableConfig::new()
            .with_base_url(&self.timetable_url)
            .with_timeout(self.timeout)
    }
}

fn memory_session() -> Result<Box<dyn SheetSession>, ConnectError> {
    Ok(Box::new(MemorySheet::new(DEFAULT_WORKSHEET)))
}

/// Build the dispatcher. Must run outside the tokio runtime: the timetable
/// tool owns a blocking HTTP client.
fn build_dispatcher(cli: &Cli) -> Result<Dispatcher, Box<dyn Error>> {
    let timetable = TimetableTool::new(TimetableClient::blocking(&cli.timetable_config())?);
    let account_book = match cli.ledger {
        LedgerBackend::Memory => AccountBookTool::new(memory_session),
        LedgerBackend::Google => {
            AccountBookTool::new(GoogleConnector::new(LedgerConfig::load_or_default(&cli.config)))
        }
    };
    Ok(Dispatcher::new(timetable, account_book))
}

fn runtime() -> io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}

fn serve_stdio(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let server = McpServer::new(Arc::new(build_dispatcher(cli)?));
    server.run(io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}

fn serve_http(cli: &Cli, addr: SocketAddr) -> Result<(), Box<dyn Error>> {
    let dispatcher = Arc::new(build_dispatcher(cli)?);
    let app = create_router(AppState::new(Arc::clone(&dispatcher)));

    runtime()?.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "listening");
        axum::serve(listener, app).await
    })?;

    // Last reference dropped here, off the runtime.
    drop(dispatcher);
    Ok(())
}

fn print_timetables(
    cli: &Cli,
    first: Route,
    date: Option<String>,
    time: Option<String>,
    also: Vec<Route>,
    max_results: i64,
) -> Result<(), Box<dyn Error>> {
    let now = Local::now().naive_local();
    let date = date.unwrap_or_else(|| now.format(DATE_FORMAT).to_string());
    let time = time.unwrap_or_else(|| now.format(TIME_FORMAT).to_string());

    let requests: Vec<_> = std::iter::once(first)
        .chain(also)
        .map(|route| {
            let request = TimetableRequest::new(route.start, route.destination, &date, &time);
            let options = ReportOptions::default()
                .with_max_results(max_results)
                .after(&time);
            (request, options)
        })
        .collect();

    let client = TimetableClient::non_blocking(&cli.timetable_config())?;
    let reports = runtime()?.block_on(client.search_many(&requests));

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{report}");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        None | Some(Command::Serve) => serve_stdio(&cli),
        Some(Command::ServeHttp { addr }) => serve_http(&cli, addr),
        Some(Command::Timetable {
            ref start,
            ref destination,
            ref date,
            ref time,
            ref also,
            max_results,
        }) => {
            let first = Route {
                start: start.clone(),
                destination: destination.clone(),
            };
            print_timetables(&cli, first, date.clone(), time.clone(), also.clone(), max_results)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_file.as_deref()) {
        eprintln!("tool-server: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            eprintln!("tool-server: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn routes_parse() {
        assert_eq!(
            "TaiPei:ZuoYing".parse::<Route>(),
            Ok(Route {
                start: "TaiPei".into(),
                destination: "ZuoYing".into()
            })
        );
        assert!("TaiPei".parse::<Route>().is_err());
        assert!(":ZuoYing".parse::<Route>().is_err());
    }

    #[test]
    fn defaults_to_stdio_with_google_ledger() {
        let cli = Cli::try_parse_from(["tool-server"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.ledger, LedgerBackend::Google);
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn timetable_subcommand_collects_extra_routes() {
        let cli = Cli::try_parse_from([
            "tool-server",
            "timetable",
            "TaiPei",
            "TaiZhong",
            "--also",
            "NanGang:ZuoYing",
            "--also",
            "台南:台北",
            "--ledger",
            "memory",
        ])
        .unwrap();
        assert_eq!(cli.ledger, LedgerBackend::Memory);
        match cli.command {
            Some(Command::Timetable { also, max_results, .. }) => {
                assert_eq!(also.len(), 2);
                assert_eq!(also[1].start, "台南");
                assert_eq!(max_results, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
