//! Purpose: `adgraph` CLI entry point.
//! Role: Binary crate root; parses args, builds the client config, emits JSON on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: `schema` and `validate` never touch the network or require credentials.
#![allow(clippy::result_large_err)]
use std::ffi::OsString;
use std::io::{self, IsTerminal, Read};

use clap::{Args, Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use adgraph::api::{ClientConfig, Error, ErrorKind, GraphClient, to_exit_code};
use adgraph::core::schema::{Choice, Schema};
use adgraph::core::validate::CollectionMatch;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `adgraph --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, &cli.credentials)
        .map_err(add_remote_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "adgraph",
    version,
    about = "Typed client for the Graph ads API",
    long_about = None,
    after_help = r#"EXAMPLES
  $ adgraph schema adcampaign
  $ adgraph validate adcampaign '{"name": "spring", "campaign_status": 1}'
  $ adgraph list adcampaign act_123 --limit 50
  $ adgraph show adgroup 6004163746239
  $ adgraph get /me/adaccounts --param fields=name,currency

ENVIRONMENT
  ADGRAPH_ACCESS_TOKEN, ADGRAPH_APP_ID, ADGRAPH_APP_SECRET, ADGRAPH_GRAPH_URL
  RUST_LOG controls diagnostics on stderr (default: warn)."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(flatten)]
    credentials: Credentials,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

/// Flags that override `ADGRAPH_*` environment values.
#[derive(Args, Clone, Debug, Default)]
struct Credentials {
    #[arg(long, global = true, help = "Graph endpoint, e.g. https://graph.facebook.com")]
    graph_url: Option<String>,
    #[arg(long, global = true, help = "Access token (overrides ADGRAPH_ACCESS_TOKEN)")]
    token: Option<String>,
    #[arg(long, global = true, help = "App id (overrides ADGRAPH_APP_ID)")]
    app_id: Option<String>,
    #[arg(long, global = true, help = "App secret (overrides ADGRAPH_APP_SECRET)")]
    app_secret: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum MatchMode {
    /// Every list element and dict pair must conform.
    #[default]
    Every,
    /// One conforming element (or the first dict pair) is enough.
    Sample,
}

impl From<MatchMode> for CollectionMatch {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Every => CollectionMatch::Every,
            MatchMode::Sample => CollectionMatch::Sample,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print the field schema of a resource kind")]
    Schema {
        #[arg(help = "Resource kind, e.g. adcampaign, adgroup, stats")]
        kind: String,
    },
    #[command(
        about = "Validate a JSON object as a resource kind and print the normalized record",
        after_help = r#"EXAMPLES
  $ adgraph validate adgroup '{"bid_type": "CPC", "targeting": {"countries": ["US"]}}'
  $ cat campaign.json | adgraph validate adcampaign -"#
    )]
    Validate {
        kind: String,
        #[arg(help = "JSON object, or - to read stdin")]
        json: String,
        #[arg(long = "match", value_enum, default_value = "every")]
        match_mode: MatchMode,
    },
    #[command(about = "GET a raw Graph resource path")]
    Get {
        #[arg(help = "Resource path, e.g. /me/adaccounts")]
        path: String,
        #[arg(long = "param", value_parser = parse_param, help = "Query parameter as key=value (repeatable)")]
        params: Vec<(String, String)>,
        #[arg(long, help = "Follow paging.next and print every item")]
        all: bool,
    },
    #[command(about = "List every resource of a kind under a container id")]
    List {
        kind: String,
        #[arg(help = "Container id, e.g. act_123 or a campaign id")]
        container: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
        #[arg(long)]
        include_deleted: bool,
    },
    #[command(about = "Fetch one resource by id")]
    Show { kind: String, id: String },
    #[command(about = "Exchange the configured token for a long-lived one")]
    ExchangeToken,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

fn build_client(credentials: &Credentials) -> Result<GraphClient, Error> {
    let mut config = ClientConfig::from_env()?;
    if let Some(graph_url) = &credentials.graph_url {
        config = config.with_graph_endpoint(graph_url.clone())?;
    }
    if let Some(token) = &credentials.token {
        config = config.with_access_token(token.clone());
    }
    if let Some(app_id) = &credentials.app_id {
        config = config.with_app_id(app_id.clone());
    }
    if let Some(app_secret) = &credentials.app_secret {
        config = config.with_app_secret(app_secret.clone());
    }
    Ok(GraphClient::new(config))
}

fn read_json_arg(raw: &str) -> Result<String, Error> {
    if raw != "-" {
        return Ok(raw.to_string());
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_source(err)
    })?;
    Ok(buf)
}

fn schema_json(schema: &Schema, collection: &str) -> Value {
    let fields = schema
        .fields()
        .iter()
        .map(|field| {
            let mut entry = Map::new();
            entry.insert("name".to_string(), json!(field.name()));
            entry.insert("shape".to_string(), json!(field.shape().to_string()));
            if let Some(choices) = field.allowed_choices() {
                let rendered: Vec<Value> = choices.iter().map(choice_json).collect();
                entry.insert("choices".to_string(), Value::Array(rendered));
            }
            if field.is_create_only() {
                entry.insert("create_only".to_string(), json!(true));
            }
            Value::Object(entry)
        })
        .collect::<Vec<_>>();
    json!({
        "name": schema.name(),
        "collection": collection,
        "fields": fields,
    })
}

fn choice_json(choice: &Choice) -> Value {
    match choice {
        Choice::Int(value) => json!(value),
        Choice::Text(value) => json!(value),
        Choice::IntList(values) => json!(values),
        Choice::TextList(values) => json!(values),
    }
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn add_remote_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Remote || err.hint().is_some() {
        return err;
    }
    err.with_hint("The Graph API rejected the request; see payload for details.")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::Configuration => "missing configuration",
        ErrorKind::Argument => "invalid argument",
        ErrorKind::UnknownField => "unknown field",
        ErrorKind::MissingValue => "field has no value",
        ErrorKind::Validation => "validation failed",
        ErrorKind::Choice => "value is not an allowed choice",
        ErrorKind::Remote => "graph api error",
        ErrorKind::Decode => "malformed response",
        ErrorKind::Io => "i/o error",
    }
    .to_string()
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(field) = err.field() {
        inner.insert("field".to_string(), json!(field));
    }
    if let Some(value) = err.value() {
        inner.insert("value".to_string(), json!(value));
    }
    if let Some(allowed) = err.allowed() {
        inner.insert("allowed".to_string(), json!(allowed));
    }
    if let Some(payload) = err.payload() {
        inner.insert("payload".to_string(), payload.clone());
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    let details = [
        ("hint:", err.hint()),
        ("field:", err.field()),
        ("value:", err.value()),
        ("allowed:", err.allowed()),
    ];
    for (label, detail) in details {
        if let Some(detail) = detail {
            lines.push(format!(
                "{} {detail}",
                colorize_label(label, use_color, AnsiColor::Yellow)
            ));
        }
    }
    if let Some(payload) = err.payload() {
        lines.push(format!(
            "{} {payload}",
            colorize_label("payload:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
