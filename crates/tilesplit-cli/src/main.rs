//! `tilesplit` command-line host

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use tilesplit_cli::{parse_tile_address, LineConsole, ReqwestTransport, Settings};
use tilesplit_core::{
    OperatorConsole, PayloadValidator, RequestBodyProcessor, StaticConsole, TilePartitioner,
    TransportKind,
};
use tilesplit_shim::{install_fetch, FetchTransport, RequestInit};
use tracing_subscriber::EnvFilter;

fn request_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("url")
                .long("url")
                .required(true)
                .help("Request URL, including the tile address"),
        )
        .arg(
            Arg::new("body")
                .long("body")
                .required(true)
                .help("Original JSON request body"),
        )
        .arg(
            Arg::new("payload")
                .long("payload")
                .help("Substitute payload; prompts on stdin when omitted"),
        )
        .arg(
            Arg::new("tile-size")
                .long("tile-size")
                .value_parser(value_parser!(NonZeroU32))
                .help("Tile edge length, overriding the settings file"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML settings file"),
        )
}

fn cli() -> Command {
    Command::new("tilesplit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plan and send tile-split pixel writes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(request_args(
            Command::new("plan").about("Print the requests an intercepted write would become"),
        ))
        .subcommand(
            request_args(Command::new("send").about("Send a write through the interceptor"))
                .arg(
                    Arg::new("header")
                        .long("header")
                        .action(ArgAction::Append)
                        .help("Extra request header as NAME:VALUE"),
                ),
        )
        .subcommand(
            Command::new("split")
                .about("Partition a payload relative to a base tile")
                .arg(
                    Arg::new("base")
                        .long("base")
                        .required(true)
                        .help("Base tile address as X/Y"),
                )
                .arg(
                    Arg::new("payload")
                        .long("payload")
                        .required(true)
                        .help("Payload with coords and colors"),
                )
                .arg(
                    Arg::new("tile-size")
                        .long("tile-size")
                        .value_parser(value_parser!(NonZeroU32))
                        .help("Tile edge length"),
                ),
        )
}

fn settings_from(args: &ArgMatches) -> Result<Settings> {
    let config = args.get_one::<PathBuf>("config");
    Ok(Settings::load(config.map(PathBuf::as_path))?
        .with_tile_size(args.get_one::<NonZeroU32>("tile-size").copied()))
}

fn processor_from(args: &ArgMatches, settings: &Settings) -> Result<Arc<RequestBodyProcessor>> {
    let console: Arc<dyn OperatorConsole> = match args.get_one::<String>("payload") {
        Some(payload) => Arc::new(StaticConsole::answering(payload.as_str())),
        None => Arc::new(LineConsole::stdio()),
    };
    let processor = RequestBodyProcessor::new(settings.intercept.clone(), console)
        .context("building request processor")?;
    Ok(Arc::new(processor))
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing --{name}"))
}

fn plan(args: &ArgMatches) -> Result<()> {
    let settings = settings_from(args)?;
    let processor = processor_from(args, &settings)?;

    let outcome = processor.process(
        required(args, "body")?,
        TransportKind::Fetch,
        required(args, "url")?,
    )?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn send(args: &ArgMatches) -> Result<()> {
    let settings = settings_from(args)?;
    let processor = processor_from(args, &settings)?;
    let method = processor.config().write_method.clone();
    let fetch = install_fetch(ReqwestTransport::new(&settings.http)?, processor);

    let mut init = RequestInit::new()
        .with_method(method)
        .with_header("content-type", "text/plain;charset=UTF-8");
    for header in args.get_many::<String>("header").into_iter().flatten() {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("header must look like NAME:VALUE, got {header:?}"))?;
        init = init.with_header(name.trim(), value.trim());
    }
    let init = init.with_body(required(args, "body")?);

    let response = fetch
        .fetch(required(args, "url")?.to_string(), Some(init))
        .await
        .context("sending request")?;
    println!("{}", response.status());
    Ok(())
}

fn split(args: &ArgMatches) -> Result<()> {
    let base = parse_tile_address(required(args, "base")?)?;
    let payload: Value =
        serde_json::from_str(required(args, "payload")?).context("payload is not valid JSON")?;
    let payload = PayloadValidator::new()
        .parse(&payload)
        .context("payload has the wrong shape")?;

    let partitioner = args
        .get_one::<NonZeroU32>("tile-size")
        .copied()
        .map_or_else(TilePartitioner::default, TilePartitioner::new);
    let groups = partitioner.partition(&payload, base);
    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}

// Operator prompts block on stdin inside the fetch path
#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("plan", args)) => plan(args),
        Some(("send", args)) => send(args).await,
        Some(("split", args)) => split(args),
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_plan_arguments() {
        let matches = cli()
            .try_get_matches_from([
                "tilesplit",
                "plan",
                "--url",
                "https://backend.wplace.live/s0/pixel/5/10",
                "--body",
                "{}",
                "--tile-size",
                "256",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();

        assert_eq!(name, "plan");
        let settings = settings_from(args).unwrap();
        assert_eq!(settings.intercept.tile_size.get(), 256);
    }

    #[test]
    fn test_zero_tile_size_is_refused() {
        let result = cli().try_get_matches_from([
            "tilesplit",
            "split",
            "--base",
            "0/0",
            "--payload",
            "{}",
            "--tile-size",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_split_requires_base() {
        let result = cli().try_get_matches_from(["tilesplit", "split", "--payload", "{}"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_split_runs() {
        let matches = cli()
            .try_get_matches_from([
                "tilesplit",
                "split",
                "--base",
                "5/10",
                "--payload",
                r#"{"coords": [10, 20, 1100, 300], "colors": [1, 2]}"#,
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert!(split(args).is_ok());
    }
}
