//! gelf-ctl: publish a GELF message from the command line.

use anyhow::{bail, Context, Result};
use serde_json::Value;

use gelf_core::{ChunkProfile, GelfMessage, Level, PublisherConfig};
use gelf_publisher::Publisher;

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Args {
    host: Option<String>,
    port: Option<String>,
    chunk_size: Option<String>,
    profile: Option<ChunkProfile>,
    level: Option<Level>,
    facility: Option<String>,
    repeat: usize,
    short_message: String,
    fields: Vec<(String, Value)>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args {
        repeat: 1,
        ..Args::default()
    };
    let mut positional: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--host" => parsed.host = Some(take_value(args, &mut i, flag)?.to_string()),
            "--port" => parsed.port = Some(take_value(args, &mut i, flag)?.to_string()),
            "--chunk-size" => {
                parsed.chunk_size = Some(take_value(args, &mut i, flag)?.to_string());
            }
            "--lan" => parsed.profile = Some(ChunkProfile::Lan),
            "--wan" => parsed.profile = Some(ChunkProfile::Wan),
            "--level" => {
                let v = take_value(args, &mut i, flag)?;
                parsed.level = Some(Level::parse(v).with_context(|| format!("unknown level {v:?}"))?);
            }
            "--facility" => parsed.facility = Some(take_value(args, &mut i, flag)?.to_string()),
            "--repeat" => {
                parsed.repeat = take_value(args, &mut i, flag)?
                    .parse()
                    .context("--repeat must be a number")?;
                if parsed.repeat == 0 {
                    bail!("--repeat must be at least 1");
                }
            }
            _ => positional.push(flag),
        }
        i += 1;
    }

    let Some((message, fields)) = positional.split_first() else {
        bail!("missing message text");
    };
    parsed.short_message = message.to_string();
    for field in fields {
        let (key, raw) = field
            .split_once('=')
            .with_context(|| format!("field {field:?} must be key=value"))?;
        // Numbers and booleans keep their JSON type; anything else is a string.
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw));
        parsed.fields.push((key.to_string(), value));
    }
    Ok(parsed)
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .with_context(|| format!("{flag} requires a value"))
}

/// Config file and GELF_* variables first, then command-line flags.
fn build_config(args: &Args) -> Result<PublisherConfig> {
    let mut config = PublisherConfig::load().context("failed to load gelf config")?;
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if config.host.trim().is_empty() {
        config.host = "localhost".to_string();
    }
    if let Some(profile) = args.profile {
        config = config.with_profile(profile);
    }
    let port = args.port.clone().unwrap_or_else(|| config.port.to_string());
    let chunk_size = args
        .chunk_size
        .clone()
        .unwrap_or_else(|| config.chunk_size.to_string());

    let parsed = PublisherConfig::from_parts(&config.host, &port, &chunk_size)?;
    Ok(PublisherConfig {
        port: parsed.port,
        chunk_size: parsed.chunk_size,
        ..config
    })
}

fn build_message(args: &Args) -> Result<GelfMessage> {
    let source_host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    let mut msg = GelfMessage::new(source_host, args.short_message.clone()).with_current_timestamp();
    if let Some(level) = args.level {
        msg = msg.with_level(level);
    }
    if let Some(facility) = &args.facility {
        msg = msg.with_facility(facility.clone());
    }
    for (key, value) in &args.fields {
        msg.add_field(key, value.clone())?;
    }
    Ok(msg)
}

fn print_usage() {
    println!("Usage: gelf-ctl [options] <message> [key=value ...]");
    println!();
    println!("Options:");
    println!("  --host <host>         Collector host (default: $GELF_HOST or localhost)");
    println!("  --port <port>         Collector UDP port (default: 12201)");
    println!("  --chunk-size <bytes>  Payload bytes per chunk");
    println!("  --wan | --lan         Chunk size preset (1420 / 8154)");
    println!("  --level <level>       Syslog level name or number");
    println!("  --facility <name>     Facility field");
    println!("  --repeat <n>          Publish the message n times");
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || matches!(args[0].as_str(), "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let args = parse_args(&args)?;
    let config = build_config(&args)?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        chunk_size = config.chunk_size,
        "gelf-ctl starting"
    );

    let mut publisher = Publisher::new(config)?;
    let mut msg = build_message(&args)?;
    for n in 0..args.repeat {
        publisher
            .publish(&mut msg)
            .with_context(|| format!("publish {} of {} failed", n + 1, args.repeat))?;
    }

    let config = publisher.config();
    println!(
        "Published {} message(s) to {}:{}",
        args.repeat, config.host, config.port
    );
    Ok(())
}
