//! kvwire CLI Client
//!
//! Sends one or more command lines to a RESP2 server and prints each reply.

use std::process::ExitCode;

use clap::Parser;
use kvwire::{Client, ClientConfig, KeepAlive, Reply};
use tracing_subscriber::{fmt, EnvFilter};

/// kvwire CLI
#[derive(Parser, Debug)]
#[command(name = "kvwire-cli")]
#[command(about = "Send commands to a RESP2 key-value server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "6379")]
    port: u16,

    /// ACL user for AUTH
    #[arg(short, long, requires = "password")]
    user: Option<String>,

    /// Password for AUTH
    #[arg(short = 'a', long)]
    password: Option<String>,

    /// Enable TCP keep-alive with this probe interval in seconds (0 = platform default)
    #[arg(short, long)]
    keepalive: Option<u32>,

    /// TCP user timeout in milliseconds
    #[arg(long)]
    tcp_user_timeout: Option<u32>,

    /// Connect timeout in milliseconds
    #[arg(long)]
    connect_timeout: Option<u64>,

    /// Print replies as JSON
    #[arg(long)]
    json: bool,

    /// Command lines, e.g. "SET a 1" "GET a"
    #[arg(required = true)]
    commands: Vec<String>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,kvwire=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args);

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        return ExitCode::FAILURE;
    }

    tracing::debug!("kvwire CLI v{}", kvwire::VERSION);

    let mut client = Client::with_config(&config);
    if !client.is_connected(false) {
        return ExitCode::FAILURE;
    }

    let mut all_ok = true;
    for command in &args.commands {
        let reply = client.send_command(command);
        all_ok &= reply.is_ok();
        print_reply(command, &reply, args.json);
    }

    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn build_config(args: &Args) -> ClientConfig {
    let mut builder = ClientConfig::builder().host(&args.host).port(args.port);

    builder = match (&args.user, &args.password) {
        (Some(user), Some(password)) => builder.credentials(user, password),
        (None, Some(password)) => builder.password(password),
        _ => builder,
    };
    if let Some(interval) = args.keepalive {
        builder = builder.keep_alive(KeepAlive::from_interval(interval));
    }
    if let Some(ms) = args.tcp_user_timeout {
        builder = builder.tcp_user_timeout_ms(ms);
    }
    if let Some(ms) = args.connect_timeout {
        builder = builder.connect_timeout_ms(ms);
    }

    builder.build()
}

fn print_reply(command: &str, reply: &Reply, json: bool) {
    if json {
        match serde_json::to_string(reply) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to encode reply as JSON: {}", e),
        }
        return;
    }

    println!("> {}", command);
    print!("{}", reply.render());
}
