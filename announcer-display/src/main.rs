use arena_common::messages::{OutboundMessage, PushMessage};
use clap::Parser;
use crossbeam_channel::{bounded, never, select, tick};
use log::{LevelFilter, error, info, warn};
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc::{self, error::TrySendError};

mod config;
mod controller;
mod network;
mod operator;
mod output;
mod page;
mod templates;

use config::AppConfig;
use controller::Controller;
use operator::OperatorCommand;
use page::Page;
use templates::Templates;

const APP_NAME: &str = "announcer-display";
const PUSH_CHANNEL_LEN: usize = 16;
const OUTBOUND_CHANNEL_LEN: usize = 4;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long)]
    /// Config file to use instead of the platform default location
    config: Option<PathBuf>,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

fn main() {
    let args = Cli::parse();
    init_logging(&args);

    let config = load_config(args.config.as_deref());
    info!("Starting {APP_NAME} with config: {config:?}");

    let templates = match Templates::new(config.template_dir.as_deref()) {
        Ok(templates) => templates,
        Err(e) => {
            error!("Failed to load templates: {e}");
            std::process::exit(1);
        }
    };

    let (push_tx, push_rx) = bounded::<PushMessage>(PUSH_CHANNEL_LEN);
    let (out_tx, out_rx) = mpsc::channel::<OutboundMessage>(OUTBOUND_CHANNEL_LEN);
    let (cmd_tx, cmd_rx) = bounded::<OperatorCommand>(1);

    let net_config = config.clone();
    let net_worker = std::thread::spawn(move || {
        network::networking_thread(push_tx, out_rx, net_config);
    });
    std::thread::spawn(move || operator::stdin_thread(cmd_tx));

    let mut controller = Controller::new(Page::default(), templates);
    let blink = tick(Duration::from_millis(config.blink_interval_ms));
    let no_cmds = never();
    let mut stdin_open = true;

    write_page(&controller, &config);
    loop {
        let cmds = if stdin_open { &cmd_rx } else { &no_cmds };
        select! {
            recv(push_rx) -> msg => match msg {
                Ok(msg) => {
                    let kind = msg.kind();
                    if let Err(e) = controller.handle(msg) {
                        error!("Failed to display {kind} message: {e}");
                    }
                }
                Err(_) => {
                    error!("Networking thread stopped!");
                    break;
                }
            },
            recv(blink) -> _ => controller.toggle_blink(),
            recv(cmds) -> cmd => match cmd {
                Ok(OperatorCommand::PostMatchResult) => {
                    info!("Posting match result to the audience display");
                    match out_tx.try_send(controller.post_match_result()) {
                        Ok(()) => {}
                        Err(TrySendError::Full(msg)) => {
                            warn!("Outbound queue full, dropping {msg:?}")
                        }
                        Err(TrySendError::Closed(msg)) => {
                            error!("Networking thread stopped, could not send {msg:?}")
                        }
                    }
                }
                Ok(OperatorCommand::Quit) => {
                    info!("Quit requested");
                    break;
                }
                Err(_) => stdin_open = false,
            },
        }
        write_page(&controller, &config);
    }

    drop(out_tx);
    if net_worker.is_finished() {
        if let Err(e) = net_worker.join() {
            error!("Networking thread panicked: {e:?}");
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> AppConfig {
    let loaded = match path {
        Some(path) => confy::load_path(path),
        None => confy::load(APP_NAME, None),
    };
    match loaded {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = AppConfig::default();
            let stored = match path {
                Some(path) => confy::store_path(path, &config),
                None => confy::store(APP_NAME, None, &config),
            };
            if let Err(e) = stored {
                error!("Failed to write default config: {e}");
            }
            config
        }
    }
}

fn write_page(controller: &Controller<Page>, config: &AppConfig) {
    let result = controller
        .render_document()
        .and_then(|doc| Ok(output::write_document(&config.output_path, &doc)?));
    if let Err(e) = result {
        error!(
            "Failed to update page at {}: {e}",
            config.output_path.display()
        );
    }
}

fn init_logging(args: &Cli) {
    let app_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_dir = args.log_location.clone().unwrap_or_else(|| {
        directories::BaseDirs::new()
            .expect("Could not find a directory to store logs")
            .data_local_dir()
            .join(format!("{APP_NAME}-logs"))
    });
    let log_path = log_dir.join(format!("{APP_NAME}-log.txt"));
    let archive_pattern = log_dir.join(format!("{APP_NAME}-log-{{}}.txt.gz"));

    #[cfg(debug_assertions)]
    println!("Log path: {}", log_path.display());

    // Debug builds also log to stderr
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    // Old logs are gzipped and numbered, the oldest beyond `num_old_logs` is deleted
    let roller = FixedWindowRoller::builder()
        .build(
            archive_pattern.as_os_str().to_str().unwrap(),
            args.num_old_logs,
        )
        .unwrap();
    let rolling_file = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(
            log_path,
            Box::new(CompoundPolicy::new(
                Box::new(SizeTrigger::new(args.log_max_file_size)),
                Box::new(roller),
            )),
        )
        .unwrap();

    // Dependencies (tungstenite, minijinja, ...) only report errors
    let root = Root::builder().appender("file");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    let log_config =
        LogConfig::builder().appender(Appender::builder().build("file", Box::new(rolling_file)));
    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    // Both of our crates log at the level picked with `-v`
    let log_config = log_config
        .logger(Logger::builder().build("announcer_display", app_level))
        .logger(Logger::builder().build("arena_common", app_level))
        .build(root)
        .unwrap();

    log4rs::init_config(log_config).unwrap();
    log_panics::init();
}
