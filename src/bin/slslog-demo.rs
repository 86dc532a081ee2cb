use std::path::PathBuf;

use clap::Parser;
use slslog::{Logger, LoggerConfig, Message};

#[derive(Parser)]
#[command(name = "slslog-demo")]
#[command(about = "Ship two sample entries to Aliyun SLS", long_about = None)]
struct Cli {
    /// INI file with [sls], [notifier] and [pipeline] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print entries instead of shipping them
    #[arg(short, long)]
    debug: bool,

    /// Text of the plain entry
    #[arg(short, long, default_value = "slslog demo started")]
    text: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => LoggerConfig::from_ini_file(path)?,
        None => LoggerConfig {
            debug: true,
            ..LoggerConfig::default()
        },
    };
    config.debug |= cli.debug;

    let logger = Logger::new(config)?;
    logger.info(cli.text.as_str());
    logger.error(
        Message::new()
            .with_category("product")
            .with_pair("title", "我是标题")
            .with_pair("content", "我是正文"),
    );
    logger.close();
    Ok(())
}
