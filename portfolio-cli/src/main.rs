mod app;
mod commands;
mod config;
mod dispatch;
mod history;
mod input;
mod logging;
mod render;
mod session;
mod snake;
mod ticker;
mod view;

use anyhow::Result;
use clap::Parser;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() -> Result<()> {
    let args = config::Args::parse();
    logging::init(args.log_file.as_deref())?;

    let path = match &args.config {
        Some(p) => p.clone(),
        None => config::default_settings_path()?,
    };
    let settings = config::load_settings(&path).apply_args(&args);

    if args.write_config {
        config::save_settings_atomic(&path, &settings)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let fallback_seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0xC0FFEE);
    let opts = settings.session_options(fallback_seed);
    app::run(&settings, opts)
}
