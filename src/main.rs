use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
mod cache;
mod x01;
use self::args::Args;
use self::x01::cli_main;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let format = args.format()?;
    let cache = args.cache_config();
    cli_main(format, args.players, cache, !args.plain)
}
