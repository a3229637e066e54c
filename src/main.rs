use anyhow::Result;
use clap::Parser;
use sqlite_inspect::{Cli, Db};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()?;

    let mut db = Db::open(&cli.db_path)?;
    for line in cli.command.execute(&mut db)? {
        println!("{line}");
    }

    Ok(())
}
