extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate shlex;

use std::env;
use std::fs::File;
use std::io::{BufReader, IsTerminal, Write};
use std::time::Duration;

use autofill::prelude::*;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail};

//------------------------------------------------------------------------------
fn main() {
    if let Err(err) = color_eyre::install() {
        eprintln!("failed to install the error report handler: {err}");
    }

    match real_main() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            // downstream pipe is closed, exit silently
            if err
                .downcast_ref::<std::io::Error>()
                .is_some_and(|e| e.kind() == std::io::ErrorKind::BrokenPipe)
            {
                std::process::exit(0)
            }
            eprintln!("{err:?}");
            std::process::exit(2)
        }
    }
}

fn parse_args() -> AutofillOptions {
    let mut args = Vec::new();

    args.push(env::args().next().unwrap_or_else(|| String::from("autofill")));
    args.extend(
        env::var("AUTOFILL_DEFAULT_OPTIONS")
            .ok()
            .and_then(|val| shlex::split(&val))
            .unwrap_or_default(),
    );
    args.extend(env::args().skip(1));

    AutofillOptions::parse_from(args)
}

fn init_logger(opts: &AutofillOptions) -> Result<()> {
    let mut builder = env_logger::builder();
    builder.format_timestamp_nanos();
    if let Some(path) = &opts.log_file {
        let file = File::create(path).wrap_err_with(|| format!("failed to create log file {path}"))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn read_provider(opts: &AutofillOptions) -> Result<StaticProvider> {
    let provider = match &opts.items {
        Some(path) => {
            let file = File::open(path).wrap_err_with(|| format!("failed to open {path}"))?;
            StaticProvider::from_reader(BufReader::new(file))?
        }
        None if !std::io::stdin().is_terminal() => StaticProvider::from_reader(std::io::stdin().lock())?,
        None => bail!("no items: pipe them into autofill or pass --items <file>"),
    };
    if provider.is_empty() {
        warn!("no items were read, every search will come back empty");
    }
    Ok(provider.latency(Duration::from_millis(opts.latency_ms)))
}

fn real_main() -> Result<i32> {
    let opts = parse_args().build();
    init_logger(&opts)?;

    let provider = read_provider(&opts)?;
    debug!("serving {} items", provider.len());

    //------------------------------------------------------------------------------
    let output = Autofill::run_with(opts, Arc::new(provider))?;
    if output.is_abort {
        return Ok(130);
    }

    //------------------------------------------------------------------------------
    // output
    let mut stdout = std::io::stdout().lock();
    for item in &output.selected {
        writeln!(stdout, "{}", item.output())?;
    }
    stdout.flush()?;

    Ok(if output.selected.is_empty() { 1 } else { 0 })
}
