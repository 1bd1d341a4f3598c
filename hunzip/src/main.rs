use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use archive::gzip::{self, Member, Options};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Decompress the first member of a gzip file.
#[derive(Debug, Parser)]
#[command(name = "hunzip", version)]
struct Args {
    /// gzip file to read
    file: PathBuf,

    /// Write decoded data here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print member metadata instead of the decoded data
    #[arg(long)]
    info: bool,

    /// Skip header CRC and trailer checks
    #[arg(long)]
    no_verify: bool,

    /// Log block and member details to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> Options {
        Options::new().verify(!self.no_verify)
    }
}

fn decode(path: &Path, options: Options) -> anyhow::Result<(Member, Vec<u8>)> {
    let file = File::open(path).context(format!("opening {}", path.display()))?;
    gzip::decompress(BufReader::new(file), options)
        .context(format!("decoding {}", path.display()))
}

fn info(member: &Member, data: &[u8]) -> String {
    format!("{member}Decoded size: {} bytes\n", data.len())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();

    let (member, data) = decode(&args.file, args.options())?;
    debug!("decoded {} bytes from {}", data.len(), args.file.display());

    let out = if args.info {
        info(&member, &data).into_bytes()
    } else {
        data
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &out).context(format!("writing {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&out).context("writing to stdout")?;
            stdout.flush()?;
        }
    }

    Ok(())
}
