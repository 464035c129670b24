use clap::Parser;
use graph_txlog::channel::PhysicalLogChannel;
use graph_txlog::command::{scan_channel, CommandReader, LogScan};
use graph_txlog::config::LogReaderConfig;
use graph_txlog::error::{TxLogError, TxLogResult};
use graph_txlog::utils::util::{pretty_format_commands, pretty_format_summary};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser, PartialEq)]
#[clap(
    author,
    version,
    about = "Print the commands stored in transaction log files",
    long_about = None
)]
struct Args {
    #[clap(
        required = true,
        help = "Log files or glob patterns, e.g. 'logs/nioneo_logical.log.*'"
    )]
    patterns: Vec<String>,
    #[clap(short, long, help = "Only print the number of commands per type")]
    summary: bool,
    #[clap(short, long, help = "Stop after this many commands per file")]
    limit: Option<usize>,
    #[clap(long, help = "Initial schema rule buffer size in bytes")]
    schema_scratch_capacity: Option<usize>,
    #[clap(long, help = "Read buffer size per log file in bytes")]
    read_buffer_size: Option<usize>,
}

fn expand_patterns(patterns: &[String]) -> TxLogResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let paths = glob::glob(pattern)
            .map_err(|e| TxLogError::Internal(format!("bad pattern {}: {}", pattern, e)))?;
        let before = files.len();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => log::warn!("skipping unreadable path: {}", e),
            }
        }
        if files.len() == before {
            log::warn!("pattern {} matched no files", pattern);
        }
    }
    files.sort_by(|a, b| natord::compare(&a.to_string_lossy(), &b.to_string_lossy()));
    files.dedup();
    Ok(files)
}

fn scan_file(reader: &CommandReader, path: &Path, limit: Option<usize>) -> TxLogResult<LogScan> {
    let mut channel = PhysicalLogChannel::open(path, reader.config())?;
    log::debug!("decoding {}", path.display());
    Ok(scan_channel(reader, &mut channel, limit))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut config = LogReaderConfig::default();
    if let Some(capacity) = args.schema_scratch_capacity {
        config.schema_scratch_capacity = capacity;
    }
    if let Some(size) = args.read_buffer_size {
        config.read_buffer_size = size;
    }
    let reader = CommandReader::new(config);

    let files = match expand_patterns(&args.patterns) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let scans: Vec<(PathBuf, TxLogResult<LogScan>)> = files
        .into_par_iter()
        .map(|path| {
            let scan = scan_file(&reader, &path, args.limit);
            (path, scan)
        })
        .collect();

    let mut corrupted = false;
    for (path, scan) in scans {
        println!("== {}", path.display());
        match scan {
            Ok(scan) => {
                let table = if args.summary {
                    pretty_format_summary(&scan.commands)
                } else {
                    pretty_format_commands(&scan.commands)
                };
                println!("{table}");
                println!("{} commands, {}", scan.commands.len(), scan.end);
                corrupted |= scan.end.is_corrupted();
            }
            Err(e) => {
                println!("failed to read: {}", e);
                corrupted = true;
            }
        }
    }

    if corrupted {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
