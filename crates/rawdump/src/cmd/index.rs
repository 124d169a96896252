use std::fs::File;
use std::io::BufReader;

use rawdump_index::{IndexEntry, IndexReader};
use rawdump_scan::{index_path, ScanError};

use crate::cmd::IndexArgs;
use crate::exit::{index_error, io_error, scan_error, CliResult, SUCCESS};
use crate::output::{write_index, OutputFormat};

pub fn run(args: IndexArgs, format: OutputFormat) -> CliResult<i32> {
    let path = index_path(&args.input.input);
    let file = File::open(&path).map_err(|source| {
        scan_error(
            "open failed",
            ScanError::SourceUnavailable {
                path: path.clone(),
                source,
            },
        )
    })?;

    let reader = IndexReader::with_policy(BufReader::new(file), args.input.index_policy());
    let entries = reader
        .collect::<Result<Vec<IndexEntry>, _>>()
        .map_err(|err| index_error("index failed", err))?;

    let mut stdout = std::io::stdout().lock();
    write_index(&mut stdout, &entries, format).map_err(|err| io_error("write failed", err))?;

    tracing::debug!(?path, windows = entries.len(), "index listed");
    Ok(SUCCESS)
}
