use std::io::{BufWriter, Write};

use rawdump_scan::DataSet;

use crate::cmd::DumpArgs;
use crate::exit::{io_error, scan_error, CliResult, SUCCESS};
use crate::output::{DumpPrinter, OutputFormat};

pub fn run(args: DumpArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.scan_config()?;
    let data_set =
        DataSet::open(&args.input.input).map_err(|err| scan_error("open failed", err))?;

    let stdout = std::io::stdout();
    let mut printer = DumpPrinter::new(BufWriter::new(stdout.lock()), format);
    let summary = data_set
        .into_scanner(config)
        .run(&mut printer)
        .map_err(|err| scan_error("dump failed", err))?;

    printer
        .into_inner()
        .flush()
        .map_err(|err| io_error("write failed", err))?;

    tracing::info!(
        windows = summary.windows,
        frames = summary.totals.total_frames,
        lost = summary.totals.lost_frames,
        events = summary.totals.total_events,
        "dump complete"
    );
    Ok(SUCCESS)
}
