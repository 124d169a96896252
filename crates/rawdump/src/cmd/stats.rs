use std::io::{BufWriter, Write};

use rawdump_scan::DataSet;

use crate::cmd::StatsArgs;
use crate::exit::{io_error, scan_error, CliResult, SUCCESS};
use crate::output::{OutputFormat, StatsPrinter};

pub fn run(args: StatsArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.scan_config()?;
    let data_set =
        DataSet::open(&args.input.input).map_err(|err| scan_error("open failed", err))?;

    let stdout = std::io::stdout();
    let mut printer = StatsPrinter::new(BufWriter::new(stdout.lock()), format);
    let summary = data_set
        .into_scanner(config)
        .run(&mut printer)
        .map_err(|err| scan_error("stats failed", err))?;

    printer
        .finish(&summary)
        .and_then(|mut out| out.flush())
        .map_err(|err| io_error("write failed", err))?;

    tracing::debug!(windows = summary.windows, "stats complete");
    Ok(SUCCESS)
}
