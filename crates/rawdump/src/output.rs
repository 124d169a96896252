use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rawdump_frame::{RawEvent, RawFrame};
use rawdump_index::IndexEntry;
use rawdump_scan::{ScanSummary, ScanVisitor, WindowStats};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct AddressOutput {
    port: u8,
    slave: u8,
    chip: u8,
    channel: u8,
}

#[derive(Serialize)]
struct EventOutput {
    channel_id: u32,
    address: AddressOutput,
    tac_id: u32,
    t_coarse: u32,
    t_fine: u32,
    e_coarse: u32,
    e_fine: u32,
}

impl From<&RawEvent> for EventOutput {
    fn from(event: &RawEvent) -> Self {
        let addr = event.address();
        Self {
            channel_id: event.channel_id(),
            address: AddressOutput {
                port: addr.port,
                slave: addr.slave,
                chip: addr.chip,
                channel: addr.channel,
            },
            tac_id: event.tac_id(),
            t_coarse: event.t_coarse(),
            t_fine: event.t_fine(),
            e_coarse: event.e_coarse(),
            e_fine: event.e_fine(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record<'a> {
    Frame {
        window: usize,
        frame_id: u64,
        frame_size: u32,
        n_events: u32,
        lost: bool,
        events: Vec<EventOutput>,
    },
    Window {
        #[serde(flatten)]
        entry: &'a IndexEntry,
        #[serde(flatten)]
        stats: &'a WindowStats,
    },
    Summary {
        #[serde(flatten)]
        summary: &'a ScanSummary,
    },
}

fn write_json<W: Write>(out: &mut W, record: &Record<'_>) -> io::Result<()> {
    serde_json::to_writer(&mut *out, record).map_err(io::Error::from)?;
    out.write_all(b"\n")
}

/// Write a frame in the classic dump layout: two header lines, then one line per event.
pub fn write_frame_text<W: Write>(out: &mut W, frame: &RawFrame) -> io::Result<()> {
    let header = frame.header();
    let [word0, word1] = header.words();
    writeln!(
        out,
        "{:04} {:016x} Size: {:<4} FrameID: {:<20}",
        0,
        word0,
        header.frame_size_words(),
        header.frame_id()
    )?;
    writeln!(
        out,
        "{:04} {:016x} nEvents: {:>20} {:>4}",
        1,
        word1,
        header.n_events(),
        if header.frame_lost() { "LOST" } else { "" }
    )?;

    for (i, event) in frame.events().iter().enumerate() {
        writeln!(
            out,
            "{:04} {:016x} ChannelID: ({}) TacID: {} TCoarse: {:>4} TFine: {:>4} ECoarse: {:>4} EFine: {:>4}",
            i + 2,
            event.word(),
            event.address(),
            event.tac_id(),
            event.t_coarse(),
            event.t_fine(),
            event.e_coarse(),
            event.e_fine()
        )?;
    }
    Ok(())
}

/// Write the `STAT <frames> <lost> <events>` line closing a window.
pub fn write_stat_line<W: Write>(out: &mut W, stats: &WindowStats) -> io::Result<()> {
    writeln!(
        out,
        "STAT {} {} {}",
        stats.total_frames, stats.lost_frames, stats.total_events
    )
}

/// Prints frames and window statistics as a scan produces them.
pub struct DumpPrinter<W> {
    out: W,
    format: OutputFormat,
    rows: Vec<[String; 4]>,
}

impl<W: Write> DumpPrinter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            rows: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ScanVisitor for DumpPrinter<W> {
    fn frame(&mut self, entry: &IndexEntry, frame: &RawFrame) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => write_frame_text(&mut self.out, frame),
            OutputFormat::Json => write_json(
                &mut self.out,
                &Record::Frame {
                    window: entry.line,
                    frame_id: frame.frame_id(),
                    frame_size: frame.header().frame_size_words(),
                    n_events: frame.n_events(),
                    lost: frame.frame_lost(),
                    events: frame.events().iter().map(EventOutput::from).collect(),
                },
            ),
            OutputFormat::Table => {
                self.rows.push([
                    frame.frame_id().to_string(),
                    frame.header().frame_size_words().to_string(),
                    frame.n_events().to_string(),
                    if frame.frame_lost() { "LOST" } else { "" }.to_string(),
                ]);
                Ok(())
            }
        }
    }

    fn window_finished(&mut self, entry: &IndexEntry, stats: &WindowStats) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => write_stat_line(&mut self.out, stats)?,
            OutputFormat::Json => write_json(&mut self.out, &Record::Window { entry, stats })?,
            OutputFormat::Table => {
                writeln!(
                    self.out,
                    "Window {} [{}, {}) step1={} step2={}",
                    entry.line,
                    entry.window.start_offset,
                    entry.window.end_offset,
                    entry.window.step1,
                    entry.window.step2
                )?;
                // Empty in stats-only mode.
                if !self.rows.is_empty() {
                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .set_content_arrangement(ContentArrangement::Dynamic)
                        .set_header(vec!["FRAME ID", "SIZE", "EVENTS", "LOST"]);
                    for row in self.rows.drain(..) {
                        table.add_row(row.to_vec());
                    }
                    writeln!(self.out, "{table}")?;
                }
                write_stat_line(&mut self.out, stats)?;
            }
        }
        self.out.flush()
    }
}

/// Collects window statistics for the `stats` command.
pub struct StatsPrinter<W> {
    out: W,
    format: OutputFormat,
    table: Option<Table>,
}

impl<W: Write> StatsPrinter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        let table = (format == OutputFormat::Table).then(|| {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "LINE", "START", "END", "STEP1", "STEP2", "FRAMES", "LOST", "EVENTS",
                ]);
            table
        });
        Self { out, format, table }
    }

    /// Print the run totals, and the table if one was collected.
    pub fn finish(mut self, summary: &ScanSummary) -> io::Result<W> {
        match self.format {
            OutputFormat::Json => write_json(&mut self.out, &Record::Summary { summary })?,
            OutputFormat::Pretty => {}
            OutputFormat::Table => {
                if let Some(table) = self.table.take() {
                    writeln!(self.out, "{table}")?;
                }
                writeln!(
                    self.out,
                    "windows: {}  frames: {}  lost: {} ({})  events: {}",
                    summary.windows,
                    summary.totals.total_frames,
                    summary.totals.lost_frames,
                    loss_percent(&summary.totals),
                    summary.totals.total_events
                )?;
            }
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> ScanVisitor for StatsPrinter<W> {
    fn window_finished(&mut self, entry: &IndexEntry, stats: &WindowStats) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&mut self.out, &Record::Window { entry, stats }),
            OutputFormat::Pretty => write_stat_line(&mut self.out, stats),
            OutputFormat::Table => {
                if let Some(table) = self.table.as_mut() {
                    table.add_row(vec![
                        entry.line.to_string(),
                        entry.window.start_offset.to_string(),
                        entry.window.end_offset.to_string(),
                        entry.window.step1.to_string(),
                        entry.window.step2.to_string(),
                        stats.total_frames.to_string(),
                        stats.lost_frames.to_string(),
                        stats.total_events.to_string(),
                    ]);
                }
                Ok(())
            }
        }
    }
}

/// Print parsed index records for the `index` command.
pub fn write_index<W: Write>(
    out: &mut W,
    entries: &[IndexEntry],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            for entry in entries {
                serde_json::to_writer(&mut *out, entry).map_err(io::Error::from)?;
                out.write_all(b"\n")?;
            }
        }
        OutputFormat::Pretty => {
            for entry in entries {
                writeln!(
                    out,
                    "{} {} {} {} {} {}",
                    entry.window.start_offset,
                    entry.window.end_offset,
                    entry.counts[0],
                    entry.counts[1],
                    entry.window.step1,
                    entry.window.step2
                )?;
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LINE", "START", "END", "BYTES", "STEP1", "STEP2"]);
            for entry in entries {
                table.add_row(vec![
                    entry.line.to_string(),
                    entry.window.start_offset.to_string(),
                    entry.window.end_offset.to_string(),
                    entry.window.len().to_string(),
                    entry.window.step1.to_string(),
                    entry.window.step2.to_string(),
                ]);
            }
            writeln!(out, "{table}")?;
        }
    }
    out.flush()
}

fn loss_percent(stats: &WindowStats) -> String {
    if stats.total_frames == 0 {
        return "-".to_string();
    }
    let pct = stats.lost_frames as f64 * 100.0 / stats.total_frames as f64;
    format!("{pct:.2}%")
}
