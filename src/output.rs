//! This module is in charge of outputting the final simulation results to the
//! standard output and various files
//!
//! Histograms are rendered as SVG images, and the whole run is stored as JSON
//! so that it can be read back for further analysis.

use crate::{
    channel::ChannelKind,
    config::Configuration,
    histogram::Histogram,
    numeric::Float,
    resacc::{MissingSpecies, RunAccumulator},
    Result,
};

use eyre::WrapErr;
use log::{info, warn};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
    time::Duration,
};

/// Number of significant digits of axis labels
const SIG_DIGITS: usize = 4;

/// Size of the histogram images, in pixels
const IMAGE_SIZE: (u32, u32) = (600, 400);

/// Everything that is persisted about a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Simulated channel
    pub channel: ChannelKind,

    /// When the run ended (RFC 3339)
    pub timestamp: String,

    /// Wall-clock duration of the simulation (s)
    pub elapsed_secs: f64,

    /// Seed of the random number generators
    pub seed: u64,

    /// Center-of-mass energy (GeV)
    pub e_cm: Float,

    /// Policy for events with missing decay products
    pub missing: MissingSpecies,

    /// Number of simulated events
    pub num_events: usize,

    /// Number of events where both decay products were found
    pub num_complete: usize,

    /// Number of events where a decay product was missing
    pub num_partial: usize,

    /// Number of events which were left out of the histograms
    pub num_skipped: usize,

    /// Final histograms
    pub histograms: Vec<Histogram>,
}
//
impl RunReport {
    /// Gather the results of a run
    pub fn new(
        cfg: &Configuration,
        result: &RunAccumulator,
        elapsed_time: Duration,
    ) -> Result<Self> {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .wrap_err("Failed to format the run timestamp")?;
        Ok(Self {
            channel: cfg.channel.kind,
            timestamp,
            elapsed_secs: elapsed_time.as_secs_f64(),
            seed: cfg.seed,
            e_cm: cfg.channel.e_cm,
            missing: result.policy(),
            num_events: result.num_events(),
            num_complete: result.num_complete(),
            num_partial: result.num_partial(),
            num_skipped: result.num_skipped(),
            histograms: std::iter::once(result.mass_histogram())
                .chain(result.pt_histogram())
                .cloned()
                .collect(),
        })
    }
}

/// Output files of a run, created before the simulation starts so that
/// unwritable destinations are detected before any time is spent simulating
pub struct OutputSink {
    /// Destination of the run report
    data: (PathBuf, File),

    /// Destinations of the histogram images, in histogram order
    images: Vec<(PathBuf, File)>,
}
//
impl OutputSink {
    /// Create the output files of a run
    pub fn create(cfg: &Configuration) -> Result<Self> {
        let dir = &cfg.output_dir;
        fs::create_dir_all(dir)
            .wrap_err_with(|| format!("Failed to create output directory {}", dir.display()))?;
        let create = |file_name: String| -> Result<(PathBuf, File)> {
            let path = dir.join(file_name);
            let file = File::create(&path)
                .wrap_err_with(|| format!("Couldn't open {} for writing", path.display()))?;
            Ok((path, file))
        };
        let channel = &cfg.channel;
        let data = create(format!("{}.json", channel.output_stem))?;
        let mut images = vec![create(format!("{}.svg", channel.output_stem))?];
        if let Some((_, stem)) = &channel.pt_histogram {
            images.push(create(format!("{}.svg", stem))?);
        }
        Ok(Self { data, images })
    }

    /// Output the simulation results to the console and to disk
    pub fn dump_results(
        self,
        cfg: &Configuration,
        result: &RunAccumulator,
        elapsed_time: Duration,
    ) -> Result<RunReport> {
        let report = RunReport::new(cfg, result, elapsed_time)?;
        print_summary(&report);
        if report.num_partial > 0 {
            warn!(
                "{} of {} events lacked a decay product ({} policy)",
                report.num_partial, report.num_events, report.missing
            );
        }

        // Render each histogram to its image
        assert_eq!(report.histograms.len(), self.images.len());
        for (hist, (path, file)) in report.histograms.iter().zip(self.images) {
            let mut writer = BufWriter::new(file);
            let svg = render_svg(hist)
                .wrap_err_with(|| format!("Failed to plot histogram {}", hist.name()))?;
            writer
                .write_all(svg.as_bytes())
                .and_then(|()| writer.flush())
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            info!("Saved {}", path.display());
        }

        // Store the run report
        let (path, file) = self.data;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &report)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.flush())
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        info!("Saved {}", path.display());

        Ok(report)
    }
}

/// Print out the run summary on stdout
fn print_summary(report: &RunReport) {
    println!();
    println!("Events simulated       : {}", report.num_events);
    println!("... fully reconstructed: {}", report.num_complete);
    println!("... partially          : {}", report.num_partial);
    println!("... left out           : {}", report.num_skipped);
    println!("Elapsed time (s)       : {:.3}", report.elapsed_secs);
    for hist in &report.histograms {
        println!();
        println!("Histogram {}", hist.name());
        println!("  entries   : {}", hist.entries());
        println!("  underflow : {}", hist.underflow());
        println!("  overflow  : {}", hist.overflow());
        match hist.mean() {
            Some(mean) => println!("  mean      : {}", format_engineering(mean, SIG_DIGITS + 2)),
            None => println!("  mean      : -"),
        }
    }
    println!();
}

/// Render a histogram as an SVG bar chart
pub fn render_svg(hist: &Histogram) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, IMAGE_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        // Leave some headroom above the highest bin
        let (low, high) = (hist.low() as f64, hist.high() as f64);
        let max_count = hist.bins().iter().copied().max().unwrap_or(0).max(1);
        let mut chart = ChartBuilder::on(&root)
            .caption(hist.name(), ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(low..high, 0.0..(max_count as f64 * 1.1))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(hist.x_title())
            .y_desc(hist.y_title())
            .x_labels(6)
            .x_label_formatter(&|x| format_engineering(*x as Float, SIG_DIGITS))
            .y_label_formatter(&|y| format!("{:.0}", y))
            .draw()?;

        let width = hist.bin_width() as f64;
        chart.draw_series(
            (hist.bins().iter().enumerate())
                .filter(|&(_, &count)| count > 0)
                .map(|(bin, &count)| {
                    let x = low + bin as f64 * width;
                    Rectangle::new([(x, 0.), (x + width, count as f64)], BLUE.filled())
                }),
        )?;
        root.present()?;
    }
    Ok(svg)
}

/// Format a floating-point number using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this method switches
/// between naive and scientific notation for floating-point numbers when the
/// number being printed becomes so small that printing leading zeroes could end
/// up larger than the scientific notation, or so large that we would be forced
/// to print more significant digits than requested.
///
fn format_engineering(x: Float, sig_digits: usize) -> String {
    let mut precision = sig_digits - 1;
    if x == 0. {
        // Zero is special because you can't take its log
        "0".to_owned()
    } else {
        // Otherwise, use log to evaluate order of magnitude
        let log_x = x.abs().log10();
        if log_x >= -3. && log_x <= (sig_digits as Float) {
            // Print using naive notation
            //
            // Since Rust's precision controls number of digits after the
            // decimal point, we must adjust it depending on magnitude in order
            // to operate at a constant number of significant digits.
            precision = (precision as isize - log_x.floor() as isize).max(0) as usize;

            // People don't normally expect trailing zeros or decimal point in
            // naive notation, but be careful with integer numbers...
            let str_with_zeros = format!("{:.1$}", x, precision);
            if str_with_zeros.contains('.') {
                str_with_zeros
                    .trim_end_matches('0')
                    .trim_end_matches('.')
                    .to_owned()
            } else {
                str_with_zeros
            }
        } else {
            // Print using scientific notation
            format!("{:.1$e}", x, precision)
        }
    }
}
