use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use frw_lib::{
    descriptors::descriptors,
    io::{csv as csv_io, text as text_io},
    plot::{overlay_figure, Figure, Series},
    ranges::DescriptorRanges,
    signal::{FlowWaveform, TimedWaveform},
    transform::{transform, DescriptorTargets, NOMINAL_INPUT_HR_BPM},
};
use plotters::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "frw",
    version,
    about = "FRW: flow-rate waveform rescaling tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute QTA and PI of a waveform read from a flowrate CSV, a
    /// newline-delimited file, or stdin
    Descriptors {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value = "flowrate")]
        column: String,
    },
    /// Rescale a waveform onto target HR/PI/QTA descriptors
    Transform {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value = "flowrate")]
        column: String,
        #[arg(long)]
        hr: f64,
        #[arg(long)]
        pi: f64,
        #[arg(long)]
        qta: f64,
        /// Write a time,flowrate CSV here instead of JSON on stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render the transformed cycle over the baseline cycle as a PNG
    Plot {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value = "flowrate")]
        column: String,
        #[arg(long)]
        hr: f64,
        #[arg(long)]
        pi: f64,
        #[arg(long)]
        qta: f64,
        /// Descriptor range table (TOML); defaults to the built-in table
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the physiological descriptor range table as JSON
    Ranges {
        /// Descriptor range table (TOML); defaults to the built-in table
        #[arg(long)]
        config: Option<PathBuf>,
        /// Vessel radius (metres) to derive the QTA row from
        #[arg(long)]
        radius: Option<f64>,
        /// Fractional QTA band around the baseline
        #[arg(long, default_value_t = 0.3)]
        band: f64,
    },
    /// Generate a synthetic one-cycle waveform as a flowrate CSV
    Simulate {
        #[arg(long, default_value_t = 99)]
        samples: usize,
        /// Target PI of the generated cycle; defaults to the table baseline
        #[arg(long)]
        pi: Option<f64>,
        /// Target QTA of the generated cycle; defaults to the table baseline
        #[arg(long)]
        qta: Option<f64>,
        /// Relative jitter applied to the pulse shape before rescaling
        #[arg(long, default_value_t = 0.02)]
        noise: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Descriptors { input, column } => cmd_descriptors(input.as_deref(), &column)?,
        Commands::Transform {
            input,
            column,
            hr,
            pi,
            qta,
            out,
        } => cmd_transform(
            input.as_deref(),
            &column,
            DescriptorTargets { hr, pi, qta },
            out.as_deref(),
        )?,
        Commands::Plot {
            input,
            column,
            hr,
            pi,
            qta,
            config,
            out,
        } => cmd_plot(
            input.as_deref(),
            &column,
            DescriptorTargets { hr, pi, qta },
            config.as_deref(),
            &out,
        )?,
        Commands::Ranges {
            config,
            radius,
            band,
        } => cmd_ranges(config.as_deref(), radius, band)?,
        Commands::Simulate {
            samples,
            pi,
            qta,
            noise,
            seed,
            out,
        } => cmd_simulate(samples, pi, qta, noise, seed, out.as_deref())?,
    }
    Ok(())
}

/// CSV when the path looks like one, newline-delimited floats otherwise;
/// stdin takes newline-delimited floats.
fn read_samples(input: Option<&Path>, column: &str) -> Result<Vec<f64>> {
    match input {
        Some(path) => {
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if is_csv {
                csv_io::read_flowrate_csv(path, column)
            } else {
                text_io::read_f64_series(path)
            }
        }
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_f64_series(&buf)
        }
    }
}

fn load_waveform(input: Option<&Path>, column: &str) -> Result<FlowWaveform> {
    let samples = read_samples(input, column)?;
    log::debug!("loaded {} flow samples", samples.len());
    Ok(FlowWaveform::new(samples))
}

fn load_ranges(config: Option<&Path>) -> Result<DescriptorRanges> {
    match config {
        Some(path) => DescriptorRanges::load(path),
        None => Ok(DescriptorRanges::default()),
    }
}

#[derive(Serialize)]
struct DescriptorReport {
    /// Nominal cycle rate of the input, beats/min.
    hr: f64,
    qta: f64,
    pi: f64,
}

fn cmd_descriptors(input: Option<&Path>, column: &str) -> Result<()> {
    let waveform = load_waveform(input, column)?;
    let d = descriptors(&waveform)?;
    let report = DescriptorReport {
        hr: NOMINAL_INPUT_HR_BPM,
        qta: d.qta,
        pi: d.pi,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn cmd_transform(
    input: Option<&Path>,
    column: &str,
    targets: DescriptorTargets,
    out: Option<&Path>,
) -> Result<()> {
    let waveform = load_waveform(input, column)?;
    let rescaled = transform(&waveform, targets)?;
    log::info!(
        "rescaled {} samples onto hr={} pi={} qta={}",
        rescaled.len(),
        targets.hr,
        targets.pi,
        targets.qta
    );
    match out {
        Some(path) => write_waveform_csv(path, &rescaled)?,
        None => println!("{}", serde_json::to_string(&rescaled)?),
    }
    Ok(())
}

fn write_waveform_csv(path: &Path, waveform: &TimedWaveform) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["time", "flowrate"])?;
    for (t, v) in waveform.times.iter().zip(waveform.values.iter()) {
        writer.write_record([t.to_string(), v.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn cmd_plot(
    input: Option<&Path>,
    column: &str,
    targets: DescriptorTargets,
    config: Option<&Path>,
    out: &Path,
) -> Result<()> {
    let waveform = load_waveform(input, column)?;
    let ranges = load_ranges(config)?;
    let baseline = transform(&waveform, ranges.baseline_targets())?;
    let rescaled = transform(&waveform, targets)?;
    let fig = overlay_figure(&baseline, &rescaled);
    draw_plotters_figure(out, &fig)?;
    log::info!("wrote {}", out.display());
    Ok(())
}

fn cmd_ranges(config: Option<&Path>, radius: Option<f64>, band: f64) -> Result<()> {
    let ranges = match (config, radius) {
        (Some(path), _) => DescriptorRanges::load(path)?,
        (None, Some(r)) => DescriptorRanges::from_radius(r, band),
        (None, None) => DescriptorRanges::default(),
    };
    println!("{}", serde_json::to_string(&ranges)?);
    Ok(())
}

/// Systolic bump, dicrotic wave and diastolic floor of the reference pulse.
fn pulse_shape(phase: f64) -> f64 {
    let gaussian = |center: f64, sigma: f64| {
        let d = phase - center;
        (-d * d / (2.0 * sigma * sigma)).exp()
    };
    1.0 + 3.6 * gaussian(0.18, 0.055) + 0.7 * gaussian(0.42, 0.045) + 0.35 * gaussian(0.18, 0.14)
}

fn cmd_simulate(
    samples: usize,
    pi: Option<f64>,
    qta: Option<f64>,
    noise: f64,
    seed: Option<u64>,
    out: Option<&Path>,
) -> Result<()> {
    let baseline = DescriptorRanges::default().baseline_targets();
    let targets = DescriptorTargets {
        hr: NOMINAL_INPUT_HR_BPM,
        pi: pi.unwrap_or(baseline.pi),
        qta: qta.unwrap_or(baseline.qta),
    };
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let shape: Vec<f64> = (0..samples)
        .map(|i| {
            let phase = i as f64 / samples as f64;
            let jitter = 1.0 + noise * rng.gen_range(-1.0..=1.0);
            pulse_shape(phase) * jitter
        })
        .collect();
    // The affine rescale pins the jittered shape to the requested descriptors.
    let cycle = transform(&FlowWaveform::new(shape), targets)?;

    match out {
        Some(path) => {
            let mut writer = csv::WriterBuilder::new()
                .from_path(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_flowrate_records(&mut writer, &cycle)?;
        }
        None => {
            let mut writer = csv::WriterBuilder::new().from_writer(io::stdout());
            write_flowrate_records(&mut writer, &cycle)?;
        }
    }
    Ok(())
}

fn write_flowrate_records<W: io::Write>(
    writer: &mut csv::Writer<W>,
    cycle: &TimedWaveform,
) -> Result<()> {
    writer.write_record(["flowrate"])?;
    for v in &cycle.values {
        writer.write_record([v.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn draw_plotters_figure(path: &Path, fig: &Figure) -> Result<()> {
    let backend = BitMapBackend::new(path, (800, 480));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let points = fig.series.iter().flat_map(|series| match series {
        Series::Line(line) => line.points.iter(),
    });
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for p in points {
        x_min = x_min.min(p[0]);
        x_max = x_max.max(p[0]);
        y_min = y_min.min(p[1]);
        y_max = y_max.max(p[1]);
    }
    if !(x_min.is_finite() && y_min.is_finite()) {
        anyhow::bail!("figure has no points to draw");
    }
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(
            fig.title.clone().unwrap_or_else(|| "Plot".into()),
            ("sans-serif", 24),
        )
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc(fig.x.label.clone().unwrap_or_default())
        .y_desc(fig.y.label.clone().unwrap_or_default())
        .draw()?;
    for series in &fig.series {
        match series {
            Series::Line(line) => {
                chart.draw_series(LineSeries::new(
                    line.points.iter().map(|p| (p[0], p[1])),
                    &RGBColor(
                        ((line.style.color.0 >> 16) & 0xFF) as u8,
                        ((line.style.color.0 >> 8) & 0xFF) as u8,
                        (line.style.color.0 & 0xFF) as u8,
                    ),
                ))?;
            }
        }
    }
    root.present()?;
    Ok(())
}
