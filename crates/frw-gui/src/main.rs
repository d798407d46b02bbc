use eframe::{egui, egui::ViewportBuilder};
use egui_plot::{Line, Plot};
use frw_lib::descriptors::{descriptors, Descriptors};
use frw_lib::io::csv as csv_io;
use frw_lib::plot::{overlay_figure, Figure, Series, Style};
use frw_lib::ranges::DescriptorRanges;
use frw_lib::signal::FlowWaveform;
use frw_lib::transform::{transform, DescriptorTargets};
use rfd::FileDialog;
use std::path::Path;

fn main() -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default().with_inner_size([960.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "FRW Dashboard",
        native_options,
        Box::new(|_cc| Ok(Box::<FrwApp>::default())),
    )
}

struct FrwApp {
    waveform: Option<FlowWaveform>,
    input_descriptors: Option<Descriptors>,
    csv_path: Option<String>,
    ranges_path: Option<String>,
    ranges: DescriptorRanges,
    hr: u32,
    pi: f64,
    qta: f64,
    status: String,
}

impl Default for FrwApp {
    fn default() -> Self {
        let ranges = DescriptorRanges::default();
        let baseline = ranges.baseline_targets();
        Self {
            waveform: None,
            input_descriptors: None,
            csv_path: None,
            ranges_path: None,
            ranges,
            hr: baseline.hr.round() as u32,
            pi: baseline.pi,
            qta: baseline.qta,
            status: "No waveform loaded".into(),
        }
    }
}

impl FrwApp {
    fn selected_targets(&self) -> DescriptorTargets {
        // The table bounds the widgets already; clamp again so a tighter table
        // loaded after the sliders were moved cannot leave a stale selection.
        self.ranges.clamp(DescriptorTargets {
            hr: self.hr as f64,
            pi: self.pi,
            qta: self.qta,
        })
    }

    fn reset_to_baseline(&mut self) {
        let baseline = self.ranges.baseline_targets();
        self.hr = baseline.hr.round() as u32;
        self.pi = baseline.pi;
        self.qta = baseline.qta;
    }

    fn load_csv(&mut self, path: &Path) -> Result<(), String> {
        let samples = csv_io::read_flowrate_csv(path, "flowrate").map_err(|e| e.to_string())?;
        let waveform = FlowWaveform::new(samples);
        let d = descriptors(&waveform).map_err(|e| e.to_string())?;
        self.status = format!("Loaded {} samples from {}", waveform.len(), path.display());
        self.csv_path = Some(path.display().to_string());
        self.input_descriptors = Some(d);
        self.waveform = Some(waveform);
        Ok(())
    }

    fn load_ranges(&mut self, path: &Path) -> Result<(), String> {
        self.ranges = DescriptorRanges::load(path).map_err(|e| e.to_string())?;
        self.ranges_path = Some(path.display().to_string());
        self.reset_to_baseline();
        self.status = format!("Loaded ranges from {}", path.display());
        Ok(())
    }

    /// Fresh transform of the loaded cycle at the current selection, overlaid
    /// on the baseline-row transform.
    fn overlay(&self) -> Option<Result<Figure, String>> {
        let waveform = self.waveform.as_ref()?;
        let result = transform(waveform, self.ranges.baseline_targets())
            .and_then(|baseline| {
                transform(waveform, self.selected_targets())
                    .map(|rescaled| overlay_figure(&baseline, &rescaled))
            })
            .map_err(|e| e.to_string());
        Some(result)
    }

    fn show_controls(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Controls");
            if ui.button("Load flowrate CSV").clicked() {
                if let Some(path) = FileDialog::new()
                    .add_filter("CSV", &["csv", "txt"])
                    .pick_file()
                {
                    if let Err(err) = self.load_csv(&path) {
                        self.status = err;
                    }
                }
            }
            if ui.button("Load ranges TOML").clicked() {
                if let Some(path) = FileDialog::new()
                    .add_filter("TOML", &["toml"])
                    .pick_file()
                {
                    if let Err(err) = self.load_ranges(&path) {
                        self.status = err;
                    }
                }
            }

            ui.separator();
            ui.heading("Targets");
            ui.add(
                egui::Slider::new(
                    &mut self.hr,
                    self.ranges.lower.hr.round() as u32..=self.ranges.upper.hr.round() as u32,
                )
                .text("Heart rate (bpm)"),
            );
            ui.add(
                egui::Slider::new(&mut self.pi, self.ranges.lower.pi..=self.ranges.upper.pi)
                    .text("Pulsatility index"),
            );
            ui.add(
                egui::Slider::new(&mut self.qta, self.ranges.lower.qta..=self.ranges.upper.qta)
                    .text("Mean flow (ml/s)"),
            );
            if ui.button("Reset to baseline").clicked() {
                self.reset_to_baseline();
            }

            ui.separator();
            if let Some(path) = &self.csv_path {
                ui.horizontal(|ui| {
                    ui.label("CSV: ");
                    ui.monospace(path);
                });
            }
            if let Some(path) = &self.ranges_path {
                ui.horizontal(|ui| {
                    ui.label("Ranges: ");
                    ui.monospace(path);
                });
            }

            ui.separator();
            ui.label(format!("Status: {}", self.status));
            if let Some(d) = &self.input_descriptors {
                ui.label(format!("Input QTA: {:.3} ml/s", d.qta));
                ui.label(format!("Input PI: {:.3}", d.pi));
            }
        });
    }
}

impl eframe::App for FrwApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.heading("FRW — flow-rate waveform rescaling");
                ui.label("Rescale one cycle onto target HR / PI / mean-flow descriptors.");
            });
        });

        self.show_controls(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.overlay() {
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label("Load a flowrate CSV to see the waveform.");
                });
            }
            Some(Err(err)) => {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(egui::Color32::LIGHT_RED, format!("Transform failed: {err}"));
                });
            }
            Some(Ok(fig)) => {
                Plot::new("frw_plot").height(420.0).show(ui, |plot_ui| {
                    plot_plot_figure(plot_ui, &fig);
                });
                let targets = self.selected_targets();
                ui.separator();
                ui.horizontal(|ui| {
                    ui.label(format!("HR: {:.0} bpm", targets.hr));
                    ui.label(format!("PI: {:.2}", targets.pi));
                    ui.label(format!("QTA: {:.2} ml/s", targets.qta));
                    ui.label(format!("Cycle: {:.3} s", 60.0 / targets.hr));
                });
            }
        });

        egui::TopBottomPanel::bottom("bottom").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Gray: baseline transform. Red: current selection.");
            });
        });
    }
}

fn plot_plot_figure(plot_ui: &mut egui_plot::PlotUi, figure: &Figure) {
    for series in &figure.series {
        match series {
            Series::Line(line) => {
                plot_ui.line(
                    Line::new(line.points.clone())
                        .stroke(stroke_from_style(&line.style))
                        .name(line.name.clone()),
                );
            }
        }
    }
}

fn stroke_from_style(style: &Style) -> egui::Stroke {
    egui::Stroke::new(style.width, color_from_u32(style.color.0))
}

fn color_from_u32(color: u32) -> egui::Color32 {
    let r = ((color >> 16) & 0xFF) as u8;
    let g = ((color >> 8) & 0xFF) as u8;
    let b = (color & 0xFF) as u8;
    egui::Color32::from_rgb(r, g, b)
}
