use crate::signal::TimedWaveform;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub dash: Option<[f32; 2]>,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Color(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}

const BASELINE_COLOR: u32 = 0x8899AA;
const TRANSFORMED_COLOR: u32 = 0xCC2244;

fn flow_axes(fig: &mut Figure) {
    fig.x.label = Some("time (s)".into());
    fig.y.label = Some("flow rate (ml/s)".into());
}

fn waveform_series(name: &str, waveform: &TimedWaveform, color: u32, width: f32) -> Series {
    Series::Line(LineSeries {
        name: name.into(),
        points: decimate_points(&waveform.points(), 2048),
        style: Style {
            width,
            dash: None,
            color: Color(color),
        },
    })
}

/// Transformed cycle drawn over the baseline cycle.
pub fn overlay_figure(baseline: &TimedWaveform, transformed: &TimedWaveform) -> Figure {
    let mut fig = Figure::new(Some("Flow-rate waveform".into()));
    flow_axes(&mut fig);
    fig.add_series(waveform_series("baseline", baseline, BASELINE_COLOR, 1.2));
    fig.add_series(waveform_series(
        "transformed",
        transformed,
        TRANSFORMED_COLOR,
        1.8,
    ));
    fig
}
