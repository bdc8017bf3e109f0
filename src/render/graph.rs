use anyhow::{Context, Result};
use plotters::prelude::*;

use super::Renderer;
use crate::analysis::regions::Region;

/// Chart dimensions
const WIDTH: u32 = 1000;
const HEIGHT: u32 = 400;

/// Normalized pitch rarely leaves +/-3 standard deviations.
const Y_MIN: f32 = -3.0;
const Y_MAX: f32 = 3.0;
const LABEL_Y: f32 = 2.2;

const COLOR_REFERENCE: RGBColor = RGBColor(0, 128, 0); // green
const COLOR_USER: RGBColor = RGBColor(220, 20, 20); // red
const REGION_COLORS: [RGBColor; 3] = [
    RGBColor(230, 242, 255), // blue tint
    RGBColor(255, 240, 230), // orange tint
    RGBColor(230, 255, 230), // green tint
];

/// PNG line chart: shaded syllable regions, reference solid, user dashed.
#[derive(Debug, Clone, Default)]
pub struct PlottersRenderer;

impl Renderer for PlottersRenderer {
    fn render(
        &self,
        reference_aligned: &[f32],
        user_aligned: &[f32],
        regions: &[Region],
        title: &str,
    ) -> Result<Vec<u8>> {
        anyhow::ensure!(
            !reference_aligned.is_empty() || !user_aligned.is_empty(),
            "Nothing to draw: both series are empty"
        );

        // The bitmap backend encodes on `present`, which needs a real file.
        let file = tempfile::Builder::new()
            .prefix("pitchcoach-graph-")
            .suffix(".png")
            .tempfile()
            .context("Failed to create temporary graph file")?;

        draw(file.path(), reference_aligned, user_aligned, regions, title)?;

        std::fs::read(file.path()).context("Failed to read rendered graph")
    }
}

fn draw(
    path: &std::path::Path,
    reference: &[f32],
    user: &[f32],
    regions: &[Region],
    title: &str,
) -> Result<()> {
    let len = reference.len().max(user.len());
    let x_max = (len.max(2) - 1) as f32;

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).context("Failed to fill background")?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0f32..x_max, Y_MIN..Y_MAX)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Aligned time")
        .y_desc("Normalized pitch")
        .draw()?;

    for (i, region) in regions.iter().enumerate() {
        let color = REGION_COLORS[i % REGION_COLORS.len()];
        let (start, end) = (region.start_index as f32, region.end_index as f32);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(start, Y_MIN), (end, Y_MAX)],
            color.mix(0.5).filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            region.label.clone(),
            ((start + end) / 2.0, LABEL_Y),
            ("sans-serif", 16).into_font().color(&BLACK),
        )))?;
    }

    chart
        .draw_series(LineSeries::new(
            series_points(reference),
            COLOR_REFERENCE.stroke_width(3),
        ))?
        .label("Teacher")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COLOR_REFERENCE.stroke_width(3)));

    chart
        .draw_series(DashedLineSeries::new(
            series_points(user),
            6,
            4,
            COLOR_USER.stroke_width(2),
        ))?
        .label("You")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COLOR_USER.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present().context("Failed to write graph PNG")?;

    Ok(())
}

/// Values outside the plot range are clamped so spikes stay visible.
fn series_points(series: &[f32]) -> Vec<(f32, f32)> {
    series
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f32, v.clamp(Y_MIN, Y_MAX)))
        .collect()
}
