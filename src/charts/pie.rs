use std::path::Path;

use plotters::prelude::*;

use super::{CHART_SIZE, ChartError, FONT, FREQUENCY_TITLE, draw_no_data};
use crate::analysis::ArtistCount;

/// Width of the legend column left of the pie.
const LEGEND_WIDTH: u32 = 280;

fn slice_color(i: usize) -> RGBColor {
    let (r, g, b) = Palette99::pick(i).rgb();
    RGBColor(r, g, b)
}

/// One slice per artist labeled with its percentage; artist legend on the left.
pub fn render_pie_chart(summary: &[ArtistCount], path: &Path) -> Result<(), ChartError> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(FREQUENCY_TITLE, (FONT, 28))?;
    let (legend_area, pie_area) = body.split_horizontally(LEGEND_WIDTH);

    let sizes: Vec<f64> = summary.iter().map(|c| c.count as f64).collect();
    if sizes.iter().sum::<f64>() <= 0.0 {
        draw_no_data(&pie_area)?;
        root.present()?;
        return Ok(());
    }

    // Pie places itself in backend pixels, not area-relative ones.
    let (w, h) = pie_area.dim_in_pixel();
    let (x0, y0) = pie_area.get_base_pixel();
    let center = (x0 + w as i32 / 2, y0 + h as i32 / 2);
    let radius = w.min(h) as f64 / 2.0 * 0.85;
    let colors: Vec<RGBColor> = (0..sizes.len()).map(slice_color).collect();
    // Artists go in the legend, slices carry only their percentage.
    let labels = vec![""; sizes.len()];

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.percentages((FONT, 16).into_font().color(&BLACK));
    pie_area.draw(&pie)?;

    for (i, entry) in summary.iter().enumerate() {
        let y = 40 + i as i32 * 28;
        legend_area.draw(&Rectangle::new([(20, y), (38, y + 18)], slice_color(i).filled()))?;
        legend_area.draw(&Text::new(entry.artist.as_str(), (46, y + 2), (FONT, 16)))?;
    }

    root.present()?;
    Ok(())
}
