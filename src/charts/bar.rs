use std::path::Path;

use plotters::prelude::*;

use super::{CHART_SIZE, ChartError, FONT, FREQUENCY_TITLE, draw_no_data};
use crate::analysis::ArtistCount;

const BAR_COLOR: RGBColor = RGBColor(64, 224, 208); // turquoise

/// One bar per artist, count annotated above each bar.
pub fn render_bar_chart(summary: &[ArtistCount], path: &Path) -> Result<(), ChartError> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let slots = summary.len().max(1) as u32;
    let max_count = summary.iter().map(|c| c.count).max().unwrap_or(0) as u32;
    // One extra unit of headroom for the annotations.
    let y_top = max_count + 1;

    let mut chart = ChartBuilder::on(&root)
        .caption(FREQUENCY_TITLE, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d((0u32..slots).into_segmented(), 0u32..y_top)?;

    let artist_label = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => summary
            .get(*i as usize)
            .map(|c| c.artist.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    // u32 axis: every tick is an integer
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Artist")
        .y_desc("Frequency")
        .x_labels(slots as usize)
        .x_label_formatter(&artist_label)
        .y_labels(y_top as usize + 1)
        .draw()?;

    if summary.is_empty() {
        draw_no_data(&root)?;
        root.present()?;
        return Ok(());
    }

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(10)
                .data(summary.iter().enumerate().map(|(i, c)| (i as u32, c.count as u32))),
        )?
        .label("count")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BAR_COLOR.filled()));

    chart.draw_series(summary.iter().enumerate().map(|(i, c)| {
        EmptyElement::at((SegmentValue::CenterOf(i as u32), c.count as u32))
            + Text::new(c.count.to_string(), (-4, -22), (FONT, 16))
    }))?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_chart_labels_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.svg");
        let summary = vec![
            ArtistCount { artist: "Post Malone".to_string(), count: 4 },
            ArtistCount { artist: "Lizzo".to_string(), count: 2 },
        ];
        render_bar_chart(&summary, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains(FREQUENCY_TITLE));
        assert!(svg.contains("Artist"));
        assert!(svg.contains("Frequency"));
        assert!(svg.contains("Post Malone"));
        assert!(svg.contains("Lizzo"));
        assert!(!svg.contains("No data"));
    }
}
