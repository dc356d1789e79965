use std::path::Path;

use plotters::prelude::*;

use super::{CHART_SIZE, ChartError, FONT, draw_no_data};
use crate::analysis::MetricSummary;

const TITLE: &str = "Billboard Top 100 Danceability, Energy, & Speechiness";

/// Horizontal inset of each box within its slot, in pixels.
const BOX_MARGIN: u32 = 90;
/// Half-width of the whisker caps, in pixels.
const CAP_HALF_WIDTH: i32 = 20;

/// Y range covering every plotted value with 5% padding; `0..1` when empty.
fn value_range(metrics: &[MetricSummary]) -> (f64, f64) {
    let (lo, hi) = metrics
        .iter()
        .filter_map(|m| m.stats.as_ref())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.min), hi.max(s.max))
        });

    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Side-by-side box-and-whisker plots, one per metric, without grid lines.
pub fn render_box_plot(metrics: &[MetricSummary], path: &Path) -> Result<(), ChartError> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let slots = metrics.len().max(1) as u32;
    let (y_min, y_max) = value_range(metrics);

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, (FONT, 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..slots).into_segmented(), y_min..y_max)?;

    let metric_label = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => metrics
            .get(*i as usize)
            .map(|m| m.metric.label().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Audio Metric")
        .y_desc("Least to Most")
        .x_labels(slots as usize)
        .x_label_formatter(&metric_label)
        .draw()?;

    let mut drawn = 0;
    for (i, summary) in metrics.iter().enumerate() {
        let Some(stats) = &summary.stats else {
            continue;
        };
        let x = i as u32;
        let color = Palette99::pick(i).to_rgba();
        let left = SegmentValue::Exact(x);
        let right = SegmentValue::Exact(x + 1);
        let center = SegmentValue::CenterOf(x);

        let mut fill = Rectangle::new(
            [(left.clone(), stats.q3), (right.clone(), stats.q1)],
            color.mix(0.35).filled(),
        );
        fill.set_margin(0, 0, BOX_MARGIN, BOX_MARGIN);
        chart
            .draw_series(std::iter::once(fill))?
            .label(format!(
                "{} - {}",
                summary.metric.label(),
                summary.metric.description()
            ))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        // Box outline and median
        let mut outline = Rectangle::new(
            [(left.clone(), stats.q3), (right.clone(), stats.q1)],
            color.stroke_width(2),
        );
        outline.set_margin(0, 0, BOX_MARGIN, BOX_MARGIN);
        let mut median = Rectangle::new(
            [(left, stats.median), (right, stats.median)],
            BLACK.stroke_width(2),
        );
        median.set_margin(0, 0, BOX_MARGIN, BOX_MARGIN);
        chart.draw_series([outline, median])?;

        // Whiskers
        chart.draw_series(
            [
                (stats.q1, stats.lower_whisker),
                (stats.q3, stats.upper_whisker),
            ]
            .into_iter()
            .map(|(from, to)| {
                PathElement::new(
                    vec![(center.clone(), from), (center.clone(), to)],
                    BLACK.stroke_width(1),
                )
            }),
        )?;

        // Caps
        chart.draw_series([stats.lower_whisker, stats.upper_whisker].into_iter().map(|w| {
            EmptyElement::at((center.clone(), w))
                + PathElement::new(
                    vec![(-CAP_HALF_WIDTH, 0), (CAP_HALF_WIDTH, 0)],
                    BLACK.stroke_width(1),
                )
        }))?;

        chart.draw_series(
            stats
                .outliers
                .iter()
                .map(|v| Circle::new((center.clone(), *v), 4, BLACK.stroke_width(1))),
        )?;

        drawn += 1;
    }

    if drawn == 0 {
        draw_no_data(&root)?;
    } else {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AudioMetric, BoxStats};

    fn metric(metric: AudioMetric, values: &[f64]) -> MetricSummary {
        MetricSummary {
            metric,
            values: values.to_vec(),
            stats: BoxStats::from_values(values),
        }
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(&[]), (0.0, 1.0));
        assert_eq!(value_range(&[metric(AudioMetric::Energy, &[])]), (0.0, 1.0));
        assert_eq!(value_range(&[metric(AudioMetric::Energy, &[0.5, 0.5])]), (0.0, 1.0));

        let (lo, hi) = value_range(&[
            metric(AudioMetric::Danceability, &[0.2, 0.8]),
            metric(AudioMetric::Speechiness, &[0.0, 0.4]),
        ]);
        assert!((lo + 0.04).abs() < 1e-12);
        assert!((hi - 0.84).abs() < 1e-12);
    }

    #[test]
    fn test_box_plot_labels_and_legend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.svg");
        let metrics = vec![
            metric(AudioMetric::Danceability, &[0.5, 0.6, 0.7, 0.8]),
            metric(AudioMetric::Energy, &[0.3, 0.5, 0.9]),
            metric(AudioMetric::Speechiness, &[0.03, 0.04, 0.05, 0.06, 0.9]),
        ];
        render_box_plot(&metrics, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Audio Metric"));
        assert!(svg.contains("Least to Most"));
        assert!(svg.contains("danceability - how suitable a track is for dancing"));
        assert!(svg.contains("energy - intensity and activity"));
        assert!(svg.contains("speechiness - presence of spoken words"));
        assert!(svg.contains("<rect"));
        // the 0.9 speechiness point is an outlier
        assert!(svg.contains("<circle"));
    }
}
