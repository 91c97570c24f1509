use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::ColumnColors;
use crate::data::visualizer::{ChartSpec, Histogram};

// ---------------------------------------------------------------------------
// Two-column bar chart
// ---------------------------------------------------------------------------

/// Bar chart of the chart spec's y column against its x column.
pub fn chart_plot(ui: &mut Ui, file_idx: usize, chart: &ChartSpec, colors: &ColumnColors) {
    let width = bar_width(chart.points.iter().map(|&(x, _)| x));
    let bars: Vec<Bar> = chart
        .points
        .iter()
        .map(|&(x, y)| Bar::new(x, y).width(width))
        .collect();

    Plot::new(("chart", file_idx))
        .height(260.0)
        .legend(Legend::default())
        .x_axis_label(chart.x.as_str())
        .y_axis_label(chart.y.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(chart.y.as_str())
                    .color(colors.color_for(&chart.y)),
            );
        });
}

// ---------------------------------------------------------------------------
// Histogram of the first numeric column
// ---------------------------------------------------------------------------

pub fn histogram_plot(ui: &mut Ui, file_idx: usize, histogram: &Histogram, colors: &ColumnColors) {
    let bars: Vec<Bar> = histogram
        .bins
        .iter()
        .map(|bin| {
            Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
                .width(bin.end - bin.start)
                .name(format!("{:.3} – {:.3}", bin.start, bin.end))
        })
        .collect();

    Plot::new(("histogram", file_idx))
        .height(200.0)
        .x_axis_label(histogram.column.as_str())
        .y_axis_label("Count")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(histogram.column.as_str())
                    .color(colors.color_for(&histogram.column)),
            );
        });
}

/// 80% of the smallest gap between distinct x values, so bars never overlap.
fn bar_width(xs: impl Iterator<Item = f64>) -> f64 {
    let mut xs: Vec<f64> = xs.filter(|x| x.is_finite()).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    xs.windows(2)
        .map(|w| w[1] - w[0])
        .reduce(f64::min)
        .map_or(0.8, |gap| gap * 0.8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_width_follows_smallest_gap() {
        assert_eq!(bar_width([1.0, 3.0, 4.0, 3.0].into_iter()), 0.8);
        assert_eq!(bar_width([0.0, 10.0].into_iter()), 8.0);
        assert_eq!(bar_width(std::iter::once(5.0)), 0.8);
    }
}
