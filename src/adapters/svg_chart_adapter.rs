//! SVG chart rendering implementing ReportPort.
//!
//! - `<TICKER>_equity.svg`: buy & hold and strategy equity curves
//! - `summary_cagr.svg`: strategy vs buy & hold CAGR per ticker
//! - `summary_metrics.svg`: Sharpe ratio and max drawdown per ticker

use std::fs;
use std::path::Path;

use crate::domain::error::SmacrossError;
use crate::domain::evaluator::EvaluationResult;
use crate::ports::report_port::ReportPort;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const PADDING: f64 = 50.0;

const BUYHOLD_COLOR: &str = "#1f77b4";
const STRATEGY_COLOR: &str = "#ff7f0e";
const SHARPE_COLOR: &str = "#2ca02c";
const DRAWDOWN_COLOR: &str = "#d62728";

pub struct SvgChartAdapter;

pub struct BarGroup<'a> {
    pub label: &'a str,
    pub color: &'a str,
    pub values: Vec<f64>,
}

fn svg_open(title: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" viewBox=\"0 0 {w:.0} {h:.0}\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n\
         <text x=\"{cx:.0}\" y=\"25\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"16\">{title}</text>\n",
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        title = escape(title),
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn legend(out: &mut String, entries: &[(&str, &str)]) {
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = PADDING + 15.0 + i as f64 * 18.0;
        out.push_str(&format!(
            "<rect x=\"{:.0}\" y=\"{:.0}\" width=\"12\" height=\"12\" fill=\"{}\"/>\
             <text x=\"{:.0}\" y=\"{:.0}\" font-family=\"sans-serif\" font-size=\"12\">{}</text>\n",
            PADDING + 10.0,
            y - 10.0,
            color,
            PADDING + 28.0,
            y,
            escape(label)
        ));
    }
}

fn axes(out: &mut String) {
    out.push_str(&format!(
        "<line x1=\"{p:.0}\" y1=\"{p:.0}\" x2=\"{p:.0}\" y2=\"{b:.0}\" stroke=\"black\"/>\n\
         <line x1=\"{p:.0}\" y1=\"{b:.0}\" x2=\"{r:.0}\" y2=\"{b:.0}\" stroke=\"black\"/>\n",
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING,
    ));
}

fn y_label(out: &mut String, y: f64, value: f64) {
    out.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.1}\" text-anchor=\"end\" font-family=\"sans-serif\" font-size=\"10\">{:.2}</text>\n",
        PADDING - 5.0,
        y + 3.0,
        value
    ));
}

/// Equity curves for one instrument, both series sharing one y scale.
pub fn format_equity_chart(ticker: &str, result: &EvaluationResult) -> String {
    let title = format!("{} Equity Curve (growth of $1)", ticker);
    let mut out = svg_open(&title);

    if result.series.is_empty() {
        out.push_str(&format!(
            "<text x=\"{:.0}\" y=\"{:.0}\" text-anchor=\"middle\" font-family=\"sans-serif\">No equity data available.</text>\n</svg>\n",
            WIDTH / 2.0,
            HEIGHT / 2.0
        ));
        return out;
    }

    let buyhold = result.series.buyhold_equity();
    let strategy = result.series.strategy_equity();

    let min_equity = buyhold
        .iter()
        .chain(&strategy)
        .copied()
        .fold(f64::INFINITY, f64::min);
    let max_equity = buyhold
        .iter()
        .chain(&strategy)
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max_equity - min_equity;
    let scale_y = if range > 0.0 {
        plot_height / range
    } else {
        1.0
    };
    let scale_x = if buyhold.len() > 1 {
        plot_width / (buyhold.len() - 1) as f64
    } else {
        0.0
    };

    let polyline = |values: &[f64]| -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let x = PADDING + i as f64 * scale_x;
                let y = HEIGHT - PADDING - (v - min_equity) * scale_y;
                format!("{:.1},{:.1}", x, y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    axes(&mut out);
    y_label(&mut out, HEIGHT - PADDING, min_equity);
    y_label(&mut out, PADDING, max_equity);

    let rows = &result.series.rows;
    out.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.0}\" font-family=\"sans-serif\" font-size=\"10\">{}</text>\
         <text x=\"{:.0}\" y=\"{:.0}\" text-anchor=\"end\" font-family=\"sans-serif\" font-size=\"10\">{}</text>\n",
        PADDING,
        HEIGHT - PADDING + 15.0,
        rows[0].bar.date,
        WIDTH - PADDING,
        HEIGHT - PADDING + 15.0,
        rows[rows.len() - 1].bar.date
    ));

    for (values, color) in [(&buyhold, BUYHOLD_COLOR), (&strategy, STRATEGY_COLOR)] {
        out.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
            color,
            polyline(values.as_slice())
        ));
    }

    legend(&mut out, &[("Buy & Hold", BUYHOLD_COLOR), ("Strategy", STRATEGY_COLOR)]);
    out.push_str("</svg>\n");
    out
}

/// Grouped bar chart with a zero baseline; values may be negative.
pub fn format_bar_chart(title: &str, categories: &[&str], groups: &[BarGroup<'_>]) -> String {
    let mut out = svg_open(title);

    if categories.is_empty() || groups.is_empty() {
        out.push_str("</svg>\n");
        return out;
    }

    let finite = groups
        .iter()
        .flat_map(|g| g.values.iter().copied())
        .filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = if hi - lo > 0.0 { hi - lo } else { 1.0 };

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let to_y = |v: f64| HEIGHT - PADDING - (v - lo) / range * plot_height;
    let zero_y = to_y(0.0);

    let slot = plot_width / categories.len() as f64;
    let bar_width = slot * 0.8 / groups.len() as f64;

    axes(&mut out);
    y_label(&mut out, to_y(lo), lo);
    y_label(&mut out, to_y(hi), hi);
    out.push_str(&format!(
        "<line x1=\"{:.0}\" y1=\"{:.1}\" x2=\"{:.0}\" y2=\"{:.1}\" stroke=\"gray\" stroke-dasharray=\"4\"/>\n",
        PADDING,
        zero_y,
        WIDTH - PADDING,
        zero_y
    ));

    for (ci, category) in categories.iter().enumerate() {
        let slot_x = PADDING + ci as f64 * slot + slot * 0.1;
        for (gi, group) in groups.iter().enumerate() {
            let value = group.values.get(ci).copied().unwrap_or(0.0);
            let value = if value.is_finite() { value } else { 0.0 };
            let y = to_y(value);
            let (top, height) = if y < zero_y {
                (y, zero_y - y)
            } else {
                (zero_y, y - zero_y)
            };
            out.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
                slot_x + gi as f64 * bar_width,
                top,
                bar_width,
                height,
                group.color
            ));
        }
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.0}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"12\">{}</text>\n",
            PADDING + ci as f64 * slot + slot / 2.0,
            HEIGHT - PADDING + 18.0,
            escape(category)
        ));
    }

    let entries: Vec<(&str, &str)> = groups.iter().map(|g| (g.label, g.color)).collect();
    legend(&mut out, &entries);
    out.push_str("</svg>\n");
    out
}

fn write_svg(path: &Path, content: &str) -> Result<(), SmacrossError> {
    let export_err = |e: std::io::Error| SmacrossError::Export {
        reason: format!("failed to write {}: {}", path.display(), e),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(export_err)?;
    }
    fs::write(path, content).map_err(export_err)
}

impl ReportPort for SvgChartAdapter {
    fn write_instrument(
        &self,
        result: &EvaluationResult,
        output_dir: &Path,
    ) -> Result<(), SmacrossError> {
        let path = output_dir.join(format!("{}_equity.svg", result.ticker));
        write_svg(&path, &format_equity_chart(&result.ticker, result))
    }

    fn write_summary(
        &self,
        results: &[EvaluationResult],
        output_dir: &Path,
    ) -> Result<(), SmacrossError> {
        let tickers: Vec<&str> = results.iter().map(|r| r.ticker.as_str()).collect();

        let cagr = format_bar_chart(
            "Strategy vs Buy & Hold CAGR",
            &tickers,
            &[
                BarGroup {
                    label: "Strategy CAGR",
                    color: STRATEGY_COLOR,
                    values: results.iter().map(|r| r.metrics.strategy_cagr).collect(),
                },
                BarGroup {
                    label: "Buy & Hold CAGR",
                    color: BUYHOLD_COLOR,
                    values: results.iter().map(|r| r.metrics.buyhold_cagr).collect(),
                },
            ],
        );
        write_svg(&output_dir.join("summary_cagr.svg"), &cagr)?;

        let metrics = format_bar_chart(
            "Sharpe Ratio and Max Drawdown",
            &tickers,
            &[
                BarGroup {
                    label: "Sharpe",
                    color: SHARPE_COLOR,
                    values: results.iter().map(|r| r.metrics.sharpe_ratio).collect(),
                },
                BarGroup {
                    label: "Max Drawdown",
                    color: DRAWDOWN_COLOR,
                    values: results.iter().map(|r| r.metrics.max_drawdown).collect(),
                },
            ],
        );
        write_svg(&output_dir.join("summary_metrics.svg"), &metrics)
    }
}
