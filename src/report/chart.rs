//! Text bar charts for terminal and Markdown output.

const BAR: char = '█';

/// Render a horizontal bar chart.
///
/// Bars are scaled to the largest magnitude. When any value is negative
/// the chart is drawn around a central axis, negative bars growing left.
pub fn bar_chart(bars: &[(String, f64)], width: usize, decimals: usize, suffix: &str) -> String {
    let bars: Vec<&(String, f64)> = bars.iter().filter(|(_, v)| v.is_finite()).collect();
    if bars.is_empty() {
        return String::new();
    }

    let label_width = bars.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max_abs = bars.iter().map(|(_, v)| v.abs()).fold(0.0, f64::max);
    let diverging = bars.iter().any(|(_, v)| *v < 0.0);
    let area = if diverging { width / 2 } else { width };

    let scaled = |value: f64| -> usize {
        if max_abs == 0.0 {
            0
        } else {
            ((value.abs() / max_abs) * area as f64).round() as usize
        }
    };

    let mut chart = String::new();
    for (label, value) in bars {
        let len = scaled(*value);
        let figure = if diverging {
            format!("{:+.*}{}", decimals, value, suffix)
        } else {
            format!("{:.*}{}", decimals, value, suffix)
        };

        let body = if diverging {
            let (left, right) = if *value < 0.0 { (len, 0) } else { (0, len) };
            format!(
                "{}{}|{}{}",
                " ".repeat(area - left),
                bar(left),
                bar(right),
                " ".repeat(area - right)
            )
        } else {
            format!("{}{}", bar(len), " ".repeat(area - len))
        };

        chart.push_str(&format!(
            "{:<width$} {} {}\n",
            label,
            body,
            figure,
            width = label_width
        ));
    }

    chart
}

fn bar(len: usize) -> String {
    std::iter::repeat(BAR).take(len).collect()
}
