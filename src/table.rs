//! Plain-text rendering of aggregation results.

use std::fmt::Write as _;

use crate::results::AggregationResult;

const HEADERS: [&str; 8] = [
    "taxi_type",
    "vendor",
    "payment_type",
    "min_fare",
    "max_fare",
    "trip_count",
    "total_toll_fare",
    "total_fare",
];

/// Columns from this index on hold numbers and are right-aligned.
const FIRST_NUMERIC_COLUMN: usize = 3;

pub fn render_results(results: &[AggregationResult]) -> String {
    let rows = results.iter().map(result_cells).collect::<Vec<_>>();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let headers = HEADERS.map(str::to_string);
    let _ = writeln!(output, "{}", format_row(&headers, &widths));
    let separator = widths.map(|w| "-".repeat(w));
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_results(results: &[AggregationResult]) {
    print!("{}", render_results(results));
}

fn result_cells(result: &AggregationResult) -> [String; 8] {
    [
        sanitize(&result.taxi_type),
        sanitize(&result.vendor),
        sanitize(&result.payment_type),
        format!("{:.2}", result.min_fare),
        format!("{:.2}", result.max_fare),
        result.trip_count.to_string(),
        format!("{:.2}", result.total_toll_fare),
        format!("{:.2}", result.total_fare),
    ]
}

fn format_row(cells: &[String; 8], widths: &[usize; 8]) -> String {
    let mut line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (cell, &width))| {
            if idx >= FIRST_NUMERIC_COLUMN {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.truncate(line.trim_end().len());
    line
}

fn sanitize(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(payment_type: &str, trip_count: i64) -> AggregationResult {
        AggregationResult {
            taxi_type: "yellow and green".to_string(),
            vendor: "all".to_string(),
            payment_type: payment_type.to_string(),
            min_fare: 5.0,
            max_fare: 30.0,
            trip_count,
            total_toll_fare: 1.5,
            total_fare: 80.0,
        }
    }

    #[test]
    fn render_results_aligns_text_left_and_numbers_right() {
        let rendered = render_results(&[sample("Credit card", 12), sample("Cash", 3)]);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(&format!("{:<16}  {:<6}  payment_type", "taxi_type", "vendor")));
        assert!(lines[2].contains("Credit card "));
        assert!(lines[3].contains("Cash        "));
        assert!(lines[3].ends_with(&format!("{:>15}  {:>10}", "1.50", "80.00")));
        assert!(lines[2].contains(&format!("  {:>10}  ", "12")));
    }

    #[test]
    fn render_results_flattens_control_characters() {
        let rendered = render_results(&[sample("line1\nline2", 1)]);
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.contains("line1 line2"));
    }
}
