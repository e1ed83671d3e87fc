//! Tabular rendering of changepoints for reports.

use crate::detection::Peak;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default caption of the LaTeX changepoint table.
pub const DEFAULT_CAPTION: &str = "Changepoint dates for the selected subset.";

/// One numbered changepoint with its peak window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangepointRow {
    /// 1-based changepoint number.
    pub changepoint: usize,
    pub timestamp: NaiveDateTime,
    pub left: NaiveDateTime,
    pub right: NaiveDateTime,
}

/// Number the peaks of `subset` in chronological order.
pub fn changepoint_table(peaks: &[Peak], subset: &str) -> Vec<ChangepointRow> {
    let mut selected: Vec<&Peak> = peaks.iter().filter(|p| p.subset == subset).collect();
    selected.sort_by_key(|p| p.timestamp);
    selected
        .into_iter()
        .enumerate()
        .map(|(i, p)| ChangepointRow {
            changepoint: i + 1,
            timestamp: p.timestamp,
            left: p.left,
            right: p.right,
        })
        .collect()
}

fn cells(row: &ChangepointRow) -> [String; 4] {
    [
        row.changepoint.to_string(),
        row.timestamp.format(DATE_FORMAT).to_string(),
        row.left.format(DATE_FORMAT).to_string(),
        row.right.format(DATE_FORMAT).to_string(),
    ]
}

const HEADER: [&str; 4] = ["changepoint", "timestamp", "left", "right"];

/// Render rows as an aligned plain-text table.
pub fn render_text(rows: &[ChangepointRow]) -> String {
    let body: Vec<[String; 4]> = rows.iter().map(cells).collect();
    let mut widths = HEADER.map(str::len);
    for r in &body {
        for (w, c) in widths.iter_mut().zip(r) {
            *w = (*w).max(c.len());
        }
    }

    let line = |cols: [&str; 4]| -> String {
        cols.iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:>w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = line(HEADER);
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
    out.push('\n');
    for r in &body {
        out.push_str(&line([r[0].as_str(), r[1].as_str(), r[2].as_str(), r[3].as_str()]));
        out.push('\n');
    }
    out
}

/// Render rows as a LaTeX `table` with booktabs rules.
pub fn render_latex(rows: &[ChangepointRow], caption: &str) -> String {
    let mut out = String::new();
    out.push_str("\\begin{table}[htb]\n");
    out.push_str(&format!("\\caption{{{caption}}}\n"));
    out.push_str("\\label{tab:changepoints}\n");
    out.push_str("\\begin{tabular}{lccc}\n");
    out.push_str("\\toprule\n");
    out.push_str(&format!("{} \\\\\n", HEADER.join(" & ")));
    out.push_str("\\midrule\n");
    for r in rows {
        out.push_str(&format!("{} \\\\\n", cells(r).join(" & ")));
    }
    out.push_str("\\bottomrule\n");
    out.push_str("\\end{tabular}\n");
    out.push_str("\\end{table}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn peak(subset: &str, m: u32, d: u32) -> Peak {
        Peak {
            subset: subset.to_string(),
            index: 0,
            timestamp: day(m, d),
            height: 0.8,
            width: 2.0,
            left: day(m, d - 7),
            right: day(m, d + 6),
        }
    }

    fn rows() -> Vec<ChangepointRow> {
        let peaks = vec![peak("a", 6, 14), peak("b", 2, 8), peak("a", 3, 15)];
        changepoint_table(&peaks, "a")
    }

    #[test]
    fn table_numbers_selected_subset_chronologically() {
        let rows = rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].changepoint, 1);
        assert_eq!(rows[0].timestamp, day(3, 15));
        assert_eq!(rows[1].changepoint, 2);
        assert_eq!(rows[1].timestamp, day(6, 14));
    }

    #[test]
    fn latex_table_layout() {
        let latex = render_latex(&rows(), DEFAULT_CAPTION);
        let expected = "\
\\begin{table}[htb]
\\caption{Changepoint dates for the selected subset.}
\\label{tab:changepoints}
\\begin{tabular}{lccc}
\\toprule
changepoint & timestamp & left & right \\\\
\\midrule
1 & 2021-03-15 & 2021-03-08 & 2021-03-21 \\\\
2 & 2021-06-14 & 2021-06-07 & 2021-06-20 \\\\
\\bottomrule
\\end{tabular}
\\end{table}
";
        assert_eq!(latex, expected);
    }

    #[test]
    fn text_table_is_aligned() {
        let text = render_text(&rows());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("right"));
        assert!(lines[2].starts_with("          1  2021-03-15"));
        assert!(lines.iter().skip(2).all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn empty_table_has_header_only() {
        let latex = render_latex(&[], DEFAULT_CAPTION);
        assert!(latex.contains("\\midrule\n\\bottomrule"));
        assert_eq!(render_text(&[]).lines().count(), 2);
    }
}
