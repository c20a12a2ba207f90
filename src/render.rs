//! Fixed-width text rendering of collected result tables.
//!
//! ```text
//! |---|-----|-------|
//! |id |name |val    |
//! |---|-----|-------|
//! |1  |a    |[null] |
//! |2  |b    |x      |
//! |---|-----|-------|
//! ```

use unicode_width::UnicodeWidthStr;

use crate::collector::{ColumnDescriptor, Row, RowCollector};

/// Render columns and rows as a bordered table, one line per row.
///
/// Each column is as wide as its longest header or cell plus one space.
/// Cells are left-justified. Every line, including the last, ends with `\n`.
pub fn render_table(columns: &[ColumnDescriptor], rows: &[Row]) -> String {
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.cells().iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let widest_cell = rendered
                .iter()
                .filter_map(|cells| cells.get(i))
                .map(|text| text.width())
                .max()
                .unwrap_or(0);
            column.label.width().max(widest_cell) + 1
        })
        .collect();

    let mut out = String::new();
    push_border(&mut out, &widths);
    push_line(&mut out, &widths, columns.iter().map(|c| c.label.as_str()));
    push_border(&mut out, &widths);
    for cells in &rendered {
        push_line(&mut out, &widths, cells.iter().map(String::as_str));
    }
    push_border(&mut out, &widths);
    out
}

/// Render everything a collector holds.
pub fn render_collected(collector: &RowCollector) -> String {
    render_table(collector.columns(), collector.rows())
}

fn push_border(out: &mut String, widths: &[usize]) {
    out.push('|');
    for &width in widths {
        out.extend(std::iter::repeat('-').take(width));
        out.push('|');
    }
    out.push('\n');
}

fn push_line<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for (text, &width) in cells.zip(widths) {
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(width.saturating_sub(text.width())));
        out.push('|');
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Cell;
    use crate::value::Value;

    fn column(ordinal: usize, label: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            ordinal,
            name: label.to_string(),
            label: label.to_string(),
        }
    }

    fn sample() -> (Vec<ColumnDescriptor>, Vec<Row>) {
        let columns = vec![column(1, "id"), column(2, "name"), column(3, "val")];
        let rows = vec![
            Row::from(vec![
                Cell::Value(Value::Int(1)),
                Cell::Value("a".into()),
                Cell::Null,
            ]),
            Row::from(vec![
                Cell::Value(Value::Int(2)),
                Cell::Value("b".into()),
                Cell::Value("x".into()),
            ]),
        ];
        (columns, rows)
    }

    #[test]
    fn test_render_layout() {
        let (columns, rows) = sample();
        let expected = "\
|---|-----|-------|
|id |name |val    |
|---|-----|-------|
|1  |a    |[null] |
|2  |b    |x      |
|---|-----|-------|
";
        assert_eq!(render_table(&columns, &rows), expected);
    }

    #[test]
    fn test_width_is_longest_value_plus_one() {
        let columns = vec![column(1, "n"), column(2, "description")];
        let rows = vec![Row::from(vec![
            Cell::Value("much longer".into()),
            Cell::Unread,
        ])];
        let text = render_table(&columns, &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "|------------|------------|");
        assert_eq!(lines[1], "|n           |description |");
        assert_eq!(lines[3], "|much longer |[unread]    |");
    }

    #[test]
    fn test_render_is_stable() {
        let columns = vec![column(1, "k"), column(2, "v")];
        let rows = vec![
            Row::from(vec![Cell::Value(Value::Int(10)), Cell::FillError]),
            Row::from(vec![Cell::Value(Value::Int(11)), Cell::Value(Value::Null)]),
        ];
        let first = render_table(&columns, &rows);
        let second = render_table(&columns, &rows);
        assert_eq!(first, second);
        assert!(first.contains("|10 |[unread!] |"));
        assert!(first.contains("|11 |null      |"));
    }

    #[test]
    fn test_render_without_rows() {
        let columns = vec![column(1, "id")];
        assert_eq!(render_table(&columns, &[]), "|---|\n|id |\n|---|\n|---|\n");
    }

    #[test]
    fn test_render_wide_characters() {
        let columns = vec![column(1, "名前")];
        let rows = vec![Row::from(vec![Cell::Value("ab".into())])];
        let text = render_table(&columns, &rows);
        assert!(text.contains("|名前 |"));
        assert!(text.contains("|ab   |"));
    }
}
