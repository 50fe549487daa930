//! Page grid as CSV (RFC 4180 quoting).

use super::Report;
use anyhow::Result;
use std::io::{self, Write};

const SEP: char = ',';

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one row, quoting fields that need it.
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{SEP}")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    w.write_all(b"\r\n")
}

pub fn render(report: &Report) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_row(&mut out, &Report::grid_headers())?;
    for row in report.grid_rows() {
        write_row(&mut out, &row)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_session;

    fn row(cells: &[&str]) -> String {
        let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        let mut out = Vec::new();
        write_row(&mut out, &cells).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_quoting() {
        assert_eq!(row(&["a", "b"]), "a,b\r\n");
        assert_eq!(row(&["a,b", "say \"hi\""]), "\"a,b\",\"say \"\"hi\"\"\"\r\n");
        assert_eq!(row(&["line\nbreak"]), "\"line\nbreak\"\r\n");
    }

    #[test]
    fn test_render_grid() {
        let report = Report::build(&sample_session()).unwrap();
        let text = String::from_utf8(render(&report).unwrap()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Order,Title,URL,Loading,Images"));
        assert!(lines[0].ends_with("Overall,Open Issues"));
        assert!(lines[1].starts_with("1,Home,https://acme.example/,pending,ok"));
        assert!(lines[2].starts_with("2,\"Contact, Sales\","));
        assert!(lines[2].ends_with("not-ok,1"));
    }
}
