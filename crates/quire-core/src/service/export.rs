//! Alternate notebook representations.

use std::fmt;
use std::str::FromStr;

use quire_sync::{Cell, CellType};

use crate::error::Error;

/// Target format for `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Re-encode and overwrite the backing `.ipynb`.
    Document,
    /// `<stem>.py` with code blocks and commented markdown.
    Script,
    /// `<stem>.html` for display.
    Rendered,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Script => "script",
            Self::Rendered => "rendered",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    /// Accepts the format names and the file-type aliases `ipynb`, `py`, `html`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" | "ipynb" => Ok(Self::Document),
            "script" | "py" => Ok(Self::Script),
            "rendered" | "html" => Ok(Self::Rendered),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Render cells as a script.
///
/// Code cells become `# Cell <i>` followed by their raw source; markdown
/// cells become `# `-prefixed lines; raw cells are left out. Blocks are
/// separated by blank lines and keep notebook order.
pub fn render_script(cells: &[Cell]) -> String {
    let mut out = String::new();
    for (index, cell) in cells.iter().enumerate() {
        match cell.cell_type {
            CellType::Code => {
                out.push_str(&format!("# Cell {}\n", index));
                out.push_str(&cell.source);
                out.push_str("\n\n");
            }
            CellType::Markdown => {
                for line in cell.source.lines() {
                    out.push_str(&format!("# {}\n", line));
                }
                out.push('\n');
            }
            CellType::Raw => {}
        }
    }
    out
}

const STYLE: &str = "<style>body{font-family:monospace;max-width:900px;margin:auto;padding:2rem}\
.code{background:#f4f4f4;padding:1rem;border-radius:4px}\
.md{padding:.5rem 0}</style></head><body>";

/// Render a notebook as a standalone HTML page.
///
/// Cell source and the notebook name are inserted verbatim, without
/// escaping: markup in a cell will become part of the page structure.
pub fn render_html(name: &str, cells: &[Cell]) -> String {
    let mut parts = vec![
        "<!DOCTYPE html><html><head>".to_string(),
        format!("<title>{}</title>", name),
        STYLE.to_string(),
        format!("<h1>{}</h1>", name),
    ];

    for (index, cell) in cells.iter().enumerate() {
        match cell.cell_type {
            CellType::Code => parts.push(format!(
                "<div class=\"code\"><pre>[{}]: {}</pre></div>",
                index, cell.source
            )),
            CellType::Markdown => {
                parts.push(format!("<div class=\"md\"><p>{}</p></div>", cell.source))
            }
            CellType::Raw => {}
        }
    }

    parts.push("</body></html>".to_string());
    parts.join("\n")
}
