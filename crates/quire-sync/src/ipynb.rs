//! Jupyter notebook (.ipynb) encoding and decoding.
//!
//! Converts between the in-memory [`Cell`] sequence and the nbformat 4
//! JSON document.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{SyncError, SyncResult};

/// Major nbformat version written and accepted.
pub const NBFORMAT: u32 = 4;

/// Minor nbformat version written.
pub const NBFORMAT_MINOR: u32 = 5;

/// Kind of notebook cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    #[default]
    Code,
    Markdown,
    Raw,
}

impl CellType {
    /// Name used in the document format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Markdown => "markdown",
            Self::Raw => "raw",
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notebook cell as held in memory.
///
/// `outputs` and `execution_count` are only meaningful for code cells and
/// are never written for other cell types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,

    /// Full source text, line breaks included.
    pub source: String,

    /// Opaque output records.
    #[serde(default)]
    pub outputs: Vec<Value>,

    /// Opaque cell metadata, passed through unmodified.
    #[serde(default)]
    pub metadata: Map<String, Value>,

    #[serde(default)]
    pub execution_count: Option<u32>,
}

impl Cell {
    /// Create a code cell.
    pub fn code(source: impl Into<String>) -> Self {
        Self {
            cell_type: CellType::Code,
            source: source.into(),
            ..Self::default()
        }
    }

    /// Create a markdown cell.
    pub fn markdown(source: impl Into<String>) -> Self {
        Self {
            cell_type: CellType::Markdown,
            source: source.into(),
            ..Self::default()
        }
    }

    /// Create a raw cell.
    pub fn raw(source: impl Into<String>) -> Self {
        Self {
            cell_type: CellType::Raw,
            source: source.into(),
            ..Self::default()
        }
    }

    /// Whether this is a code cell.
    pub fn is_code(&self) -> bool {
        self.cell_type == CellType::Code
    }
}

/// A Jupyter notebook document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JupyterNotebook {
    /// Notebook metadata
    #[serde(default)]
    pub metadata: JupyterMetadata,

    /// Format version (always 4)
    #[serde(default = "default_nbformat")]
    pub nbformat: u32,

    /// Minor format version
    #[serde(default)]
    pub nbformat_minor: u32,

    /// Notebook cells
    #[serde(default)]
    pub cells: Vec<JupyterCell>,
}

/// Jupyter notebook metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JupyterMetadata {
    /// Kernel specification
    #[serde(default)]
    pub kernelspec: KernelDescriptor,

    /// Language info
    #[serde(default)]
    pub language_info: LanguageInfo,

    /// Any other notebook-level metadata, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Kernel descriptor block (`metadata.kernelspec`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelDescriptor {
    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub language: String,

    /// Kernel name
    #[serde(default)]
    pub name: String,
}

impl KernelDescriptor {
    /// Descriptor for the given kernel name with the default Python display fields.
    pub fn for_kernel(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for KernelDescriptor {
    fn default() -> Self {
        Self {
            display_name: "Python 3".to_string(),
            language: "python".to_string(),
            name: "python3".to_string(),
        }
    }
}

/// Language information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,
}

impl Default for LanguageInfo {
    fn default() -> Self {
        Self {
            name: "python".to_string(),
            version: "3.11".to_string(),
        }
    }
}

/// A cell in its serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JupyterCell {
    /// Cell type
    #[serde(default)]
    pub cell_type: CellType,

    /// Cell metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// Cell source (line fragments, terminators kept)
    #[serde(default, deserialize_with = "deserialize_source")]
    pub source: Vec<String>,

    /// Cell outputs (code cells only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Value>>,

    /// Execution count (code cells only). `Some(None)` serializes as `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<Option<u32>>,
}

/// Source may be a single string or a list of line fragments.
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceRepr {
    Text(String),
    Lines(Vec<String>),
}

fn deserialize_source<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<SourceRepr>::deserialize(deserializer)? {
        Some(SourceRepr::Text(text)) => vec![text],
        Some(SourceRepr::Lines(lines)) => lines,
        None => Vec::new(),
    })
}

fn default_nbformat() -> u32 {
    NBFORMAT
}

/// Split source into fragments, each keeping its trailing `\n`.
///
/// A trailing line without a terminator becomes its own fragment; empty
/// source yields no fragments.
pub fn split_source(source: &str) -> Vec<String> {
    source.split_inclusive('\n').map(str::to_string).collect()
}

impl From<&Cell> for JupyterCell {
    fn from(cell: &Cell) -> Self {
        let (outputs, execution_count) = if cell.is_code() {
            (Some(cell.outputs.clone()), Some(cell.execution_count))
        } else {
            (None, None)
        };

        Self {
            cell_type: cell.cell_type,
            metadata: cell.metadata.clone(),
            source: split_source(&cell.source),
            outputs,
            execution_count,
        }
    }
}

impl From<JupyterCell> for Cell {
    fn from(cell: JupyterCell) -> Self {
        let is_code = cell.cell_type == CellType::Code;
        Self {
            cell_type: cell.cell_type,
            source: cell.source.concat(),
            outputs: if is_code {
                cell.outputs.unwrap_or_default()
            } else {
                Vec::new()
            },
            metadata: cell.metadata,
            execution_count: if is_code {
                cell.execution_count.flatten()
            } else {
                None
            },
        }
    }
}

impl JupyterNotebook {
    /// Create a new empty notebook.
    pub fn new() -> Self {
        Self {
            metadata: JupyterMetadata::default(),
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
            cells: Vec::new(),
        }
    }

    /// Build a document from in-memory cells for the given kernel.
    pub fn from_cells(cells: &[Cell], kernel: &str) -> Self {
        let mut notebook = Self::new();
        notebook.metadata.kernelspec = KernelDescriptor::for_kernel(kernel);
        notebook.cells = cells.iter().map(JupyterCell::from).collect();
        notebook
    }

    /// Consume the document, yielding its cells.
    pub fn into_cells(self) -> Vec<Cell> {
        self.cells.into_iter().map(Cell::from).collect()
    }

    /// Parse a document from bytes.
    pub fn from_slice(bytes: &[u8]) -> SyncResult<Self> {
        let notebook: Self = serde_json::from_slice(bytes)?;
        if notebook.nbformat != NBFORMAT {
            return Err(SyncError::InvalidNotebook(format!(
                "unsupported nbformat {} (expected {})",
                notebook.nbformat, NBFORMAT
            )));
        }
        Ok(notebook)
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_vec(&self) -> SyncResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Write the notebook to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> SyncResult<()> {
        let path = path.as_ref();
        let json = self.to_vec()?;
        fs::write(path, json).map_err(|e| SyncError::WriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Read a notebook from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|e| SyncError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_slice(&content)
    }
}

impl Default for JupyterNotebook {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode cells into document bytes.
pub fn encode(cells: &[Cell], kernel: &str) -> SyncResult<Vec<u8>> {
    JupyterNotebook::from_cells(cells, kernel).to_vec()
}

/// Decode document bytes into cells.
pub fn decode(bytes: &[u8]) -> SyncResult<Vec<Cell>> {
    Ok(JupyterNotebook::from_slice(bytes)?.into_cells())
}
