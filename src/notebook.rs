//! The notebook document model and its on-disk representation (nbformat v4 JSON).
//!
//! A [`Document`] is an ordered list of [`Cell`]s plus a fixed kernel/language declaration. Cells
//! are built with [`make_markdown_cell`] and [`make_code_cell`] (or a [`NotebookBuilder`]),
//! combined with [`build_document`], and written once with [`write_document`].
//!
//! The serialized form matches what `nbformat.write` produces: sorted keys, one-space
//! indentation, `source` split into lines, and a trailing newline. This makes the output
//! reproducible byte for byte.
use crate::{error::WriteError, util, Result};
use once_cell::sync::Lazy;
use qu::ick_use::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Serializer};
use std::{
    collections::{BTreeMap, HashMap},
    ffi::{OsStr, OsString},
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Major format version written into every document.
pub const NBFORMAT: u32 = 4;
/// Minor format version. 4.5 is the first version with cell ids.
pub const NBFORMAT_MINOR: u32 = 5;

pub const KERNEL_DISPLAY_NAME: &str = "Python 3";
pub const KERNEL_NAME: &str = "python3";
pub const LANGUAGE: &str = "python";
pub const LANGUAGE_VERSION: &str = "3.8";

static CELL_ID: Lazy<Regex> = Lazy::new(|| Regex::new("^[a-zA-Z0-9-_]{1,64}$").unwrap());

/// Free-form per-cell metadata. Always empty for generated cells.
pub type CellMetadata = BTreeMap<String, serde_json::Value>;

/// One unit of a notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown(MarkdownCell),
    Code(CodeCell),
}

// Fields are declared in alphabetical order so the output has sorted keys.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    metadata: CellMetadata,
    #[serde(
        serialize_with = "util::serialize_lines",
        deserialize_with = "util::deserialize_lines"
    )]
    source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    execution_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    metadata: CellMetadata,
    #[serde(default)]
    outputs: Vec<serde_json::Value>,
    #[serde(
        serialize_with = "util::serialize_lines",
        deserialize_with = "util::deserialize_lines"
    )]
    source: String,
}

impl CodeCell {
    /// Always `None` for cells made by this crate.
    pub fn execution_count(&self) -> Option<u32> {
        self.execution_count
    }

    /// Always empty for cells made by this crate.
    pub fn outputs(&self) -> &[serde_json::Value] {
        &self.outputs
    }
}

/// Wrap markdown text verbatim in a cell. The text is not parsed or escaped.
pub fn make_markdown_cell(text: impl Into<String>) -> Cell {
    Cell::Markdown(MarkdownCell {
        id: None,
        metadata: CellMetadata::new(),
        source: text.into(),
    })
}

/// Wrap source text in a code cell that has never been executed.
pub fn make_code_cell(text: impl Into<String>) -> Cell {
    Cell::Code(CodeCell {
        execution_count: None,
        id: None,
        metadata: CellMetadata::new(),
        outputs: Vec::new(),
        source: text.into(),
    })
}

impl Cell {
    /// The `cell_type` discriminator as it appears in the file.
    pub fn cell_type(&self) -> &'static str {
        match self {
            Cell::Markdown(_) => "markdown",
            Cell::Code(_) => "code",
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Cell::Markdown(cell) => &cell.source,
            Cell::Code(cell) => &cell.source,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Cell::Markdown(cell) => cell.id.as_deref(),
            Cell::Code(cell) => cell.id.as_deref(),
        }
    }

    /// Give the cell an explicit id. [`build_document`] keeps explicit ids.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        *self.id_mut() = Some(id.into());
        self
    }

    pub fn as_code(&self) -> Option<&CodeCell> {
        match self {
            Cell::Code(cell) => Some(cell),
            Cell::Markdown(_) => None,
        }
    }

    fn id_mut(&mut self) -> &mut Option<String> {
        match self {
            Cell::Markdown(cell) => &mut cell.id,
            Cell::Code(cell) => &mut cell.id,
        }
    }
}

/// The kernel & language declaration of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub kernelspec: KernelSpec,
    pub language_info: LanguageInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSpec {
    pub display_name: String,
    pub language: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    pub version: String,
}

impl Metadata {
    /// The Python 3 kernel every generated notebook declares.
    pub fn python3() -> Self {
        Metadata {
            kernelspec: KernelSpec {
                display_name: KERNEL_DISPLAY_NAME.into(),
                language: LANGUAGE.into(),
                name: KERNEL_NAME.into(),
            },
            language_info: LanguageInfo {
                name: LANGUAGE.into(),
                version: LANGUAGE_VERSION.into(),
            },
        }
    }
}

/// A complete notebook: ordered cells, metadata and format version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    cells: Vec<Cell>,
    metadata: Metadata,
    nbformat: u32,
    nbformat_minor: u32,
}

/// Combine cells and metadata into a document.
///
/// Cells without an id get one derived from their position (`cell-00`, `cell-01`, ...), so the
/// same cells always produce the same document. An empty cell list gives an empty notebook.
pub fn build_document(cells: impl IntoIterator<Item = Cell>, metadata: Metadata) -> Document {
    let cells = cells
        .into_iter()
        .enumerate()
        .map(|(idx, mut cell)| {
            let id = cell.id_mut();
            if id.is_none() {
                *id = Some(format!("cell-{:02}", idx));
            }
            cell
        })
        .collect();
    Document {
        cells,
        metadata,
        nbformat: NBFORMAT,
        nbformat_minor: NBFORMAT_MINOR,
    }
}

impl Document {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// `(major, minor)`
    pub fn format_version(&self) -> (u32, u32) {
        (self.nbformat, self.nbformat_minor)
    }

    /// The exact text [`write_document`] puts on disk.
    pub fn to_json_string(&self) -> Result<String, WriteError> {
        self.check_ids()?;
        let mut ser = Serializer::with_formatter(Vec::new(), PrettyFormatter::with_indent(b" "));
        self.serialize(&mut ser)?;
        let mut out = ser.into_inner();
        out.push(b'\n');
        String::from_utf8(out)
            .map_err(|e| <serde_json::Error as serde::ser::Error>::custom(e).into())
    }

    /// Present ids must be well formed and unique. Missing ids are allowed (older minor
    /// versions don't have them).
    fn check_ids(&self) -> Result<(), WriteError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (index, cell) in self.cells.iter().enumerate() {
            let Some(id) = cell.id() else {
                continue;
            };
            if !CELL_ID.is_match(id) {
                return Err(WriteError::InvalidCellId {
                    index,
                    id: id.to_owned(),
                });
            }
            if let Some(first) = seen.insert(id, index) {
                return Err(WriteError::DuplicateCellId {
                    first,
                    second: index,
                    id: id.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Serialize `document` and write it to `path`.
///
/// The text goes to a temporary file next to `path` which is then renamed over it, so readers
/// see either the old file or the complete new one. The parent directory must already exist.
pub fn write_document(document: &Document, path: impl AsRef<Path>) -> Result<(), WriteError> {
    let path = path.as_ref();
    let text = document.to_json_string()?;

    if util::path_exists(path).map_err(|e| WriteError::io(path, e))? {
        event!(
            Level::WARN,
            "overwriting existing file at \"{}\"",
            path.display()
        );
    }

    let tmp_path = tmp_path_for(path);
    let written = fs::File::create(&tmp_path).and_then(|mut file| {
        file.write_all(text.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(WriteError::io(path, e));
    }
    Ok(())
}

/// `dir/.name.tmp` for `dir/name`.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| OsStr::new("notebook")));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load a notebook from disk.
///
/// `source` fields may be either a single string or a list of lines.
pub fn read_document(path: impl AsRef<Path>) -> Result<Document> {
    fn inner(path: &Path) -> Result<Document> {
        let text = fs::read_to_string(path)?;
        let document: Document = serde_json::from_str(&text)?;
        ensure!(
            document.nbformat == NBFORMAT,
            "unsupported notebook format version {}.{}",
            document.nbformat,
            document.nbformat_minor
        );
        Ok(document)
    }
    let path = path.as_ref();
    inner(path).with_context(|| format!("loading notebook \"{}\"", path.display()))
}

/// Whether the file at `path` is byte-for-byte what [`write_document`] would write for the
/// notebook it contains.
pub fn is_canonical(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let document = read_document(path)?;
    let on_disk = fs::read_to_string(path)
        .with_context(|| format!("reading notebook \"{}\"", path.display()))?;
    Ok(document.to_json_string()? == on_disk)
}

/// Appends cells one at a time, then turns them into a [`Document`].
///
/// `build` consumes the builder, so a finished notebook can't be appended to.
#[derive(Debug, Default)]
pub struct NotebookBuilder {
    cells: Vec<Cell>,
}

impl NotebookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markdown(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(make_markdown_cell(text))
    }

    pub fn code(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(make_code_cell(text))
    }

    pub fn push(&mut self, cell: Cell) -> &mut Self {
        self.cells.push(cell);
        self
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn build(self, metadata: Metadata) -> Document {
        build_document(self.cells, metadata)
    }
}
