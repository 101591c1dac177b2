//! Generates a Jupyter notebook exploring the MIMIC-III diagnoses and ICD code tables.
//!
//! The notebook is built from a fixed script of cells (see [`script`]) using the document model
//! in [`notebook`], and written to disk as nbformat v4 JSON.
pub mod config;
pub mod error;
pub mod notebook;
pub mod script;
mod util;

pub use anyhow::{Context, Error};

pub use crate::{
    config::Config,
    error::{ErrorKind, WriteError},
    notebook::{
        build_document, is_canonical, make_code_cell, make_markdown_cell, read_document,
        write_document, Cell, Document, Metadata, NotebookBuilder,
    },
    util::header,
};

pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
