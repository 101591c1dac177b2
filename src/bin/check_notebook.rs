//! Print the cells of a notebook and check that it is stored the way we would write it.
use mimic_eda_notebook::{header, is_canonical, read_document};
use qu::ick_use::*;
use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
struct Opt {
    path: PathBuf,
}

#[qu::ick]
fn main(opt: Opt) -> Result {
    let document = read_document(&opt.path)?;
    let (major, minor) = document.format_version();
    header(&format!(
        "{} (nbformat {}.{}, {} cells)",
        opt.path.display(),
        major,
        minor,
        document.cells().len()
    ));
    for (idx, cell) in document.cells().iter().enumerate() {
        let first_line = cell.source().lines().next().unwrap_or("");
        println!(
            "{:>3} {:<8} {:<10} {}",
            idx,
            cell.cell_type(),
            cell.id().unwrap_or("-"),
            first_line
        );
    }

    ensure!(
        is_canonical(&opt.path)?,
        "\"{}\" is not in canonical form (re-serializing it changes the file)",
        opt.path.display()
    );
    event!(Level::INFO, "notebook is in canonical form");
    Ok(())
}
