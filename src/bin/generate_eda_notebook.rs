use mimic_eda_notebook::{script, write_document, Config};
use qu::ick_use::*;
use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
struct Opt {
    /// TOML file with `output` and/or `data_dir` settings.
    #[clap(long)]
    config: Option<PathBuf>,
    /// Where to write the notebook.
    #[clap(long, short)]
    output: Option<PathBuf>,
    /// Directory the notebook will read the MIMIC-III csv files from.
    #[clap(long)]
    data_dir: Option<String>,
}

#[qu::ick]
fn main(opt: Opt) -> Result {
    let config = match &opt.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_overrides(opt.output, opt.data_dir);

    let notebook = script::diagnoses_eda(&config.data_dir);
    event!(
        Level::INFO,
        "writing {} cells to \"{}\"",
        notebook.cells().len(),
        config.output.display()
    );
    write_document(&notebook, &config.output)?;
    println!("Notebook {} created!", config.output.display());
    Ok(())
}
