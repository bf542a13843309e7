/// Render one selection and print both chart specs as JSON.
///
/// Usage: explorer_snapshot [CONFIG.toml] [YEAR] [REGION]
/// Without a config file the defaults apply (./military_expenditure.csv).
use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use milex_explorer::logging::init_tracing;
use milex_explorer::{ExplorerConfig, ExplorerModel, Session};
use tracing::info;

fn main() -> Result<()> {
    init_tracing("info");

    let args: Vec<String> = env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => ExplorerConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => ExplorerConfig::default(),
    };

    let model = ExplorerModel::from_config(&config)
        .with_context(|| format!("building model from {}", config.data_path().display()))?;
    let mut session = Session::new(Arc::new(model));

    if let Some(year) = args.get(1) {
        let year: i32 = year.parse().with_context(|| format!("year '{year}'"))?;
        session.select_year(year)?;
    }
    if let Some(region) = args.get(2) {
        session.select_region(region)?;
    }

    let state = session.state();
    info!(year = state.selected_year, region = %state.selected_region, "rendering");
    println!("{}", session.render()?.to_json_pretty()?);
    Ok(())
}
