use anyhow::Result;
use expedientes_lib::{
    get_config_path, init_logging, load_config, load_config_from, process_workbooks, save_config,
};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    init_logging();

    // explicit config file, or the per-user one (written with defaults on first run)
    let config = match std::env::args_os().nth(1) {
        Some(path) => load_config_from(&PathBuf::from(path))?,
        None => {
            let config_path = get_config_path();
            let config = load_config();
            if !config_path.exists() {
                save_config(&config, &config_path)?;
                info!(config = %config_path.display(), "wrote default config");
            }
            config
        }
    };

    let result = process_workbooks(&config)?;
    info!(
        workbooks = result.workbooks,
        case_files = result.case_files,
        history_events = result.history_events,
        output = %result.output_path,
        "done"
    );

    Ok(())
}
