use anyhow::{bail, Context};
use dockspace::config::types::Config;

fn main() -> anyhow::Result<()> {
    // Handle --print-default-config before any other initialization
    if std::env::args().any(|a| a == "--print-default-config") {
        print!("{}", Config::print_default());
        return Ok(());
    }

    env_logger::init();
    log::info!("dockspace v{} starting", env!("CARGO_PKG_VERSION"));

    let mut json = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => config_path = Some(std::path::PathBuf::from(arg)),
        }
    }
    let config_path = config_path.unwrap_or_else(dirs_config_path);

    let config = Config::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    log::info!(
        "Root direction: {:?}, tolerance: {}, top-level panels: {}",
        config.workspace.root_direction,
        config.workspace.size_tolerance,
        config.layout.children.len()
    );

    let tree = config.build_tree().context("building workspace layout")?;
    let report = tree.check_invariants();
    if !report.is_ok() {
        bail!("workspace layout is inconsistent:\n{report}");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", tree.outline());
    }
    Ok(())
}

/// Get the config file path (~/.config/dockspace/config.toml).
fn dirs_config_path() -> std::path::PathBuf {
    dirs_home()
        .join(".config")
        .join("dockspace")
        .join("config.toml")
}

/// Get the user's home directory.
fn dirs_home() -> std::path::PathBuf {
    std::env::var("HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
}
