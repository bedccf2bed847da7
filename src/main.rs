// snes-go - Main Entry Point
//
// Boots the frame scheduler on the desktop host. Without a ROM argument the
// built-in test pattern core runs. Menus are served on the terminal.
//
// Usage: snes-go [ROM]
// Log level is taken from RUST_LOG (default: info).

use snes_go::config::{FrontendConfig, CONFIG_FILE};
use snes_go::core::TestPatternCore;
use snes_go::host::{run_desktop, DesktopPlatform, WindowConfig};
use snes_go::input::KeymapSet;
use snes_go::menu::ConsoleMenu;
use snes_go::platform::JsonSettingsStore;
use snes_go::scheduler::FrameScheduler;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("snes-go v{}", env!("CARGO_PKG_VERSION"));

    let config = FrontendConfig::load_or_default(CONFIG_FILE);
    let settings = JsonSettingsStore::open_or_empty(&config.paths.settings);
    let keymaps = KeymapSet::load_or_builtin(&config.paths.keymaps);

    let rom_path = std::env::args_os().nth(1).map(PathBuf::from).unwrap_or_default();

    let platform = DesktopPlatform::new(&config, settings);
    let menu = ConsoleMenu::new(io::stdin().lock(), io::stdout());
    let mut scheduler =
        FrameScheduler::new(platform, TestPatternCore::new(), menu, &config, keymaps);

    // A fatal boot error ends the process with a non-zero status
    let rom = scheduler.boot(&rom_path)?;
    info!(rom = %rom.name, "running (Escape opens the game menu, Tab the options)");

    let window = WindowConfig::new()
        .with_scale(config.video.scale)
        .with_vsync(config.video.vsync);
    run_desktop(scheduler, window)?;

    info!("exited");
    Ok(())
}
