//! ScriptDeck - A tabbed GUI page viewer and script console
//!
//! This application combines a simple page viewer with a script runner:
//! scripts are handed to external interpreters and their output streams live
//! into tabbed output views.

mod app;
// Core modules come from the scriptdeck library

use std::env;
use std::path::PathBuf;
use std::process;

use eframe::egui;
use tracing::{debug, error, info, warn};

use scriptdeck::config::{Config, ConfigLoader};
use scriptdeck::error::Result;

use app::ScriptDeckApp;

/// Application configuration from the command line
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug mode
    debug: bool,
    /// Window width
    width: Option<f32>,
    /// Window height
    height: Option<f32>,
    /// URL for the initial page tab
    url: Option<String>,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> Result<Self> {
        let args: Vec<String> = env::args().collect();
        let mut app_args = AppArgs::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    if i + 1 < args.len() {
                        app_args.config_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    } else {
                        return Err("Missing config file path".into());
                    }
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--width" | "-w" => {
                    if i + 1 < args.len() {
                        app_args.width = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                "--height" | "-h" => {
                    if i + 1 < args.len() {
                        app_args.height = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                "--url" | "-u" => {
                    if i + 1 < args.len() {
                        app_args.url = Some(args[i + 1].clone());
                        i += 1;
                    } else {
                        return Err("Missing URL".into());
                    }
                }
                "--help" | "-?" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-v" => {
                    println!("ScriptDeck v{}", env!("CARGO_PKG_VERSION"));
                    process::exit(0);
                }
                arg if arg.starts_with('-') => {
                    return Err(format!("Unknown option: {}", arg).into());
                }
                _ => {
                    warn!("Ignoring positional argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Ok(app_args)
    }
}

/// Print help information
fn print_help() {
    println!("ScriptDeck - A tabbed GUI page viewer and script console");
    println!();
    println!("USAGE:");
    println!("    scriptdeck [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>    Path to configuration file");
    println!("    -d, --debug            Enable debug logging");
    println!("    -w, --width <WIDTH>    Initial window width");
    println!("    -h, --height <HEIGHT>  Initial window height");
    println!("    -u, --url <URL>        URL for the initial page tab");
    println!("    -?, --help             Print this help message");
    println!("    -v, --version          Print version information");
    println!();
    println!("CONFIGURATION:");
    println!("    ScriptDeck looks for configuration files in the following order:");
    println!("    1. Path specified with --config");
    println!("    2. $SCRIPTDECK_CONFIG");
    println!("    3. <config dir>/scriptdeck/config.toml");
    println!("    4. ~/.scriptdeck/config.toml");
    println!("    5. ./scriptdeck.toml");
    println!("    6. Built-in defaults");
    println!();
    println!("ENVIRONMENT:");
    println!("    SCRIPTDECK_CONFIG      Path to configuration file");
    println!("    SCRIPTDECK_DEBUG       Enable debug logging (1 or true)");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

fn main() -> Result<()> {
    let args = AppArgs::parse().unwrap_or_else(|e| {
        eprintln!("Failed to parse arguments: {}", e);
        print_help();
        process::exit(1);
    });

    // Initialize logging based on debug flag
    let log_level = if args.debug
        || env::var("SCRIPTDECK_DEBUG").is_ok_and(|v| v == "1" || v.to_lowercase() == "true")
    {
        "debug"
    } else {
        "info"
    };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("Starting ScriptDeck v{}", env!("CARGO_PKG_VERSION"));
    debug!("Debug mode enabled");

    let config = load_configuration(&args);
    let native_options = create_native_options(&args, &config);
    let app = ScriptDeckApp::new(config);

    info!("Initializing GUI...");
    if let Err(e) = eframe::run_native(
        "ScriptDeck",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    ) {
        error!("Application failed: {}", e);
        process::exit(1);
    }

    info!("ScriptDeck shutdown complete");
    Ok(())
}

/// Load configuration from file or use defaults
fn load_configuration(args: &AppArgs) -> Config {
    let config_path = args
        .config_path
        .clone()
        .or_else(|| env::var("SCRIPTDECK_CONFIG").ok().map(PathBuf::from));

    let mut config = if let Some(path) = &config_path {
        debug!("Loading config from: {}", path.display());
        match ConfigLoader::load_from_file(path) {
            Ok(config) => {
                info!("Configuration loaded from: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}", path.display(), e);
                info!("Falling back to default configuration");
                scriptdeck::init()
            }
        }
    } else {
        scriptdeck::init()
    };

    // Apply command-line URL override
    if let Some(url) = &args.url {
        debug!("Applying start URL override: {}", url);
        config.ui.start_url = url.clone();
    }

    config
}

/// Create native options for the application window
fn create_native_options(args: &AppArgs, config: &Config) -> eframe::NativeOptions {
    let (config_width, config_height) = config.ui.window_size;
    let width = args.width.unwrap_or(config_width);
    let height = args.height.unwrap_or(config_height);

    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("ScriptDeck")
            .with_app_id("scriptdeck")
            .with_icon(std::sync::Arc::new(create_window_icon()))
            .with_inner_size([width, height])
            .with_min_inner_size([400.0, 300.0])
            .with_resizable(true),
        ..Default::default()
    }
}

/// Create a simple generated window icon
fn create_window_icon() -> egui::IconData {
    // 32x32 icon suggesting a text page with a run arrow
    let mut rgba = Vec::with_capacity(32 * 32 * 4);

    let bg_color = [32, 36, 48, 255];
    let page_color = [220, 220, 228, 255];
    let accent_color = [100, 200, 120, 255];

    for y in 0..32u32 {
        for x in 0..32u32 {
            let pixel = if (4..28).contains(&x) && (3..29).contains(&y) {
                // Page area with text-like stripes
                if y >= 7 && y % 4 == 0 && (6..22).contains(&x) {
                    bg_color
                } else if (20..27).contains(&x) && (18..27).contains(&y) && x - 20 >= (26 - y) / 2 {
                    // Run triangle in the corner
                    accent_color
                } else {
                    page_color
                }
            } else {
                bg_color
            };

            rgba.extend_from_slice(&pixel);
        }
    }

    egui::IconData {
        rgba,
        width: 32,
        height: 32,
    }
}
