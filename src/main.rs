use skylens::command::Command;
use skylens::config::Config;
use skylens::scene::Scene;
use skylens::util::{touch_dir, PrintErr};
use skylens::Viewer;

use clap::Parser;
use directories::ProjectDirs;
use env_logger::Env;
use std::env::var_os;
use std::io::stdin;
use std::path::{Path, PathBuf};

fn main() {
    main_().print_err().ok();
}

/// Command line arguments
#[derive(Parser)]
#[clap(version)]
struct Args {
    /// Path to a scene file describing the image
    #[clap(value_name = "SCENE")]
    scene: Option<PathBuf>,
    /// Command to run on the viewer (repeatable)
    /// If none are given, commands are read from stdin
    #[clap(long = "exec", short, value_name = "COMMAND")]
    exec: Vec<String>,
    /// Path to the configuration directory
    #[clap(long, short, value_name = "DIR")]
    config_dir: Option<PathBuf>,
    /// Enable debug logging
    #[clap(long, short)]
    debug: bool,
}

fn main_() -> Result<(), String> {
    // Parse command line args
    let args = Args::parse();

    // Logging: `RUST_LOG` overrides the default filter
    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    // Build the command list
    let commands = if !args.exec.is_empty() {
        // We have been given commands as command line arguments
        args.exec
    } else if !atty::is(atty::Stream::Stdin) {
        // We have commands to read from stdin
        stdin()
            .lines()
            .collect::<Result<_, _>>()
            .map_err(|e| format!("Error reading from stdin: {}", e))?
    } else {
        // We have no commands
        vec![]
    };

    // Build settings from the config file and defaults
    const PROJECT_NAME: &str = "skylens";
    let dirs = ProjectDirs::from_path(PathBuf::from(PROJECT_NAME))
        .ok_or_else(|| "Failed to determine the system's home directory".to_string())?;

    // Config directory: Determined by args, then an environment variable, then a system standard
    const CONFIG_DIR_ENV_VAR: &str = "SKYLENS_CONFIG_DIR";
    let config_dir = args
        .config_dir
        .or_else(|| var_os(CONFIG_DIR_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| dirs.config_dir().to_path_buf());
    touch_dir(&config_dir)?;

    // The config file: Determined by `config_dir`
    const CONFIG_FILENAME: &str = "config.toml";
    let config_file_path = config_dir.join(CONFIG_FILENAME);
    let settings = Config::load(&config_file_path)?
        .settings()
        .map_err(|e| format!("Error in config file at `{}`: {}", config_file_path.display(), e))?;

    log::debug!("Settings: {:?}", settings);

    let mut viewer = Viewer::new(settings);

    if let Some(scene_path) = &args.scene {
        let base_dir = scene_path.parent().unwrap_or_else(|| Path::new("."));

        let image = Scene::load(scene_path)
            .and_then(|scene| scene.into_image(base_dir))
            .map_err(|e| format!("Failed to load scene `{}`: {}", scene_path.display(), e))?;

        viewer.load_image(image);
    }

    run_commands(&commands, &mut viewer);

    Ok(())
}

/// Run each command line in turn, printing any output
/// A failing command is reported and the rest still run
fn run_commands(lines: &[String], viewer: &mut Viewer) {
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let output = line
            .parse::<Command>()
            .and_then(|command| command.run(viewer))
            .map_err(|e| format!("{}: {}", line, e))
            .print_err();

        if let Ok(Some(output)) = output {
            println!("{}", output);
        }
    }
}
