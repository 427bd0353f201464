//! Emitter configuration command implementations

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use sprite_particles::{EmitterConfig, ValueRange};
use std::path::PathBuf;

use crate::utils::{add_table_row, create_table, format_value};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the default emitter configuration
    Default {
        /// Output format
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Load a configuration file and display its values
    Check {
        /// Path to the configuration file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

pub fn execute(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Default { format } => handle_default(format),
        ConfigCommands::Check { file } => handle_check(file),
    }
}

fn handle_default(format: OutputFormat) -> Result<()> {
    let config = EmitterConfig::default();
    let text = match format {
        OutputFormat::Yaml => config.to_yaml_string()?,
        OutputFormat::Json => config.to_json_string()?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn handle_check(file: PathBuf) -> Result<()> {
    let config = EmitterConfig::load(&file)
        .with_context(|| format!("Failed to load emitter config {}", file.display()))?;

    println!("Emitter config: {}", file.display());
    println!();
    config_table(&config).printstd();

    let degenerate = config.degenerate_fields();
    println!();
    if degenerate.is_empty() {
        println!("✓ No degenerate values");
    } else {
        println!("⚠ Degenerate values: {}", degenerate.join(", "));
    }

    Ok(())
}

fn range_row(name: &str, range: ValueRange, unit: &str) -> Vec<String> {
    vec![
        name.to_string(),
        format_value(range.min),
        format_value(range.max),
        unit.to_string(),
    ]
}

fn config_table(config: &EmitterConfig) -> prettytable::Table {
    let mut table = create_table(&["Field", "Min / X", "Max / Y", "Unit"]);
    let rows = [
        range_row("speed", config.speed, "units/s"),
        range_row("emit_angle", config.emit_angle, "deg"),
        range_row("particle_angle", config.particle_angle, "deg"),
        range_row("scale", config.scale, "start/end"),
        range_row("alpha", config.alpha, "start/end"),
        vec![
            "gravity".to_string(),
            format_value(config.gravity.x),
            format_value(config.gravity.y),
            "units/s²".to_string(),
        ],
        vec![
            "position".to_string(),
            format_value(config.position.x),
            format_value(config.position.y),
            "units".to_string(),
        ],
        vec![
            "life".to_string(),
            format_value(config.life),
            String::new(),
            "s".to_string(),
        ],
        vec![
            "seed".to_string(),
            config
                .seed
                .map_or_else(|| "os".to_string(), |seed| seed.to_string()),
            String::new(),
            String::new(),
        ],
    ];
    for row in rows {
        add_table_row(&mut table, row);
    }
    table
}
