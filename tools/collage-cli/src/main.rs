//! Collage CLI: manage layouts, place media into cells, and export.
//!
//! Usage:
//!   collage layouts                 List built-in and custom layouts
//!   collage validate <ROWS>...      Check area grammar rows
//!   collage geometry                Print resolved cell rectangles
//!   collage layout <ACTION>         Add, update, delete or edit layouts
//!   collage media <ACTION>          Import, list or remove media
//!   collage cell <ACTION>           Change per-cell properties
//!   collage info                    Show the saved session
//!   collage export                  Render the collage to PNG or WEBM
//!
//! Area rows are given one per argument, e.g. `"a a b" "a a c"`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use collage_common::AppConfig;
use collage_project_model::{GridPercentagePatch, TransformPatch};

mod commands;

#[derive(Parser)]
#[command(
    name = "collage",
    about = "Grid collage editor for images and video",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Layout to work on (defaults to the first layout)
    #[arg(short, long, global = true)]
    layout: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in and custom layouts
    Layouts {
        /// Print layouts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate area grammar rows without saving anything
    Validate {
        /// Area rows, one per argument
        #[arg(required = true)]
        rows: Vec<String>,
    },

    /// Print the resolved rectangle of every cell
    Geometry {
        /// Use free-flow placement
        #[arg(long)]
        free_flow: bool,

        /// Canvas width (defaults to the configured canvas)
        #[arg(long)]
        width: Option<f64>,

        /// Canvas height (defaults to the configured canvas)
        #[arg(long)]
        height: Option<f64>,
    },

    /// Manage layouts
    #[command(subcommand)]
    Layout(LayoutCommand),

    /// Manage the media list
    #[command(subcommand)]
    Media(MediaCommand),

    /// Change per-cell properties
    #[command(subcommand)]
    Cell(CellCommand),

    /// Show the saved session
    Info {
        /// Print the composition state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the collage to PNG, or WEBM when a cell shows video
    Export {
        /// Output directory (defaults to the configured export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use free-flow placement
        #[arg(long)]
        free_flow: bool,

        /// Output pixels per logical pixel
        #[arg(long)]
        pixel_ratio: Option<f64>,

        /// Canvas background color
        #[arg(long)]
        background: Option<String>,
    },
}

#[derive(Subcommand)]
enum LayoutCommand {
    /// Add a custom layout
    Add {
        /// Display name
        name: String,

        /// Area rows, one per argument
        #[arg(required = true)]
        rows: Vec<String>,

        /// Gap between tracks in pixels
        #[arg(long, default_value = "8")]
        gap: u32,
    },

    /// Replace parts of a custom layout
    Update {
        /// Layout id
        id: String,

        /// New area rows
        rows: Vec<String>,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New gap in pixels
        #[arg(long)]
        gap: Option<u32>,
    },

    /// Delete a custom layout
    Delete {
        /// Layout id
        id: String,
    },

    /// Replace the areas of the current layout
    Areas {
        /// Area rows, one per argument
        #[arg(required = true)]
        rows: Vec<String>,
    },

    /// Set the gap of the current layout
    Gap {
        /// Gap in pixels
        gap: u32,
    },
}

#[derive(Subcommand)]
enum MediaCommand {
    /// Import image and video files
    Import {
        /// Files to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List media with their indices
    List,

    /// Remove a media item; later indices shift down
    Remove {
        /// Media index
        index: usize,
    },
}

#[derive(Subcommand)]
enum CellCommand {
    /// Show a media item in a cell
    Assign {
        /// Cell id
        cell: String,

        /// Media index
        index: usize,
    },

    /// Remove the media from a cell
    Clear {
        /// Cell id
        cell: String,
    },

    /// Adjust how media sits inside a cell
    Transform {
        /// Cell id
        cell: String,

        #[command(flatten)]
        patch: TransformArgs,
    },

    /// Set a cell background color
    Color {
        /// Cell id
        cell: String,

        /// Hex color, e.g. "#ff8800"
        color: String,
    },

    /// Set the free-flow rectangle of a cell, in percent of its grid area
    Grid {
        /// Cell id
        cell: String,

        #[command(flatten)]
        patch: GridArgs,
    },

    /// Set the free-flow stacking order of a cell
    Z {
        /// Cell id
        cell: String,

        /// Stacking order; higher draws on top
        z: u32,
    },
}

#[derive(Args)]
struct TransformArgs {
    /// Zoom factor (1.0 = cover)
    #[arg(long)]
    zoom: Option<f64>,

    /// Horizontal offset in pixels
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f64>,

    /// Vertical offset in pixels
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f64>,

    /// Rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f64>,

    /// Extra scale factor
    #[arg(long)]
    scale: Option<f64>,

    /// Corner radius in pixels
    #[arg(long)]
    border_radius: Option<f64>,
}

impl From<TransformArgs> for TransformPatch {
    fn from(args: TransformArgs) -> Self {
        Self {
            zoom: args.zoom,
            offset_x: args.offset_x,
            offset_y: args.offset_y,
            rotation: args.rotation,
            scale: args.scale,
            border_radius: args.border_radius,
        }
    }
}

#[derive(Args)]
struct GridArgs {
    /// Width in percent
    #[arg(long)]
    width: Option<f64>,

    /// Height in percent
    #[arg(long)]
    height: Option<f64>,

    /// Horizontal offset in percent
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f64>,

    /// Vertical offset in percent
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f64>,
}

impl From<GridArgs> for GridPercentagePatch {
    fn from(args: GridArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            offset_x: args.offset_x,
            offset_y: args.offset_y,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    collage_common::logging::init_logging(&logging);
    tracing::debug!(data_dir = %config.data_dir.display(), "Configuration loaded");

    let layout = cli.layout.as_deref();
    match cli.command {
        Commands::Layouts { json } => commands::layouts::run(&config, json),
        Commands::Validate { rows } => commands::validate::run(rows),
        Commands::Geometry {
            free_flow,
            width,
            height,
        } => commands::geometry::run(&config, layout, free_flow, width, height),
        Commands::Layout(action) => match action {
            LayoutCommand::Add { name, rows, gap } => {
                commands::layout::add(&config, name, rows, gap)
            }
            LayoutCommand::Update {
                id,
                rows,
                name,
                gap,
            } => commands::layout::update(&config, id, rows, name, gap),
            LayoutCommand::Delete { id } => commands::layout::delete(&config, id),
            LayoutCommand::Areas { rows } => commands::layout::areas(&config, layout, rows),
            LayoutCommand::Gap { gap } => commands::layout::gap(&config, layout, gap),
        },
        Commands::Media(action) => match action {
            MediaCommand::Import { paths } => commands::media::import(&config, paths).await,
            MediaCommand::List => commands::media::list(&config),
            MediaCommand::Remove { index } => commands::media::remove(&config, index),
        },
        Commands::Cell(action) => match action {
            CellCommand::Assign { cell, index } => {
                commands::cell::assign(&config, layout, cell, index)
            }
            CellCommand::Clear { cell } => commands::cell::clear(&config, cell),
            CellCommand::Transform { cell, patch } => {
                commands::cell::transform(&config, cell, patch.into())
            }
            CellCommand::Color { cell, color } => commands::cell::color(&config, cell, color),
            CellCommand::Grid { cell, patch } => commands::cell::grid(&config, cell, patch.into()),
            CellCommand::Z { cell, z } => commands::cell::z_index(&config, cell, z),
        },
        Commands::Info { json } => commands::info::run(&config, layout, json),
        Commands::Export {
            output,
            free_flow,
            pixel_ratio,
            background,
        } => {
            commands::export::run(&config, layout, output, free_flow, pixel_ratio, background)
                .await
        }
    }
}
