// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `sceneref`: scan scene documents for object-to-object references.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use sceneref_app_core::config::ConfigService;
use sceneref_app_core::prefs::ScanPrefs;
use sceneref_config_fs::FsConfigStore;
use sceneref_core::{find_references_to, FilterPolicy, ReferenceCollector};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod report;
mod scene_file;

use report::Format;

#[derive(Parser, Debug)]
#[command(author, version, about = "Discover references between scene objects")]
struct Cli {
    /// Directory holding `scan-prefs.json` (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// JSON filter policy replacing the one derived from scan preferences
    #[arg(long, global = true)]
    policy: Option<PathBuf>,
    /// Raise log verbosity (repeatable); `RUST_LOG` takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every reference, grouped by owning object
    Scan {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// List references to one object or its components
    Refs {
        #[command(flatten)]
        scene: SceneArgs,
        /// Object label in the scene document
        object: String,
    },
    /// List objects that neither hold nor receive a reference
    Isolated {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Print the effective filter policy as JSON
    Policy,
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Scene document (JSON)
    scene: PathBuf,
    /// Enumerate root objects only
    #[arg(long)]
    roots_only: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_prefs(config_dir: Option<&Path>) -> Result<ScanPrefs> {
    let store = match config_dir {
        Some(dir) => FsConfigStore::at(dir)
            .with_context(|| format!("opening config dir {}", dir.display()))?,
        None => match FsConfigStore::new() {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "no config dir; using default scan preferences");
                return Ok(ScanPrefs::default());
            }
        },
    };
    debug!(dir = %store.base().display(), "loading scan preferences");
    ScanPrefs::load(&ConfigService::new(store)).context("loading scan preferences")
}

fn load_policy(path: &Path) -> Result<FilterPolicy> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading policy {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing policy {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let prefs = load_prefs(cli.config_dir.as_deref())?;
    let policy = match &cli.policy {
        Some(path) => load_policy(path)?,
        None => prefs.policy(),
    };
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Policy => {
            serde_json::to_writer_pretty(&mut out, &policy)?;
            writeln!(out)?;
        }
        Command::Scan { scene: args } => {
            let loaded = scene_file::load_path(&args.scene)?;
            let collector = ReferenceCollector::new(&loaded.scene, &policy);
            let edges = collector.collect_scene(args.roots_only || prefs.roots_only);
            info!(edges = edges.len(), "scan complete");
            report::write_edges(&mut out, &loaded.scene, &loaded.labels, &edges, args.format)?;
        }
        Command::Refs {
            scene: args,
            object,
        } => {
            let loaded = scene_file::load_path(&args.scene)?;
            let Some(target) = loaded.labels.object_id(&object) else {
                bail!("object `{object}` is not declared in {}", args.scene.display());
            };
            let collector = ReferenceCollector::new(&loaded.scene, &policy);
            let edges = collector.collect_scene(args.roots_only || prefs.roots_only);
            let hits = find_references_to(&loaded.scene, target, &edges);
            info!(edges = edges.len(), hits = hits.len(), "reference lookup complete");
            report::write_edges(&mut out, &loaded.scene, &loaded.labels, &hits, args.format)?;
        }
        Command::Isolated { scene: args } => {
            let loaded = scene_file::load_path(&args.scene)?;
            let roots_only = args.roots_only || prefs.roots_only;
            let collector = ReferenceCollector::new(&loaded.scene, &policy);
            let edges = collector.collect_scene(roots_only);
            let isolated = report::isolated_objects(&loaded.scene, &edges, roots_only);
            report::write_objects(&mut out, &loaded.scene, &loaded.labels, &isolated, args.format)?;
        }
    }
    Ok(())
}
