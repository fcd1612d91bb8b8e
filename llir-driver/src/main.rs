//! LLIR Driver
//!
//! Command-line front end: parse a `.ll` file, optionally eliminate phis,
//! and render it back or print graph views of one function.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use llir_common::IrError;
use llir_core::ir::{eliminate_phis, verify_module, Function, Module, RenderOptions, Renderer};
use llir_core::{IrParser, ParserOptions};
use llir_graph::{BlockGraph, InterferenceGraph};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "llir")]
#[command(about = "LLVM-style IR parser, phi eliminator and renderer")]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and render a module
    Render {
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace phi instructions with predecessor copies first
        #[arg(long)]
        eliminate_phi: bool,

        /// Write numeric block labels as `N:` instead of `; <label>:N`
        #[arg(long)]
        explicit_labels: bool,
    },

    /// Parse a module and check its SSA invariants
    Check { input: PathBuf },

    /// Print the parsed module as JSON
    Dump { input: PathBuf },

    /// Print block successor edges
    Cfg {
        input: PathBuf,

        /// Only this function (default: every definition)
        #[arg(short, long)]
        function: Option<String>,

        /// Graphviz output
        #[arg(long)]
        dot: bool,
    },

    /// Print the interference graph of one function
    Interference {
        input: PathBuf,

        #[arg(short, long)]
        function: String,

        /// Try to colour the graph with this many colours
        #[arg(short = 'k', long)]
        colors: Option<usize>,

        #[arg(long)]
        eliminate_phi: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Render { input, output, eliminate_phi, explicit_labels } => {
            let mut module = load(&input)?;
            if eliminate_phi {
                let removed = eliminate_phis(&mut module)?;
                info!("Eliminated {removed} phi(s)");
            }
            let renderer = Renderer::new(RenderOptions { implicit_labels: !explicit_labels });
            let text = renderer.render_to_string(&module);
            match output {
                Some(path) => fs::write(&path, text)
                    .map_err(IrError::from)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{text}"),
            }
        }
        Commands::Check { input } => {
            let module = load(&input)?;
            verify_module(&module)?;
            println!(
                "{}: {} function(s), {} global(s), ok",
                input.display(),
                module.functions.len(),
                module.globals.len()
            );
        }
        Commands::Dump { input } => {
            let module = load(&input)?;
            println!("{}", serde_json::to_string_pretty(&module)?);
        }
        Commands::Cfg { input, function, dot } => {
            let module = load(&input)?;
            let selected: Vec<&Function> = match &function {
                Some(name) => vec![lookup(&module, name)?],
                None => module.definitions().collect(),
            };
            for function in selected {
                let graph = BlockGraph::build(function)?;
                if dot {
                    println!("{}", graph.to_dot());
                    continue;
                }
                println!("@{}:", function.name);
                for (from, to, kind) in graph.edges() {
                    println!("  %{from} -> %{to} ({kind})");
                }
                for label in graph.unreachable_blocks() {
                    println!("  %{label} unreachable");
                }
            }
        }
        Commands::Interference { input, function, colors, eliminate_phi } => {
            let mut module = load(&input)?;
            if eliminate_phi {
                eliminate_phis(&mut module)?;
            }
            let graph = InterferenceGraph::build(lookup(&module, &function)?)?;
            for name in graph.nodes() {
                let neighbors: Vec<String> =
                    graph.neighbors(name).into_iter().map(|n| format!("%{n}")).collect();
                println!("%{name}: {}", neighbors.join(", "));
            }
            if let Some(k) = colors {
                let assignment = graph
                    .color(k)
                    .ok_or_else(|| anyhow!("@{function} cannot be coloured with {k} colour(s)"))?;
                for (name, color) in assignment {
                    println!("%{name} = {color}");
                }
            }
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Module> {
    let text = fs::read_to_string(path)
        .map_err(IrError::from)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parser = IrParser::new(ParserOptions::with_filename(path.display().to_string()));
    let module = parser.parse_str(&text)?;
    info!("Parsed {} function(s) from {}", module.functions.len(), path.display());
    Ok(module)
}

fn lookup<'a>(module: &'a Module, name: &str) -> Result<&'a Function> {
    module
        .get_function(name)
        .ok_or_else(|| anyhow!("no function named @{name}"))
}
