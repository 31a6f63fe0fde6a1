use clap::{Parser, Subcommand};
use sekkei::prelude::*;
use sekkei::wizard::ValidationContext;
use sekkei::workflow::{GraphCommand, apply_script};
use std::fs;
use tracing_subscriber::EnvFilter;

/// Inspect saved forms and build workflows from edit scripts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional designer configuration JSON
    #[arg(short, long)]
    config: Option<String>,

    /// Log debug output (RUST_LOG overrides this)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a saved form model and run every step validator on it
    Form {
        /// Path to the form model JSON
        model_path: String,
    },
    /// Apply a JSON list of canvas edits and print the resulting workflow
    Workflow {
        /// Path to the edit script JSON
        script_path: String,

        /// Print the canvas as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => DesignerConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => DesignerConfig::default(),
    };

    match cli.command {
        Command::Form { model_path } => run_form(&config, &model_path),
        Command::Workflow { script_path, json } => run_workflow(&script_path, json),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "sekkei=debug" } else { "sekkei=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Could not read '{}': {}", path, e)))
}

fn run_form(config: &DesignerConfig, model_path: &str) {
    let model: FormModel = serde_json::from_str(&read_file(model_path))
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid form model: {}", e)));

    println!("--- Form: {} ---", display_or(&model.title, "(untitled)"));
    println!("Fields ({}):", model.fields.len());
    for field in model.sorted_fields() {
        let required = if field.required { " *" } else { "" };
        println!(
            "  {:>3}. {:<12} {}{} [{}]",
            field.order,
            field.kind.as_str(),
            field.label,
            required,
            field.id
        );
    }

    if !model.logic_rules.is_empty() {
        println!("Logic rules ({}):", model.logic_rules.len());
        for rule in &model.logic_rules {
            println!("  - {}", model.describe_rule(rule));
        }
    }

    if !model.controls.is_empty() {
        println!("Designer canvas:");
        let canvas = RendererRegistry::default().render_canvas(&model.controls, None);
        print!("{}", canvas);
    }

    println!("Validation:");
    let validators = ValidatorRegistry::default();
    let mut failures = 0;
    for step in 1..=config.total_steps {
        let ctx = ValidationContext {
            model: &model,
            frame_report: None,
        };
        let result = validators.validate(step, &ctx);
        match result.error_message.filter(|_| !result.is_valid) {
            Some(message) => {
                failures += 1;
                println!("  step {}: ✗ {}", step, message);
            }
            None => println!("  step {}: ✓", step),
        }
    }
    if failures > 0 {
        std::process::exit(2);
    }
}

fn run_workflow(script_path: &str, json: bool) {
    let commands: Vec<GraphCommand> = serde_json::from_str(&read_file(script_path))
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid edit script: {}", e)));

    let mut graph = WorkflowGraph::new();
    if let Err((index, e)) = apply_script(&mut graph, &commands) {
        exit_with_error(&format!("Command #{} failed: {}", index + 1, e));
    }

    if json {
        let output = serde_json::to_string_pretty(&graph)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode workflow: {}", e)));
        println!("{}", output);
        return;
    }

    print!("{}", render_workflow(&graph));
    println!("\nConnections:");
    for edge in graph.connections() {
        println!("  {} -> {}", edge.from, edge.to);
    }
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}
