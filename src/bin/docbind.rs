//! docbind CLI - bind JSON documents against YAML struct schemas
//!
//! Loads a schema, decodes a document into the root struct and prints the
//! bound record as JSON.

use clap::{Parser, Subcommand};
use docbind::{unmarshal, HandlerRegistry, HookDecl, Hooks, SchemaSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docbind")]
#[command(version, about = "Declarative JSON document-to-struct binding", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind a JSON document and print the resulting record
    Bind {
        /// Path to the YAML schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// JSON document to bind ("-" reads stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Root struct name (overrides the schema's root)
        #[arg(short, long)]
        root: Option<String>,

        /// Extra hook, as TAG=handler or TAG=handler:arg
        #[arg(long = "hook", value_name = "TAG=HANDLER[:ARG]")]
        hooks: Vec<String>,

        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Validate a schema file without binding anything
    Validate {
        /// Path to the YAML schema file
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// List the built-in hook handlers
    Handlers,
}

fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Bind {
            schema,
            input,
            root,
            hooks,
            compact,
        } => bind_document(&schema, &input, root, &hooks, compact),
        Commands::Validate { schema } => validate_schema(&schema),
        Commands::Handlers => list_handlers(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse `TAG=handler[:arg]` into a hook declaration.
fn parse_hook_arg(raw: &str) -> Result<HookDecl, String> {
    let (tag, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid hook '{}': expected TAG=HANDLER[:ARG]", raw))?;
    if tag.is_empty() {
        return Err(format!("invalid hook '{}': empty tag", raw));
    }
    let (handler, arg) = match rest.split_once(':') {
        Some((handler, arg)) => (handler, serde_json::Value::String(arg.to_string())),
        None => (rest, serde_json::Value::Null),
    };
    Ok(HookDecl {
        tag: tag.to_string(),
        handler: handler.to_string(),
        arg,
    })
}

fn read_input(input: &Path) -> Result<Vec<u8>, String> {
    if input == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        Ok(buf)
    } else {
        std::fs::read(input).map_err(|e| format!("Failed to read {}: {}", input.display(), e))
    }
}

fn bind_document(
    schema_path: &Path,
    input: &Path,
    root: Option<String>,
    extra_hooks: &[String],
    compact: bool,
) -> Result<(), String> {
    let mut schema = SchemaSet::load_from_file(schema_path).map_err(|e| e.to_string())?;
    if let Some(root) = root {
        schema.set_root(root);
    }
    let spec = schema.root().map_err(|e| e.to_string())?;

    // Schema hooks first, command-line hooks after
    let mut decls = schema.hook_decls().to_vec();
    for raw in extra_hooks {
        decls.push(parse_hook_arg(raw)?);
    }
    let registry = HandlerRegistry::with_builtins();
    let hooks: Hooks = registry.resolve(&decls).map_err(|e| e.to_string())?;
    tracing::debug!(root = spec.name(), hooks = hooks.len(), "schema loaded");

    let bytes = read_input(input)?;
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(&bytes[..]);
    let record = unmarshal(bytes, spec, &hooks).map_err(|e| e.to_string())?;

    let json = record.to_json();
    let output = if compact {
        serde_json::to_string(&json)
    } else {
        serde_json::to_string_pretty(&json)
    }
    .map_err(|e| format!("Failed to serialize record: {}", e))?;
    println!("{}", output);

    Ok(())
}

fn validate_schema(schema_path: &Path) -> Result<(), String> {
    println!("🔍 Validating schema {}...", schema_path.display());

    let schema = SchemaSet::load_from_file(schema_path).map_err(|e| e.to_string())?;
    println!("  ✓ {} structs resolved", schema.len());

    let registry = HandlerRegistry::with_builtins();
    let hooks = registry
        .resolve(schema.hook_decls())
        .map_err(|e| e.to_string())?;
    println!("  ✓ {} hooks resolved", hooks.len());

    let root = schema.root().map_err(|e| e.to_string())?;
    println!("  ✓ root struct: {}", root.name());

    for spec in schema.iter() {
        println!("  {}", spec.name());
        for field in spec.fields() {
            let key = if field.is_embedded() {
                "(embedded)"
            } else {
                field.source_key()
            };
            println!("    {:<16} {:<24} {}", field.name(), field.shape().to_string(), key);
        }
    }

    println!("✅ Schema is valid!");
    Ok(())
}

fn list_handlers() -> Result<(), String> {
    for name in HandlerRegistry::with_builtins().list_handlers() {
        println!("{}", name);
    }
    Ok(())
}
