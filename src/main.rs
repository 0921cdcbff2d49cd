use anyhow::Context;
use clap::Parser as CliParser;
use entity_search::lexer::Lexer;
use entity_search::parser::{Command, Parser, SearchCommand};
use entity_search::{Dialect, EntityQuery, SchemaRegistry, SearchOptions};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};

const HELP: &str = r#"Commands:
  <entity> <field>[,<field>...] <term>[,<term>...] [key=value ...]
      options: caseSensitive=true|false  matchType=contains|exact|startsWith|endsWith
               boolean=or|and  operator=">"|">="|"<"|"<="|"!="|eq
               page=N perPage=N
      e.g.  posts title,user.name "launch day" matchType=exact
            careers title,location remote,berlin boolean=and
  entities   list searchable entities and fields
  help       show this message
  quit       leave"#;

#[derive(CliParser)]
#[command(name = "entity-search", about = "Compile attribute searches to SQL")]
struct Cli {
    /// JSON schema file describing searchable entities.
    #[arg(long, default_value = "search_schema.json")]
    schema: PathBuf,

    /// SQL dialect used to render queries (postgres, mysql, sqlite).
    #[arg(long, default_value = "postgres")]
    dialect: Dialect,

    /// Run a single command and exit instead of starting the console.
    #[arg(long)]
    query: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    debug: bool,
}

/// Loads the schema file, falling back to the built-in CMS schema.
fn load_registry(path: &Path) -> SchemaRegistry {
    match SchemaRegistry::from_json_file(path) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to built-in CMS schema");
            SchemaRegistry::cms_default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let registry = load_registry(&cli.schema);

    if let Some(line) = cli.query {
        return match run_line(&registry, cli.dialect, &line) {
            Ok(_) => Ok(()),
            Err(e) => Err(e.context(format!("command failed: {}", line))),
        };
    }

    repl(&registry, cli.dialect)
}

fn repl(registry: &SchemaRegistry, dialect: Dialect) -> anyhow::Result<()> {
    println!("--- entity-search ({}) --- type 'help' for commands", dialect);
    let mut editor = DefaultEditor::new().context("cannot start line editor")?;

    loop {
        match editor.readline("search> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str())?;
                match run_line(registry, dialect, &line) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => println!("✗ {:#}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Runs one console line. Returns `true` when the console should exit.
fn run_line(registry: &SchemaRegistry, dialect: Dialect, line: &str) -> anyhow::Result<bool> {
    let tokens: Vec<_> = Lexer::new(line).collect();
    let command = Parser::new(&tokens).parse()?;

    match command {
        Command::Help => println!("{}", HELP),
        Command::Entities => print_entities(registry),
        Command::Quit => return Ok(true),
        Command::Search(search) => println!("{}", compile_search(registry, dialect, search)?),
    }
    Ok(false)
}

fn compile_search(
    registry: &SchemaRegistry,
    dialect: Dialect,
    command: SearchCommand,
) -> anyhow::Result<String> {
    let schema = registry
        .entity(&command.entity)
        .with_context(|| format!("unknown entity '{}' (try 'entities')", command.entity))?;
    let options = SearchOptions::from_pairs(command.options)?;

    let mut query = EntityQuery::for_dialect(schema, dialect).search(command.fields, command.terms, options)?;
    if command.page.is_some() || command.per_page.is_some() {
        query = query.paginate(command.page.unwrap_or(1), command.per_page.unwrap_or(15));
    }
    Ok(query.to_sql())
}

fn print_entities(registry: &SchemaRegistry) {
    for entity in registry.entities() {
        println!("{} ({})", entity.name, entity.table);
        println!("  columns: {}", entity.columns.join(", "));
        for (name, relation) in &entity.relations {
            let columns: Vec<_> = relation
                .columns
                .iter()
                .map(|c| format!("{}.{}", name, c))
                .collect();
            println!("  {} -> {}: {}", name, relation.table, columns.join(", "));
        }
    }
}
