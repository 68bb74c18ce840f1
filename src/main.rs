//! smartcity CLI: natural-language questions over the mobility ontology.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use smartcity_nlq::catalog::{self, SUGGESTED_QUESTIONS, TEMPLATES};
use smartcity_nlq::config::AppConfig;
use smartcity_nlq::entities::{EntityService, NewEntity, NewLink, PropertyValue};
use smartcity_nlq::intent;
use smartcity_nlq::llm::OllamaClient;
use smartcity_nlq::pipeline::{QueryPipeline, SchemaMode};
use smartcity_nlq::sanitize;
use smartcity_nlq::store::{FusekiStore, MemoryStore, TripleStore};
use smartcity_nlq::validate::{self, ValidationVerdict};

#[derive(Parser)]
#[command(name = "smartcity", version, about = "Natural-language SPARQL over the smart city ontology")]
struct Cli {
    /// Path to a TOML config file (default: $SMARTCITY_CONFIG).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use an embedded store seeded from this Turtle file instead of Fuseki.
    #[arg(long, global = true)]
    memory: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question.
    Ask {
        question: String,
        /// Print the chosen query without executing it.
        #[arg(long)]
        dry_run: bool,
        /// Do not call the model; template misses use the fallback query.
        #[arg(long)]
        no_llm: bool,
    },

    /// Show the intent classification of a question.
    Classify { question: String },

    /// Sanitize raw model output read from stdin.
    Sanitize {
        /// Question the output answers, enabling the semantic repairs.
        #[arg(long)]
        question: Option<String>,
    },

    /// Validate a query (argument or stdin).
    Validate { query: Option<String> },

    /// List the query templates.
    Templates {
        /// Print the body of one template.
        #[arg(long)]
        show: Option<String>,
    },

    /// List suggested questions.
    Suggestions,

    /// Check the triple store and the model server.
    Health,

    /// Load a Turtle file into the store.
    Load { file: PathBuf },

    /// Manage ontology instances.
    Entity {
        #[command(subcommand)]
        action: EntityAction,
    },
}

#[derive(Subcommand)]
enum EntityAction {
    /// Create an instance.
    Create {
        id: String,
        class: String,
        /// Literal property as key=value (repeatable).
        #[arg(long = "prop", value_name = "KEY=VALUE")]
        properties: Vec<String>,
    },
    /// Link two instances through an object property.
    Link {
        subject: String,
        property: String,
        object: String,
    },
    /// List instances of a class and its subclasses.
    List { class: String },
    /// Delete an instance and every triple referencing it.
    Delete { id: String },
    /// Search instances by label.
    Search { text: String },
    /// Instance counts per class.
    Stats,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ask {
            question,
            dry_run,
            no_llm,
        } => {
            let store = open_store(cli.memory.as_ref(), &config)?;
            let pipeline = build_pipeline(store, &config, !no_llm);
            if dry_run {
                let outcome = pipeline.plan(&question);
                print_json(&outcome)?;
            } else {
                let answer = pipeline.ask(&question)?;
                print_json(&answer)?;
            }
        }

        Commands::Classify { question } => {
            let m = intent::classify(&question);
            println!("entity:       {}", m.entity.as_deref().unwrap_or("-"));
            println!("template:     {}", m.template_key.unwrap_or("-"));
            println!("predefined:   {}", m.is_predefined());
        }

        Commands::Sanitize { question } => {
            let raw = read_stdin()?;
            let query = match question {
                Some(q) => sanitize::sanitize_for_question(&q, &raw),
                None => sanitize::sanitize(&raw),
            };
            println!("{query}");
        }

        Commands::Validate { query } => {
            let query = match query {
                Some(q) => q,
                None => read_stdin()?,
            };
            match validate::validate(&query) {
                ValidationVerdict::Valid => println!("valid"),
                ValidationVerdict::Invalid(reason) => {
                    miette::bail!("invalid query: {reason}");
                }
            }
        }

        Commands::Templates { show } => match show {
            Some(key) => {
                let template = catalog::lookup(&key)
                    .ok_or_else(|| miette::miette!("no template named \"{key}\""))?;
                println!("{}", template.body);
            }
            None => {
                println!("Templates ({}):", TEMPLATES.len());
                for template in TEMPLATES {
                    let scope = if template.requires_entity() {
                        "entity"
                    } else {
                        "global"
                    };
                    println!("  {} [{scope}]", template.key);
                }
            }
        },

        Commands::Suggestions => {
            for question in SUGGESTED_QUESTIONS {
                println!("{question}");
            }
        }

        Commands::Health => {
            let store = open_store(cli.memory.as_ref(), &config)?;
            match store.ping() {
                Ok(()) => println!("store:  ok ({})", store.endpoint()),
                Err(e) => println!("store:  unavailable ({e})"),
            }
            if config.llm.enabled {
                let probe = OllamaClient::new(config.ollama()).probe();
                if probe.available {
                    println!(
                        "llm:    ok ({} models, {} {})",
                        probe.models.len(),
                        config.llm.model,
                        if probe.model_available { "present" } else { "missing" }
                    );
                } else {
                    println!(
                        "llm:    unavailable ({})",
                        probe.error.as_deref().unwrap_or("unknown error")
                    );
                }
            } else {
                println!("llm:    disabled");
            }
        }

        Commands::Load { file } => {
            let store = open_store(cli.memory.as_ref(), &config)?;
            let turtle = std::fs::read_to_string(&file).into_diagnostic()?;
            store.load_turtle(&turtle)?;
            println!("Loaded {} into {}", file.display(), store.endpoint());
        }

        Commands::Entity { action } => {
            let store = open_store(cli.memory.as_ref(), &config)?;
            let service = EntityService::new(store);

            match action {
                EntityAction::Create {
                    id,
                    class,
                    properties,
                } => {
                    let mut entity = NewEntity::new(id, class);
                    for prop in &properties {
                        let (key, value) = parse_property(prop)?;
                        entity = entity.with(key, value);
                    }
                    let class = service.create(&entity)?;
                    println!("Created {} ({class})", entity.id);
                }
                EntityAction::Link {
                    subject,
                    property,
                    object,
                } => {
                    service.link(&NewLink {
                        subject: subject.clone(),
                        property: property.clone(),
                        object: object.clone(),
                    })?;
                    println!("Linked {subject} -{property}-> {object}");
                }
                EntityAction::List { class } => {
                    let records = service.list(&class)?;
                    print_json(&records)?;
                }
                EntityAction::Delete { id } => {
                    service.delete(&id)?;
                    println!("Deleted {id}");
                }
                EntityAction::Search { text } => {
                    let hits = service.search(&text)?;
                    print_json(&hits)?;
                }
                EntityAction::Stats => {
                    for count in service.class_counts()? {
                        println!("  {:<28} {}", count.class, count.count);
                    }
                }
            }
        }
    }

    Ok(())
}

fn open_store(memory: Option<&PathBuf>, config: &AppConfig) -> Result<Arc<dyn TripleStore>> {
    Ok(match memory {
        Some(path) => Arc::new(MemoryStore::from_turtle_file(path)?),
        None => Arc::new(FusekiStore::new(config.fuseki())),
    })
}

fn build_pipeline(store: Arc<dyn TripleStore>, config: &AppConfig, llm: bool) -> QueryPipeline {
    let mut pipeline = QueryPipeline::new(store);
    if llm && config.llm.enabled {
        pipeline = pipeline.with_generator(Arc::new(OllamaClient::new(config.ollama())));
    }
    if config.llm.discover_schema {
        pipeline = pipeline.with_schema(SchemaMode::Discover);
    }
    pipeline
}

/// Parse `key=value`, typing the value as integer, decimal, boolean or string.
fn parse_property(raw: &str) -> Result<(String, PropertyValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| miette::miette!("expected KEY=VALUE, got \"{raw}\""))?;
    let value = if let Ok(n) = value.parse::<i64>() {
        PropertyValue::Integer(n)
    } else if let Some(f) = value.parse::<f64>().ok().filter(|f| f.is_finite()) {
        PropertyValue::Float(f)
    } else if let Ok(b) = value.parse::<bool>() {
        PropertyValue::Bool(b)
    } else {
        PropertyValue::String(value.to_string())
    };
    Ok((key.trim().to_string(), value))
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
    Ok(buf)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
