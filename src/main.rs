use clap::{Args, Parser, Subcommand};
use log::{error, info};
use std::error::Error;
use std::io;
use std::path::PathBuf;

use chefbuddy::editor::{Applied, Command, Editor};
use chefbuddy::model::{MergedShoppingList, ShoppingList};
use chefbuddy::providers::ProviderFactory;
use chefbuddy::{load_config, merge_all, AppConfig, Consolidator, Pipeline, RecipeSource, Workspace};

#[derive(Parser)]
#[command(name = "chefbuddy")]
#[command(version)]
#[command(about = "Turn recipes into one aisle-sorted shopping list", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect recipes interactively and build the shopping list (default)
    Run,

    /// Extract and normalize recipes into the temp directory
    Import {
        /// Recipe URLs or file paths
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Edit the ingredients of a recipe file
    Edit(EditArgs),

    /// Merge every recipe file into one list sorted by aisle
    Merge {
        /// Directory holding the recipe files (defaults to the temp directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Sum and group a merged list into the final shopping list
    Consolidate {
        /// Merged list to consolidate (defaults to mergedlist.json in the temp directory)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Print a saved shopping list
    Show {
        /// Shopping list file (defaults to final_shopping_list.json in the temp directory)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Move the working files to the trash directory
    Archive,
}

#[derive(Args)]
struct EditArgs {
    /// Recipe JSON file
    file: PathBuf,

    /// Apply a single edit instead of starting a session
    #[command(subcommand)]
    action: Option<EditAction>,
}

#[derive(Subcommand)]
enum EditAction {
    /// Add an ingredient
    Add {
        #[arg(long)]
        ingredient: String,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        unit: Option<String>,
    },
    /// Change fields of an ingredient
    Modify {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        ingredient: Option<String>,
    },
    /// Remove an ingredient
    Delete {
        #[arg(long)]
        id: u32,
    },
    /// Scale every numeric quantity
    ModifyAll {
        #[arg(long)]
        multiplier: f64,
    },
}

impl From<EditAction> for Command {
    fn from(action: EditAction) -> Self {
        match action {
            EditAction::Add {
                ingredient,
                quantity,
                unit,
            } => Command::Add {
                name: ingredient,
                quantity,
                unit,
            },
            EditAction::Modify {
                id,
                quantity,
                unit,
                ingredient,
            } => Command::Modify {
                id,
                quantity,
                unit,
                name: ingredient,
            },
            EditAction::Delete { id } => Command::Delete { id },
            EditAction::ModifyAll { multiplier } => Command::ModifyAll { multiplier },
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let workspace = Workspace::new(&config.workspace);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let pipeline = Pipeline::new(&config)?;
            pipeline.run_interactive(io::stdin().lock(), io::stdout()).await?;
        }
        Commands::Import { sources } => import(&config, &sources).await?,
        Commands::Edit(args) => edit(args)?,
        Commands::Merge { dir } => {
            let dir = dir.unwrap_or_else(|| workspace.temp_dir().to_path_buf());
            let merged = merge_all(&dir)?;
            println!(
                "Merged {} ingredients into {}",
                merged.ingredients.len(),
                dir.join(chefbuddy::merge::MERGED_FILE_NAME).display()
            );
        }
        Commands::Consolidate { input } => {
            let input = input.unwrap_or_else(|| workspace.merged_path());
            let merged = MergedShoppingList::load(&input)?;
            let consolidator = Consolidator::new(ProviderFactory::default_provider(&config)?);
            let list = consolidator.consolidate(&merged).await?;

            workspace.ensure()?;
            let output = workspace.shopping_list_path();
            list.save(&output)?;
            print!("{}", list);
            println!("Saved shopping list to {}", output.display());
        }
        Commands::Show { input } => {
            let input = input.unwrap_or_else(|| workspace.shopping_list_path());
            let list = ShoppingList::load(&input)?;
            if list.is_empty() {
                println!("The shopping list is empty.");
            } else {
                print!("{}", list);
            }
        }
        Commands::Archive => {
            let moved = workspace.archive()?;
            println!(
                "Moved {} files to {}",
                moved,
                workspace.trash_dir().display()
            );
        }
    }

    Ok(())
}

/// Process each source in turn; one failing source does not stop the rest
async fn import(config: &AppConfig, sources: &[String]) -> Result<(), Box<dyn Error>> {
    let pipeline = Pipeline::new(config)?;
    pipeline.workspace().ensure()?;

    let mut imported = 0;
    for input in sources {
        let source = match RecipeSource::parse(input) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        match pipeline.process_recipe(&source).await {
            Ok(Some(_)) => imported += 1,
            Ok(None) => {}
            Err(e) => {
                error!("Failed to process {}: {}", source, e);
                eprintln!("Could not process {}: {}", source, e);
            }
        }
    }

    info!("Imported {} of {} recipes", imported, sources.len());
    println!("Imported {} of {} recipes.", imported, sources.len());
    Ok(())
}

fn edit(args: EditArgs) -> Result<(), Box<dyn Error>> {
    let mut editor = Editor::open(&args.file)?;
    let Some(action) = args.action else {
        editor.run_session(io::stdin().lock(), io::stdout())?;
        return Ok(());
    };

    let applied = editor.apply(Command::from(action))?;
    let mut stdout = io::stdout();
    editor.report(&applied, &mut stdout)?;
    if applied != Applied::Finished {
        editor.save()?;
    }
    editor.display(&mut stdout)?;
    Ok(())
}
