//! Shopping catalog command line.
//!
//! Stands in for the app screens: every subcommand opens the local
//! database, calls the repository or the pagers, and prints the result.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};

use shopping_catalog::state::data::CartProduct;
use shopping_catalog::{
    logging, CartPager, CatalogSeed, Config, Database, Product, ProductFeed, ProductId,
    ShoppingRepository, SqliteRepository, StorageError,
};

#[derive(Debug, Parser)]
#[command(name = "shopping", about = "Browse the catalog and manage the cart", long_about = None)]
struct Cli {
    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, global = true, env = "SHOPPING_DB")]
    db: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "SHOPPING_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load the catalog fixture; existing products are kept
    Seed {
        /// JSON catalog to load instead of the bundled one
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List products, one batch per "load more"
    Products {
        /// Show batches up to this 1-based page
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one product and record it as recently viewed
    Show { id: i64 },
    /// Recently viewed products, newest first
    Recent,
    /// Drop a product from the recently viewed list
    Forget { id: i64 },
    Cart(CartCommand),
}

#[derive(Debug, Args)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show one page of the cart
    List {
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Add {
        id: i64,
        #[arg(long, default_value_t = 1)]
        count: u32,
        /// Add without selecting for checkout
        #[arg(long)]
        unselected: bool,
    },
    Remove { id: i64 },
    /// Set the quantity of a cart entry
    Count { id: i64, count: u32 },
    /// Select or deselect a cart entry
    Select {
        id: i64,
        #[arg(action = clap::ArgAction::Set)]
        selected: bool,
    },
    /// Selected entries and their total
    Selected,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = logging::init(&cli.log_level) {
        eprintln!("failed to initialise logging: {err}");
    }

    if let Err(err) = run(cli) {
        error!(error = ?err, "command failed");
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), StorageError> {
    let mut config = match cli.db {
        Some(path) => Config::with_db_path(path),
        None => Config::new()?,
    };
    config.log_level = cli.log_level;
    debug!(?config, "resolved configuration");

    let repository = SqliteRepository::new(Database::open(&config.db_path)?);

    match cli.command {
        Commands::Seed { file } => {
            let seed = match file {
                Some(path) => CatalogSeed::from_file(&path)?,
                None => CatalogSeed::bundled()?,
            };
            let report = repository.seed_catalog(&seed.products)?;
            println!(
                "Seeded catalog: {} added, {} already present.",
                report.inserted, report.skipped
            );
        }
        Commands::Products { page } => {
            let recent = repository.list_recently_viewed()?;
            if !recent.is_empty() {
                println!("Recently viewed:");
                for product in &recent {
                    print_product(product);
                }
                println!();
            }

            let mut feed = ProductFeed::new(config.product_batch_size)?;
            for _ in 0..page {
                let products = feed.load_more(&repository)?;
                if products.is_empty() {
                    break;
                }
                for product in &products {
                    print_product(product);
                }
            }
            println!("{} of {} products shown.", feed.loaded(), repository.product_count()?);
        }
        Commands::Show { id } => {
            let product = repository.get_product(ProductId(id))?;
            repository.record_view(product.id)?;
            print_product(&product);
        }
        Commands::Recent => {
            for product in repository.list_recently_viewed()? {
                print_product(&product);
            }
        }
        Commands::Forget { id } => repository.remove_from_recently_viewed(ProductId(id))?,
        Commands::Cart(CartCommand { command }) => run_cart(&repository, &config, command)?,
    }

    repository.into_database().close()
}

fn run_cart(
    repository: &SqliteRepository,
    config: &Config,
    command: CartSubcommand,
) -> Result<(), StorageError> {
    match command {
        CartSubcommand::List { page } => {
            let mut pager = CartPager::load(repository, config.cart_page_size)?;
            for _ in 1..page {
                if !pager.state().has_next {
                    break;
                }
                pager.to_next_page(repository)?;
            }

            for item in pager.items() {
                print_cart_product(item);
            }

            let state = pager.state();
            println!(
                "Page {} of {}{}{}",
                state.display_number,
                state.page_count,
                if state.has_previous { "  [< previous]" } else { "" },
                if state.has_next { "  [next >]" } else { "" },
            );
        }
        CartSubcommand::Add {
            id,
            count,
            unselected,
        } => repository.add_to_cart(ProductId(id), count, !unselected)?,
        CartSubcommand::Remove { id } => repository.remove_from_cart(ProductId(id))?,
        CartSubcommand::Count { id, count } => repository.set_cart_count(ProductId(id), count)?,
        CartSubcommand::Select { id, selected } => {
            repository.set_cart_selected(ProductId(id), selected)?;
        }
        CartSubcommand::Selected => {
            let selected = repository.list_selected_cart_products()?;
            for item in &selected {
                print_cart_product(item);
            }
            let total: u64 = selected.iter().map(CartProduct::total_price).sum();
            println!("{} selected, total {}", selected.len(), total);
        }
    }

    Ok(())
}

fn print_product(product: &Product) {
    println!("#{:<4} {:<24} {:>8}", product.id, product.name, product.price);
}

fn print_cart_product(item: &CartProduct) {
    println!(
        "[{}] #{:<4} {:<24} x{:<3} {:>8}",
        if item.is_selected { "x" } else { " " },
        item.product.id,
        item.product.name,
        item.count,
        item.total_price()
    );
}
