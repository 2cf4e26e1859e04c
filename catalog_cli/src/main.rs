use std::{path::PathBuf, rc::Rc};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use catalog_core::{
    config::DEFAULT_CONFIG_PATH, render::RenderedView, CategorySchema, Config, HttpCatalogApi,
    ListingMode, ProductId, ProductListView, SessionStore, ToggleOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog", version, about)]
struct Cli {
    /// Config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the known categories
    Categories,
    /// Show the products of a category
    List {
        category: String,
        /// Show only the first few products, with a link to the rest
        #[arg(long)]
        preview: bool,
    },
    /// Add or remove a product from your favourites
    Toggle { category: String, product: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config =
        Config::load(&cli.config).with_context(|| format!("loading {}", cli.config.display()))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    runtime.block_on(run(config, cli.command))
}

async fn run(config: Config, command: Command) -> anyhow::Result<()> {
    let find = |key: &str| -> anyhow::Result<CategorySchema> {
        config.category(key).with_context(|| format!("unknown category {key}"))
    };

    match command {
        Command::Categories => {
            for category in config.all_categories() {
                println!("{:<12} {}", category.key, category.title);
            }
            Ok(())
        }
        Command::List { category, preview } => {
            let mode = if preview { ListingMode::Preview } else { ListingMode::Full };
            let view = mount(&config, find(&category)?, mode)?;
            view.activate().await;
            println!("{}", view.render());
            Ok(())
        }
        Command::Toggle { category, product } => {
            let product = ProductId::new(product);
            let view = mount(&config, find(&category)?, ListingMode::Full)?;
            view.activate().await;
            if let RenderedView::Error(message) = view.render() {
                bail!("unable to list {category}: {message}");
            }

            let outcome = view.toggle_favourite(&product).await;
            let summary = match outcome {
                ToggleOutcome::Favourited => "added to favourites",
                ToggleOutcome::Unfavourited => "removed from favourites",
                ToggleOutcome::Failed => "favourites could not be updated",
                ToggleOutcome::Ignored | ToggleOutcome::Abandoned => "nothing changed",
            };
            println!("{product}: {summary}");
            match view.render().cards().iter().find(|card| card.id == product) {
                Some(card) => println!("\n{card}"),
                None => println!("{product} is not listed under {category}"),
            }
            Ok(())
        }
    }
}

fn mount(
    config: &Config,
    category: CategorySchema,
    mode: ListingMode,
) -> anyhow::Result<ProductListView<HttpCatalogApi>> {
    let api = HttpCatalogApi::new(config.api_url()?, config.timeout())?;
    let user = SessionStore::new(&config.session_file).load_user();
    Ok(ProductListView::new(Rc::new(api), category, user, mode))
}
