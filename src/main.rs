//! Laku CLI
//!
//! Command-line front end for the sales dashboard:
//! - Render the sales table and summary
//! - Show or watch the summary panel
//! - Talk to the sales assistant
//! - Record and delete sales and inventory items
//! - Show stock levels
//! - Generate a config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use laku::analytics::ChartSeries;
use laku::chat::RefreshOp;
use laku::config::{generate_default_config, Config, LoggingConfig, SourceKind};
use laku::controller::{DashboardController, WriteOutcome};
use laku::filter::TimeWindow;
use laku::source::{NewItem, NewSale, SalesSource};
use laku::view::{DashboardSummary, SalesPage, SalesRender, SummaryMode};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "laku")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sales dashboard for a small shop")]
#[command(long_about = "Laku shows what sold, when and for how much.\nFilter sales by period or search text, follow the summary, and record sales by chatting with the assistant.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Sales backend URL (overrides the config file)
    #[arg(long, global = true, conflicts_with = "file")]
    pub api_url: Option<String>,

    /// Read sales from a JSON or CSV snapshot instead of the backend
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the sales table with the summary panel
    Dashboard {
        /// Time window (all, today, week, month, year)
        #[arg(short, long)]
        window: Option<TimeWindow>,
        /// Search item names and sale ids
        #[arg(short, long, default_value = "")]
        query: String,
        /// Summary source (server, snapshot, filtered)
        #[arg(long)]
        summary_mode: Option<SummaryMode>,
    },

    /// Show the summary panel only
    Summary {
        /// Summary source (server, snapshot, filtered)
        #[arg(long)]
        summary_mode: Option<SummaryMode>,
    },

    /// Refresh and print the summary periodically
    Watch {
        /// Refresh interval in seconds (default: from config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Send a message to the sales assistant
    Chat {
        /// Message text
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Record or delete sales
    Sale {
        #[command(subcommand)]
        action: SaleCommand,
    },

    /// Add or delete inventory items
    Item {
        #[command(subcommand)]
        action: ItemCommand,
    },

    /// Show stock levels for items still in stock
    Stock,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SaleCommand {
    /// Record a sale (the item must be in the inventory)
    Add {
        /// Item name
        item: String,
        /// Units sold
        quantity: u32,
        /// Unit price
        price: Decimal,
    },

    /// Delete a sale by id
    Delete {
        id: u64,
    },
}

#[derive(Subcommand)]
pub enum ItemCommand {
    /// Add an item to the inventory
    Add {
        /// Item name
        name: String,
        /// Unit price
        price: Decimal,
        /// Units in stock
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Delete an inventory item by id
    Delete {
        id: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.source.kind = SourceKind::Http;
        config.source.base_url = url.clone();
    }
    if let Some(path) = &cli.file {
        config.source.kind = SourceKind::File;
        config.source.sales_file = Some(path.clone());
    }

    init_logging(&config.logging)?;

    match cli.command {
        Commands::Dashboard {
            window,
            query,
            summary_mode,
        } => {
            let mut dashboard = build_dashboard(&config, summary_mode)?;
            dashboard.set_window(window.unwrap_or(config.view.default_window));
            dashboard.set_query(query);
            refresh_all(&mut dashboard).await;

            let render = dashboard.render_now();
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&render)?),
                OutputFormat::Table => print_dashboard(&dashboard, &render),
            }
        }

        Commands::Summary { summary_mode } => {
            let mut dashboard = build_dashboard(&config, summary_mode)?;
            dashboard.set_window(config.view.default_window);
            refresh_all(&mut dashboard).await;

            let render = dashboard.render_now();
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&render.summary)?)
                }
                OutputFormat::Table => print_summary(&render.summary),
            }
        }

        Commands::Watch { interval } => {
            let secs = interval.unwrap_or(config.view.refresh_interval_secs).max(1);
            let mut dashboard = build_dashboard(&config, None)?;
            dashboard.set_window(config.view.default_window);
            refresh_all(&mut dashboard).await;

            tracing::info!("Refreshing every {}s, Ctrl-C to stop", secs);
            let mut ticker = tokio::time::interval(Duration::from_secs(secs));

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        watch_tick(&mut dashboard).await;
                        let render = dashboard.render_now();
                        match cli.format {
                            OutputFormat::Json => println!("{}", serde_json::to_string(&render.summary)?),
                            OutputFormat::Table => {
                                println!("--- {} ---", chrono::Local::now().format("%H:%M:%S"));
                                print_summary(&render.summary);
                            }
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Stopping");
                        break;
                    }
                }
            }
        }

        Commands::Chat { message } => {
            let mut dashboard = build_dashboard(&config, None)?;
            let outcome = dashboard.chat(&message.join(" ")).await;

            for text in &outcome.messages {
                println!("{}", text);
            }
            if let Some(action) = &outcome.action {
                let performed: Vec<String> =
                    outcome.report.performed.iter().map(|op| op.to_string()).collect();
                tracing::info!(%action, "refreshed: {}", performed.join(", "));
            }
            for (op, error) in &outcome.report.failed {
                eprintln!("Refresh {} failed: {}", op, error);
            }
        }

        Commands::Sale { action } => {
            let mut dashboard = build_dashboard(&config, None)?;
            let outcome = match action {
                SaleCommand::Add {
                    item,
                    quantity,
                    price,
                } => dashboard.add_sale(&NewSale::new(item, quantity, price)).await?,
                SaleCommand::Delete { id } => dashboard.delete_sale(id).await?,
            };
            print_write(&outcome, cli.format)?;
        }

        Commands::Item { action } => {
            let mut dashboard = build_dashboard(&config, None)?;
            let outcome = match action {
                ItemCommand::Add {
                    name,
                    price,
                    quantity,
                } => {
                    let item = NewItem::new(name, price).with_quantity(quantity);
                    dashboard.add_item(&item).await?
                }
                ItemCommand::Delete { id } => dashboard.delete_item(id).await?,
            };
            print_write(&outcome, cli.format)?;
        }

        Commands::Stock => {
            let mut dashboard = build_dashboard(&config, None)?;
            dashboard
                .refresh(RefreshOp::ReloadStockChart)
                .await
                .context("Failed to load stock levels")?;

            if let Some(chart) = dashboard.stock_chart() {
                match cli.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(chart)?),
                    OutputFormat::Table if chart.is_empty() => println!("Nothing in stock"),
                    OutputFormat::Table => print_chart(chart, false),
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("laku={}", config.level)));
    let json = config.format.eq_ignore_ascii_case("json");

    let file = match &config.file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?,
        ),
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match (json, file) {
        (true, Some(file)) => registry
            .with(fmt::layer().json().with_writer(std::sync::Mutex::new(file)))
            .init(),
        (true, None) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (false, Some(file)) => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init(),
        (false, None) => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

fn build_dashboard(
    config: &Config,
    summary_mode: Option<SummaryMode>,
) -> anyhow::Result<DashboardController<Box<dyn SalesSource>>> {
    let source = config.source.build()?;
    let mut view = config.view.build();
    if let Some(mode) = summary_mode {
        view = view.with_summary_mode(mode);
    }

    tracing::debug!(source = source.name(), mode = %view.summary_mode(), "dashboard ready");
    Ok(DashboardController::new(source).with_view(view))
}

async fn refresh_all<S: SalesSource>(dashboard: &mut DashboardController<S>) {
    let report = dashboard.refresh_all().await;
    for (op, error) in &report.failed {
        eprintln!("Could not {}: {}", op, error);
    }
}

/// Periodic refresh: the summary always, the sales too when the summary is computed from them
async fn watch_tick<S: SalesSource>(dashboard: &mut DashboardController<S>) {
    let ops: &[RefreshOp] = match dashboard.view().summary_mode() {
        SummaryMode::Server => &[RefreshOp::ReloadAnalytics],
        SummaryMode::Snapshot | SummaryMode::Filtered => &[RefreshOp::ReloadSales],
    };

    for op in ops {
        if let Err(e) = dashboard.refresh(*op).await {
            tracing::warn!(%op, "refresh failed: {}", e);
        }
    }
}

fn print_dashboard<S: SalesSource>(dashboard: &DashboardController<S>, render: &SalesRender) {
    let filter = dashboard.filter();
    if filter.query.trim().is_empty() {
        println!("Sales ({})", filter.window);
    } else {
        println!("Sales ({}, matching \"{}\")", filter.window, filter.query.trim());
    }
    println!();
    print_page(&render.page);
    println!();
    print_summary(&render.summary);

    let out_of_stock: Vec<&str> = dashboard
        .items()
        .iter()
        .filter(|item| item.is_out_of_stock())
        .map(|item| item.item_name.as_str())
        .collect();
    if !out_of_stock.is_empty() {
        println!();
        println!("Out of stock: {}", out_of_stock.join(", "));
    }
    if let Some(chart) = dashboard.stock_chart() {
        print_chart(chart, false);
    }
}

fn print_write(outcome: &WriteOutcome, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome.receipt)?),
        OutputFormat::Table => println!("{}", outcome.receipt.message.as_deref().unwrap_or("Done")),
    }
    for (op, error) in &outcome.report.failed {
        eprintln!("Refresh {} failed: {}", op, error);
    }
    Ok(())
}

fn print_page(page: &SalesPage) {
    if let Some(message) = &page.empty_message {
        println!("{}", message);
        return;
    }

    println!(
        "{:<6} {:<20} {:>5} {:>10} {:>11}  {}",
        "ID", "Item", "Qty", "Price", "Total", "Date"
    );
    println!("{}", "-".repeat(82));

    for row in &page.rows {
        println!(
            "{:<6} {:<20} {:>5} {:>10} {:>11}  {}",
            row.id,
            truncate(&row.item_name, 20),
            row.quantity,
            row.price_label,
            row.total_label,
            row.date_label
        );
    }

    if let Some(note) = &page.note {
        println!();
        println!("{}", note);
    }
}

fn print_summary(summary: &DashboardSummary) {
    let cards = &summary.cards;
    println!("Summary ({})", summary.mode);
    println!("  {:<18} {}", "Total Revenue:", cards.total_revenue);
    println!("  {:<18} {}", "Total Sales:", cards.total_sales);
    println!("  {:<18} {}", "Avg Order Value:", cards.avg_order_value);
    println!("  {:<18} {} ({})", "Top Item:", cards.top_item, cards.top_item_units);
    if let Some(hour) = summary.analytics.peak_hour() {
        println!("  {:<18} {}:00", "Peak Hour:", hour);
    }

    print_chart(&summary.hourly_chart, true);
    print_chart(&summary.top_items_chart, false);

    if !summary.analytics.recent_sales.is_empty() {
        println!();
        println!("Recent Sales");
        for sale in &summary.analytics.recent_sales {
            println!(
                "  {}  {} x{}  {}",
                sale.time,
                sale.item_name,
                sale.quantity,
                laku::view::format::format_currency(sale.total)
            );
        }
    }
}

fn print_chart(chart: &ChartSeries, skip_zero: bool) {
    const WIDTH: u64 = 30;

    let max = chart.max_value();
    if max == 0 {
        return;
    }

    println!();
    println!("{}", chart.label);
    for (label, value) in chart.points() {
        if skip_zero && value == 0 {
            continue;
        }
        let bar = (value * WIDTH).div_ceil(max);
        println!(
            "  {:>12} {} {}",
            truncate(label, 12),
            "#".repeat(bar as usize),
            value
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}
