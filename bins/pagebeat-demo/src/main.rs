use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use pagebeat::{
    ClickTarget, LogConfig, LogTransport, Pagebeat, Properties, ReporterConfig, SimulatedPage,
    Transport,
};

/// pagebeat demo: replays a browsing session through the pipeline
#[derive(Parser, Debug)]
#[command(name = "pagebeat-demo", version, about)]
struct Args {
    /// Delivery endpoint; events are logged locally when omitted
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Enable per-batch diagnostics
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    pagebeat::init_logging(&LogConfig {
        level: if args.debug { "debug".into() } else { "info".into() },
        ..LogConfig::default()
    });

    let page = Arc::new(SimulatedPage::new("https://shop.example.com/home"));

    let mut builder = Pagebeat::builder(page.clone()).debug(args.debug);
    builder = match &args.endpoint {
        Some(endpoint) => builder.reporter_config(ReporterConfig {
            endpoint: endpoint.clone(),
            debug: args.debug,
            ..ReporterConfig::default()
        }),
        None => builder.transport(Arc::new(LogTransport) as Arc<dyn Transport>),
    };
    let beat = builder.build()?;
    beat.start();

    tracing::info!("replaying a simulated session");

    beat.auto().handle_load();
    beat.auto().handle_show();

    page.scroll_to(600);
    beat.auto().handle_scroll();

    beat.auto().handle_click(
        &ClickTarget {
            id: "add-to-cart".into(),
            class_name: "btn btn-primary".into(),
            text: "Add to cart".into(),
        },
        412,
        388,
    );
    beat.track("cart_add", Properties::new().with("sku", "SKU-1042"));

    // Single-page route change: the settle re-check pairs the leave/view.
    page.navigate("https://shop.example.com/checkout");
    beat.auto().handle_history_change();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Tab hidden for a moment, then back.
    beat.auto().handle_visibility(false);
    tokio::time::sleep(Duration::from_millis(200)).await;
    beat.auto().handle_visibility(true);
    tokio::time::sleep(Duration::from_millis(300)).await;

    beat.track("checkout_start", Properties::new().with("cart_total", 49.90));

    beat.auto().handle_unload();
    beat.destroy();

    let reporter = beat.reporter();
    tracing::info!(
        tracked = reporter.total_tracked(),
        sent = reporter.total_sent(),
        dropped = reporter.total_dropped(),
        "session complete"
    );

    Ok(())
}
