mod app;
mod data;
mod engine;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the relationship network JSON document.
    #[arg(long, default_value = "network.json")]
    network: String,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "rhiz",
        options,
        Box::new(move |cc| Ok(Box::new(app::RhizApp::new(cc, args.network.clone())))),
    )
}
