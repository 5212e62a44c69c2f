// crates/driver/src/main.rs
mod input;
mod listener;
mod pages;
mod router;
mod settings;
mod transport;

use anyhow::Context;
use clap::Parser;
use config::Config;
use launchpad_library::color;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::listener::{Listener, StopHandle};
use crate::pages::monitor::MonitorPage;
use crate::pages::paint::PaintSurface;
use crate::pages::surface::SurfacePage;
use crate::router::{NavControls, PageRouter};
use crate::settings::Settings;
use crate::transport::midi::MidiTransport;
use crate::transport::sim;

#[derive(Parser, Debug)]
#[clap(
    name = "Launchpad Userspace MIDI driver",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
)]
struct Args {
    #[clap(short, long, help = "Config file (see example_config.toml)")]
    config: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut cfg = Config::builder();
    if let Some(config_fn) = args.config {
        cfg = cfg.add_source(config::File::with_name(config_fn.as_str()));
    }
    let cfg = cfg.build().context("can't read settings")?;
    let settings: Settings = cfg.try_deserialize().context("can't parse settings")?;
    settings.validate().context("invalid settings")?;

    info!("launchpad driver starting");

    let mut router = PageRouter::new(NavControls {
        previous: settings.nav_previous,
        next: settings.nav_next,
    });
    router.add_page(Box::new(SurfacePage::new(PaintSurface::new(
        color::RED_FULL,
        color::OFF,
    ))));
    router.add_page(Box::new(SurfacePage::new(PaintSurface::new(
        color::GREEN_FULL,
        color::AMBER_LOW,
    ))));
    router.add_page(Box::new(MonitorPage::new()));

    let stop = StopHandle::new();

    // The hardware transport must stay alive for the whole run; dropping
    // it closes the device.
    let (raw_rx, _hardware) = if settings.use_sim_pad {
        info!("using the terminal simulator to emulate a Launchpad");
        let (sender, raw_rx) =
            sim::start(&settings, stop.clone()).context("could not start the simulator")?;
        router.set_interface(sender);
        (raw_rx, None)
    } else {
        info!("using a MIDI connection to a real Launchpad");
        let (transport, raw_rx) = MidiTransport::connect(&settings)
            .context("could not connect to the Launchpad (is it plugged in?)")?;
        router.set_interface(transport.sender());
        (raw_rx, Some(transport))
    };

    let listener = Listener::new(raw_rx, router, stop.clone());
    let handle = listener
        .spawn()
        .context("failed to spawn the listener thread")?;

    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.stop())
            .context("failed to install the Ctrl-C handler")?;
    }

    match handle.join() {
        Ok(result) => result.context("listener terminated")?,
        Err(_) => anyhow::bail!("listener thread panicked"),
    }

    info!("launchpad driver stopped");
    Ok(())
}
