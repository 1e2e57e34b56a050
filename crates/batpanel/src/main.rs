//! batpanel - a battery applet for Wayland panels
//!
//! This is the main entry point for the applet and its `status` subcommand.

mod applet;
mod services;
pub mod styles;
mod widgets;

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow, glib};
use tracing::{debug, info, warn};

use batpanel_core::battery::simulated::{SimulatedCapability, SimulatedHandle};
use batpanel_core::battery::{
    BatteryCapability, BatteryDisplay, BatteryStatusAdapter, BatteryUpdate,
};
use batpanel_core::settings::{
    FileSettingsStore, MemorySettingsStore, PercentagePreference, SettingsStore,
};
use batpanel_core::{Config, logging};

use crate::services::upower::UPowerCapability;
use crate::widgets::BatteryWidget;

/// How long `batpanel status` waits for the battery to resolve.
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Seconds between simulated battery ticks.
const SIMULATE_INTERVAL_SECS: u32 = 2;

/// Level change per simulated tick.
const SIMULATE_STEP: f64 = 0.01;

/// batpanel - a battery applet for Wayland panels
#[derive(Parser, Debug)]
#[command(name = "batpanel", version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (uses XDG lookup if not specified)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print example configuration and exit
    #[arg(long)]
    print_example_config: bool,

    /// Validate configuration and exit (returns non-zero on errors)
    #[arg(long)]
    check_config: bool,

    /// Keep preferences in memory only
    #[arg(long)]
    no_persist: bool,

    /// Use a simulated battery instead of UPower
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current battery status once and exit
    Status {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose);

    // Subcommands don't need config or a display
    if let Some(Command::Status { json }) = args.command {
        return match run_status(make_capability(args.simulate), json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    // --print-example-config doesn't depend on any config file
    if args.print_example_config {
        print!("{}", batpanel_core::config::DEFAULT_CONFIG_TOML);
        return ExitCode::SUCCESS;
    }

    // If --config is specified, it must exist and be valid (no fallback)
    let load_result = match Config::find_and_load(args.config.as_deref()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref source) = load_result.source {
        info!("Loaded configuration from {:?}", source);
    } else if load_result.used_defaults {
        warn!("Using default configuration (no config file found)");
    }

    let config = load_result.config;

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    debug!("Configuration validated successfully");

    if args.check_config {
        if let Some(ref source) = load_result.source {
            println!("Configuration valid: {}", source.display());
        } else {
            println!("Configuration valid (using defaults)");
        }
        return ExitCode::SUCCESS;
    }

    debug!("{}", config.summary());

    let store = settings_store(&config, args.no_persist);
    run_gtk_app(config, store, args.simulate)
}

/// Pick the battery backend.
fn make_capability(simulate: bool) -> Rc<dyn BatteryCapability> {
    if simulate {
        info!("Using simulated battery");
        let handle = SimulatedHandle::new(0.62, false, f64::INFINITY, 5400.0);
        start_simulation(handle.clone());
        SimulatedCapability::with_handle(handle)
    } else {
        UPowerCapability::new()
    }
}

/// Drive the simulated battery from the main loop.
fn start_simulation(handle: Rc<SimulatedHandle>) {
    glib::timeout_add_seconds_local(SIMULATE_INTERVAL_SECS, move || {
        handle.tick(SIMULATE_STEP);
        glib::ControlFlow::Continue
    });
}

/// Choose where the "show percentage" preference lives.
fn settings_store(config: &Config, no_persist: bool) -> Rc<dyn SettingsStore> {
    if no_persist {
        debug!("Preferences will not be persisted");
        return Rc::new(MemorySettingsStore::new());
    }

    match &config.settings.path {
        Some(path) => Rc::new(FileSettingsStore::open(path)),
        None => match FileSettingsStore::open_default() {
            Ok(store) => {
                debug!("Preferences file: {}", store.path().display());
                Rc::new(store)
            }
            Err(e) => {
                warn!("{}; preferences will not be persisted", e);
                Rc::new(MemorySettingsStore::new())
            }
        },
    }
}

/// Resolve the battery once and print it.
fn run_status(capability: Rc<dyn BatteryCapability>, json: bool) -> anyhow::Result<()> {
    let main_loop = glib::MainLoop::new(None, false);
    let result: Rc<Cell<Option<BatteryUpdate>>> = Rc::new(Cell::new(None));

    let adapter = BatteryStatusAdapter::new(capability);
    {
        let main_loop = main_loop.clone();
        let result = result.clone();
        adapter.observe(move |update: &BatteryUpdate| {
            if result.get().is_none() {
                result.set(Some(*update));
                main_loop.quit();
            }
        });
    }
    adapter.start();

    // Backends that answer synchronously have already reported.
    if result.get().is_none() {
        let main_loop_for_timeout = main_loop.clone();
        glib::timeout_add_local_once(STATUS_TIMEOUT, move || {
            main_loop_for_timeout.quit();
        });
        main_loop.run();
    }
    adapter.stop();

    let Some(update) = result.get() else {
        bail!(
            "timed out after {}s waiting for battery information",
            STATUS_TIMEOUT.as_secs()
        );
    };

    if json {
        let value = match update {
            Some(snapshot) => {
                let display = BatteryDisplay::from_snapshot(&snapshot);
                serde_json::json!({
                    "supported": true,
                    "percentage": display.percentage,
                    "status": display.status,
                    "tier": display.tier.css_class(),
                    "snapshot": snapshot,
                })
            }
            None => serde_json::json!({ "supported": false }),
        };
        let text = serde_json::to_string_pretty(&value).context("failed to encode status")?;
        println!("{}", text);
    } else {
        match update {
            Some(snapshot) => println!("{}", BatteryDisplay::from_snapshot(&snapshot).summary()),
            None => println!("unsupported"),
        }
    }

    Ok(())
}

/// Everything that must outlive the activate handler.
struct AppletState {
    window: ApplicationWindow,
    widget: BatteryWidget,
}

fn run_gtk_app(config: Config, store: Rc<dyn SettingsStore>, simulate: bool) -> ExitCode {
    // SAFETY: called before GTK initialization, no other threads exist yet.
    if std::env::var("GDK_BACKEND").is_err() {
        unsafe {
            std::env::set_var("GDK_BACKEND", "wayland");
        }
    }

    let app = Application::builder()
        .application_id("io.github.batpanel")
        .flags(gtk4::gio::ApplicationFlags::NON_UNIQUE)
        .build();

    let state: Rc<RefCell<Option<AppletState>>> = Rc::new(RefCell::new(None));

    {
        let state = state.clone();
        app.connect_activate(move |app| {
            info!("GTK application activated");

            if let Some(existing) = state.borrow().as_ref() {
                existing.window.present();
                return;
            }

            applet::load_css(&config);

            let preference = Rc::new(PercentagePreference::load(store.clone()));
            let widget = BatteryWidget::new(
                make_capability(simulate),
                preference,
                applet::popover_position(&config),
            );

            let window =
                applet::create_applet_window(app, &config, widget.widget().upcast_ref());
            window.present();

            *state.borrow_mut() = Some(AppletState { window, widget });
        });
    }

    app.connect_startup(|_| {
        info!("GTK application starting up");
    });

    {
        let state = state.clone();
        app.connect_shutdown(move |_| {
            info!("GTK application shutting down");
            if let Some(applet) = state.borrow_mut().take() {
                applet.widget.unmount();
            }
        });
    }

    // clap already consumed our arguments
    let exit = app.run_with_args::<&str>(&[]);
    if exit == glib::ExitCode::SUCCESS {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
