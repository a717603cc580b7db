use anyhow::{Context, Result};
use clap::Parser;
use std::{io, path::PathBuf, str::FromStr, sync::Arc};

use midi_app_controller::{
    actions::ConsoleApp,
    config::{Binds, Config, Controller, YamlModel},
    session::{self, Selection},
    Session,
};

const CLIENT_NAME: &str = "midi-app-controller";

/// Drive application commands from a MIDI control surface.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Controller schema file
    #[arg(short, long)]
    controller: Option<PathBuf>,

    /// Binds file, defaults to the binds last used with the controller
    #[arg(short, long)]
    binds: Option<PathBuf>,

    /// MIDI input port name
    #[arg(long)]
    midi_in: Option<String>,

    /// MIDI output port name
    #[arg(long)]
    midi_out: Option<String>,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,

    /// List available controller schemas and their binds
    #[arg(long)]
    list_controllers: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "MIDI_APP_CONTROLLER_LOG", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = log::LevelFilter::from_str(&args.log_level)
        .with_context(|| format!("Invalid log level {}", args.log_level))?;
    env_logger::Builder::new().filter_level(level).init();

    let mut session = Session::new(Config::default(), CLIENT_NAME);

    if args.list_ports {
        let (ins, outs) = session.available_midi_ports()?;
        println!("MIDI inputs:");
        ins.iter().for_each(|port| println!("  {port}"));
        println!("MIDI outputs:");
        outs.iter().for_each(|port| println!("  {port}"));

        return Ok(());
    }

    if args.list_controllers {
        for controller in session.available_controllers() {
            println!("{} ({})", controller.name, controller.path.display());
            session.select_controller(Some(&controller.path))?;
            for binds in session.available_binds() {
                println!("  {} ({})", binds.name, binds.path.display());
            }
        }

        return Ok(());
    }

    if let Err(err) = session.load_state() {
        log::warn!("Couldn't restore previous selection: {err}");
    }

    apply_args(&mut session, &args)?;

    let binds_path = session
        .selected_binds()
        .map(|binds| binds.path.clone())
        .ok_or(session::Error::NothingSelected(Selection::Binds))?;
    let host = Arc::new(ConsoleApp::from_binds(&Binds::load_from(&binds_path)?));

    session.start_handling(host)?;
    session.save_state()?;

    println!("Handling the controller, press Enter to stop");
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    session.stop_handling();
    log::info!("Exiting");

    Ok(())
}

fn apply_args(session: &mut Session, args: &Args) -> Result<()> {
    if let Some(controller) = args.controller.as_deref() {
        session.select_controller(Some(controller))?;

        if args.binds.is_none() {
            let recent = session.recent_binds(controller).map(ToOwned::to_owned);
            session.select_binds(recent.as_deref())?;
        }
    }

    if let Some(binds) = args.binds.as_deref() {
        session.select_binds(Some(binds))?;
    }

    let preferred = match session.selected_controller() {
        Some(selected) => {
            let controller = Controller::load_from(&selected.path)?;
            (controller.preferred_midi_in, controller.preferred_midi_out)
        }
        None => (None, None),
    };

    if let Some(port) = args.midi_in.as_deref() {
        session.select_midi_in(Some(port));
    } else if session.selected_midi_in().is_none() {
        session.select_midi_in(preferred.0.as_deref());
    }

    if let Some(port) = args.midi_out.as_deref() {
        session.select_midi_out(Some(port));
    } else if session.selected_midi_out().is_none() {
        session.select_midi_out(preferred.1.as_deref());
    }

    Ok(())
}
