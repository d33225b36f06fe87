use std::env;
use std::path::Path;
use argus_core::anyhow::{format_err, Context as ResultExt, Error};
use argus_core::chrono::Local;
use argus_core::serde_json::{self, json};
use argus_core::audio::{AlsaMixer, Mixer, StreamType};
use argus_core::battery::{Battery, FakeBattery, SysfsBattery};
use argus_core::device::{self, DeviceInfo};
use argus_core::display::DisplayMetrics;
use argus_core::event::Event;
use argus_core::helpers::{load_toml, save_toml};
use argus_core::monitor::{ensure_power_pipe, power_events, Monitor};
use argus_core::net;
use argus_core::os::OsInfo;
use argus_core::settings::{Settings, SETTINGS_PATH};

pub const APP_NAME: &str = "Argus";

pub fn run() -> Result<(), Error> {
    let settings = load_settings()?;
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("info") => info(&settings),
        Some("watch") => watch(&settings),
        Some(other) => Err(format_err!("unknown command: {}", other)),
    }
}

fn load_settings() -> Result<Settings, Error> {
    let path = Path::new(SETTINGS_PATH);
    if path.exists() {
        load_toml::<Settings, _>(path).context("can't load settings")
    } else {
        let settings = Settings::default();
        save_toml(&settings, path)
            .map_err(|e| eprintln!("Can't save settings: {:#}.", e))
            .ok();
        Ok(settings)
    }
}

fn build_battery(settings: &Settings) -> Box<dyn Battery> {
    match SysfsBattery::from_root(&settings.battery.supply_root) {
        Ok(battery) => Box::new(battery) as Box<dyn Battery>,
        Err(e) => {
            eprintln!("Can't open a battery supply, falling back to a fake one: {:#}.", e);
            Box::new(FakeBattery::new()) as Box<dyn Battery>
        },
    }
}

fn info(settings: &Settings) -> Result<(), Error> {
    let os = OsInfo::detect()?;
    let device = DeviceInfo::detect();

    let mut monitor = Monitor::new(build_battery(settings));
    let battery = monitor.reading();

    let mut mixer = AlsaMixer::new(settings.audio.card.clone());
    let volume = mixer.volume(StreamType::Music)
                      .map_err(|e| eprintln!("Can't read the volume: {:#}.", e))
                      .ok();
    let volume_range = mixer.range(StreamType::Music).ok();

    let display = DisplayMetrics::from_root(&settings.display.fb_root, settings.display.dpi)
                                 .map_err(|e| eprintln!("Can't read the display metrics: {:#}.", e))
                                 .ok();

    let report = json!({
        "os": os,
        "device": device,
        "machine-id": device::machine_id(),
        "display": display,
        "volume": volume,
        "volume-range": volume_range,
        "mac-address": net::mac_address(&settings.network.interface),
        "battery": battery.as_ref().map_or(-1.0, |reading| reading.percentage),
        "plugged": battery.as_ref().map(|reading| &reading.sources),
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn watch(settings: &Settings) -> Result<(), Error> {
    let mut monitor = Monitor::new(build_battery(settings));

    let warn = settings.battery.warn;
    monitor.on(move |event| {
        match event {
            Event::BatteryChanged(reading) => {
                let line = json!({
                    "time": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                    "event": "battery-changed",
                    "battery": reading.percentage,
                    "plugged": &reading.sources,
                });
                println!("{}", line);
                if reading.percentage >= 0.0 && reading.percentage < warn {
                    eprintln!("The battery capacity is getting low.");
                }
            },
        }
    });

    // Current state up front, so a watcher doesn't have to wait for
    // the first change notification.
    if let Some(reading) = monitor.reading() {
        println!("{}", json!({
            "battery": reading.percentage,
            "plugged": &reading.sources,
        }));
    }

    ensure_power_pipe(&settings.battery.events_path)?;
    eprintln!("{} is watching {}.", APP_NAME, settings.battery.events_path.display());
    let subscription = power_events(&settings.battery.events_path, build_battery(settings));

    while let Ok(event) = subscription.events().recv() {
        monitor.dispatch(event);
    }

    subscription.stop();
    Ok(())
}
