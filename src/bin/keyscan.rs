// Keyscan CLI
// Reads keyboard-wedge barcode scanners and prints each decoded barcode

#![cfg_attr(not(feature = "cli"), allow(dead_code))]

#[cfg(feature = "cli")]
use std::collections::HashMap;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "cli")]
use std::sync::Arc;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use anyhow::{bail, Context};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use keyscan_core::{
    BarcodeDecoder, EventLoop, FlushOutcome, KeyTranslator, PolledEvent, ScanRecord,
    ScannerConfig, Settings,
};

/// Upper bound on a single poll so signals and timers stay responsive
#[cfg(feature = "cli")]
const MAX_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Keystroke barcode decoder for keyboard-wedge scanners
#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "keyscan")]
#[command(author = "keyscan contributors")]
#[command(version)]
#[command(about = "Decode barcodes typed by keyboard-wedge scanners", long_about = None)]
struct Args {
    /// TOML settings file (default: ~/.config/keyscan/settings.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Device name or path to read from (can be used multiple times)
    #[arg(short, long = "device", value_name = "DEVICE")]
    devices: Vec<String>,

    /// Grab devices so scanned keystrokes reach no other application
    #[arg(short, long)]
    grab: bool,

    /// Disable the confirmation tone
    #[arg(long)]
    no_audio: bool,

    /// Maximum gap between keystrokes of one scan, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Minimum barcode length
    #[arg(long, value_name = "N")]
    min_length: Option<usize>,

    /// Terminator key name (e.g. Enter, Tab)
    #[arg(long, value_name = "KEY")]
    terminator: Option<String>,

    /// Print each scan as a JSON object
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate settings and exit
    #[arg(long)]
    check_config: bool,

    /// List devices able to type barcodes
    #[arg(long)]
    list_devices: bool,
}

#[cfg(feature = "cli")]
impl Args {
    /// Apply command-line overrides on top of the settings file
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(delay) = self.delay_ms {
            settings.scanner.max_keystroke_delay_ms = delay;
        }
        if let Some(length) = self.min_length {
            settings.scanner.min_barcode_length = length;
        }
        if let Some(ref terminator) = self.terminator {
            settings.scanner.terminator_key = terminator.clone();
        }
        if self.no_audio {
            settings.scanner.audio_feedback = false;
        }
        if self.grab {
            settings.devices.grab = true;
        }
        // CLI --device > settings [devices].only > autodetect
        if !self.devices.is_empty() {
            settings.devices.only = self.devices.clone();
        }
    }
}

/// One decoded scan, as printed with --json
#[cfg(feature = "cli")]
#[derive(Debug, Serialize)]
struct ScanOutput<'a> {
    barcode: &'a str,
    sequence: u64,
    device: &'a str,
    scanned_at: String,
}

/// Per-device decoding state, so two scanners never share a buffer
#[cfg(feature = "cli")]
struct DeviceChannel {
    name: String,
    translator: KeyTranslator,
    decoder: BarcodeDecoder,
    /// Sequence number of the last scan written to stdout
    reported: u64,
}

#[cfg(feature = "cli")]
impl DeviceChannel {
    fn new(name: String, config: ScannerConfig) -> Self {
        Self {
            name,
            translator: KeyTranslator::new(),
            decoder: build_decoder(config),
            reported: 0,
        }
    }

    /// Scans decoded since the last call, oldest first
    fn take_new_scans(&mut self) -> Vec<ScanRecord> {
        let mut fresh: Vec<ScanRecord> = self
            .decoder
            .history()
            .iter()
            .take_while(|record| record.sequence > self.reported)
            .cloned()
            .collect();
        fresh.reverse();
        if let Some(last) = fresh.last() {
            self.reported = last.sequence;
        }
        fresh
    }
}

// The tone is gated per scan by `audio_feedback`, and the audio thread only
// starts on the first beep, so it is attached unconditionally.
#[cfg(all(feature = "cli", feature = "audio"))]
fn build_decoder(config: ScannerConfig) -> BarcodeDecoder {
    BarcodeDecoder::new(config).with_feedback(keyscan_core::ToneFeedback::default())
}

#[cfg(all(feature = "cli", not(feature = "audio")))]
fn build_decoder(config: ScannerConfig) -> BarcodeDecoder {
    if config.audio_feedback {
        log::debug!("Built without audio support; scan tone disabled");
    }
    BarcodeDecoder::new(config)
}

/// Main application state
#[cfg(feature = "cli")]
struct Application {
    args: Args,
    settings: Settings,
    config: ScannerConfig,
    /// Flag to signal event loop to stop
    running: Arc<AtomicBool>,
    /// Set on SIGHUP, cleared once settings are reloaded
    reload_requested: Arc<AtomicBool>,
}

#[cfg(feature = "cli")]
impl Application {
    fn new(args: Args) -> anyhow::Result<Self> {
        let mut settings = match args.config {
            Some(ref path) => Settings::from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::load_default().context("Failed to load default settings")?,
        };
        args.apply_overrides(&mut settings);

        let config = settings
            .to_scanner_config()
            .context("Invalid scanner settings")?;

        Ok(Self {
            args,
            settings,
            config,
            running: Arc::new(AtomicBool::new(true)),
            reload_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Print the effective settings
    fn check_config(&self) -> anyhow::Result<()> {
        match self.settings.source_path() {
            Some(path) => println!("Settings: {}", path.display()),
            None => println!("Settings: built-in defaults"),
        }
        print!(
            "{}",
            self.settings
                .to_toml()
                .context("Failed to render settings")?
        );
        println!("Configuration is valid");
        Ok(())
    }

    fn list_devices() -> anyhow::Result<()> {
        let devices = EventLoop::list_devices().context("Error finding input devices")?;
        println!("Found {} input device(s):", devices.len());
        for device in &devices {
            let marker = if device.looks_like_scanner { " [scanner]" } else { "" };
            match &device.path {
                Some(path) => println!("  {}: {} ({}){}", device.index, device.name, path, marker),
                None => println!("  {}: {}{}", device.index, device.name, marker),
            }
        }
        Ok(())
    }

    /// SIGINT/SIGTERM stop the loop; SIGHUP reloads the settings file
    fn install_signal_handler(&self) {
        use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let running = self.running.clone();
        let reload_requested = self.reload_requested.clone();
        match Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            Ok(mut signals) => {
                std::thread::spawn(move || {
                    for signal in signals.forever() {
                        if signal == SIGHUP {
                            reload_requested.store(true, Ordering::SeqCst);
                            continue;
                        }
                        log::info!("Received signal {}, shutting down", signal);
                        running.store(false, Ordering::SeqCst);
                        break;
                    }
                });
            }
            Err(e) => log::warn!("Could not install signal handler: {}", e),
        }
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let devices = &self.settings.devices;
        let mut event_loop = if devices.grab {
            EventLoop::open_with_grab(&devices.only, devices.scanners_only)
        } else {
            EventLoop::open(&devices.only, devices.scanners_only)
        }
        .context("Failed to open scanner devices")?;

        log::info!(
            "Listening on {} device(s): {}",
            event_loop.device_count(),
            event_loop.device_names().join(", ")
        );
        if event_loop.is_grabbed() {
            log::debug!("Devices grabbed exclusively");
        }

        self.install_signal_handler();

        let mut channels: HashMap<usize, DeviceChannel> = event_loop
            .device_names()
            .into_iter()
            .enumerate()
            .map(|(index, name)| (index, DeviceChannel::new(name, self.config.clone())))
            .collect();

        let result = self.run_main_loop(&mut event_loop, &mut channels);

        event_loop.ungrab_all();
        result
    }

    fn run_main_loop(
        &mut self,
        event_loop: &mut EventLoop,
        channels: &mut HashMap<usize, DeviceChannel>,
    ) -> anyhow::Result<()> {
        while self.running.load(Ordering::SeqCst) {
            if self.reload_requested.swap(false, Ordering::SeqCst) {
                self.reload_settings(channels);
            }

            let timeout = poll_interval(channels.values(), Instant::now());
            let events = event_loop
                .poll_for_events(timeout)
                .context("Failed to poll input devices")?;

            for event in events {
                self.dispatch(channels, &event)?;
            }

            let now = Instant::now();
            for channel in channels.values_mut() {
                if let Some(FlushOutcome::Emitted(_)) = channel.decoder.poll_timeout(now) {
                    self.report(channel)?;
                }
            }
        }
        Ok(())
    }

    fn dispatch(
        &self,
        channels: &mut HashMap<usize, DeviceChannel>,
        event: &PolledEvent,
    ) -> anyhow::Result<()> {
        let Some(channel) = channels.get_mut(&event.device_index) else {
            log::warn!("Event from unknown device '{}'", event.device_name);
            return Ok(());
        };
        let Some(key_event) = channel.translator.translate(event.code, event.value) else {
            return Ok(());
        };

        // Gaps are measured between kernel timestamps, not read times.
        let outcome = channel.decoder.handle_key(&key_event, event.time);
        log::trace!("{}: {:?} -> {:?}", channel.name, key_event.key, outcome);

        if outcome.barcodes().next().is_some() {
            self.report(channel)?;
        }
        Ok(())
    }

    /// Re-read the settings file and apply it to every decoder.
    ///
    /// Device selection and grabbing only take effect on restart.
    fn reload_settings(&mut self, channels: &mut HashMap<usize, DeviceChannel>) {
        let mut fresh = self.settings.clone();
        if let Err(e) = fresh.reload() {
            log::warn!("Could not reload settings: {}", e);
            return;
        }
        self.args.apply_overrides(&mut fresh);

        match fresh.to_scanner_config() {
            Ok(config) => {
                for channel in channels.values_mut() {
                    channel.decoder.set_config(config.clone());
                }
                if let Some(path) = fresh.source_path() {
                    log::info!("Reloaded settings from {}", path.display());
                }
                self.config = config;
                self.settings = fresh;
            }
            Err(e) => log::warn!("Keeping previous settings: {}", e),
        }
    }

    /// Print every scan the channel decoded since the last report
    fn report(&self, channel: &mut DeviceChannel) -> anyhow::Result<()> {
        for record in channel.take_new_scans() {
            if !self.args.json {
                println!("{}", record.barcode);
                continue;
            }

            let output = ScanOutput {
                barcode: &record.barcode,
                sequence: record.sequence,
                device: &channel.name,
                scanned_at: chrono::DateTime::<chrono::Local>::from(record.scanned_at)
                    .to_rfc3339(),
            };
            println!(
                "{}",
                serde_json::to_string(&output).context("Failed to encode scan as JSON")?
            );
        }
        Ok(())
    }
}

/// Milliseconds until the earliest pending flush, capped at
/// `MAX_POLL_INTERVAL`. Rounds up so a pending timer is never polled early.
#[cfg(feature = "cli")]
fn poll_interval<'a>(channels: impl Iterator<Item = &'a DeviceChannel>, now: Instant) -> i32 {
    let remaining = channels
        .filter_map(|c| c.decoder.next_deadline())
        .min()
        .map(|deadline| deadline.saturating_duration_since(now))
        .unwrap_or(MAX_POLL_INTERVAL)
        .min(MAX_POLL_INTERVAL);

    remaining.as_micros().div_ceil(1000) as i32
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Handle list-devices flag (doesn't require settings)
    if args.list_devices {
        return Application::list_devices();
    }

    let mut app = Application::new(args)?;

    if app.args.check_config {
        return app.check_config();
    }

    if !app.config.enabled {
        bail!("Scanner is disabled in settings ([scanner] enabled = false)");
    }

    app.run()
}

// Stub for when the cli feature is not enabled
#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("Error: keyscan binary requires the 'cli' feature to be enabled.");
    eprintln!("Please build with: cargo build --release --features cli --bin keyscan");
    std::process::exit(1);
}
