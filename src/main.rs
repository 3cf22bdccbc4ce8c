use log::{info, warn, LevelFilter};
use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
        Arc,
    },
    time::Duration,
};
use weatherface::{
    companion::Companion,
    config::Config,
    console::ConsoleFace,
    host::{self, HostPlatform},
    settings::FileStore,
    Reconciler, Settings,
};

/// How often the loop wakes up to check for ctrl-c
const SHUTDOWN_POLL: Duration = Duration::from_millis(500);

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module("weatherface", LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Config::load()?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_running = Arc::clone(&running);
    ctrlc::set_handler(move || handler_running.store(false, Ordering::SeqCst))?;

    let (sender, receiver) = mpsc::channel();
    let platform = HostPlatform::new(&config);
    let companion = Companion::new(config.weather.clone(), sender.clone());
    // Phone side fetches as soon as it's up, same as it would on launch
    if let Err(err) = companion.fetch_weather() {
        warn!("Not fetching weather: {err}");
    }

    let settings = Settings::new(FileStore::open(&config.settings_path));
    let mut reconciler = Reconciler::new(settings, platform.clone(), companion);
    let mut face = ConsoleFace::new(io::stdout());
    face.render(reconciler.display())?;

    host::spawn_ticker(platform, sender.clone());
    host::spawn_config_reader(sender);

    println!("Ctrl-c to exit...");
    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(SHUTDOWN_POLL) {
            Ok(event) => {
                reconciler.handle(event);
                face.render(reconciler.display())?;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!("Shutting down");
    Ok(())
}
