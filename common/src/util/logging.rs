use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::{info, LevelFilter, SetLoggerError};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

static MULTI: OnceLock<MultiProgress> = OnceLock::new();


pub fn initialize_logging(log_level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = env_logger::builder()
        .filter_level(log_level)
        .parse_default_env() // Allow overriding log level through RUST_LOG env var
        .build();
    let max_level = logger.filter();

    let multi = MultiProgress::new();

    let wrapper = LogWrapper::new(multi.clone(), logger);
    wrapper.try_init()?;
    log::set_max_level(max_level);

    // Only fails if logging was initialized before, which try_init already rejected
    let _ = MULTI.set(multi);

    Ok(())
}


/// Runs `function` while showing a spinner and logs how long it took. Without initialized logging
/// (e.g. in tests) no spinner is drawn.
pub fn run_with_spinner<'a, F, Out>(
    target: &'a str, task_desc: &'a str, function: F,
) -> Out where
    F: FnOnce() -> Out,
{
    let start_time = SystemTime::now();

    let pb = MULTI.get().map(|multi| {
        let pb = ProgressBar::new_spinner()
            .with_message(format!("{}...", task_desc))
            .with_style(ProgressStyle::with_template("{spinner:.white} [{elapsed:.green}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()));
        pb.enable_steady_tick(Duration::from_millis(100));

        // Set up connection with log library so that progress bars don't jump around
        multi.add(pb)
    });

    let out = function();

    if let (Some(multi), Some(pb)) = (MULTI.get(), pb) {
        pb.finish_and_clear();
        multi.remove(&pb);
    }
    let elapsed = indicatif::HumanDuration(start_time.elapsed().unwrap_or_default());
    info!(target: target, "{} finished (took {})", task_desc, elapsed);

    out
}
