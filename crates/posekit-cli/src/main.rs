//! `posekit-cli` – drives a simulated tracker rig and prints data-feed
//! frames.
//!
//! The binary:
//!
//! 1. Loads `~/.posekit/config.toml`, writing defaults on first run.
//! 2. Builds the configured skeleton variant around a set of simulated
//!    trackers and wraps it in a [`SharedSkeleton`].
//! 3. Ticks the pose at `tick_hz`, printing a JSON [`DataFeedUpdate`]
//!    every `feed_every` ticks.
//! 4. Stops after `ticks` ticks, or on **Ctrl-C**.
//!
//! [`DataFeedUpdate`]: posekit_feed::DataFeedUpdate

mod config;
mod demo;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use posekit_feed::DataFeedConfig;
use posekit_skeleton::{FullBodySkeleton, SharedSkeleton, Skeleton, UpperBodySkeleton};

use crate::config::{PosekitConfig, RigKind};

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the filter (default "info").  POSEKIT_LOG_FORMAT=json
    // switches to newline-delimited JSON.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("POSEKIT_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after the current tick".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the loop only stops after the configured tick count");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = PosekitConfig::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  Wrote default config to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => warn!(error = %e, "Could not write default config"),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = PosekitConfig::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    println!(
        "  Rig {} at {} Hz, {}",
        cfg.rig.to_string().bold(),
        cfg.tick_hz,
        if cfg.ticks == 0 {
            "until Ctrl-C".to_string()
        } else {
            format!("{} ticks", cfg.ticks)
        }
    );
    println!();

    let result = match cfg.rig {
        RigKind::FullBody => FullBodySkeleton::new(demo::demo_trackers(), cfg.skeleton)
            .map(|s| run(s, &cfg, &shutdown)),
        RigKind::UpperBody => UpperBodySkeleton::new(demo::demo_trackers(), cfg.skeleton)
            .map(|s| run(s, &cfg, &shutdown)),
    };

    match result {
        Ok(ticks) => println!("{}", format!("  ✓ Stopped after {ticks} ticks.").green()),
        Err(e) => {
            error!(error = %e, "Failed to build skeleton");
            std::process::exit(1);
        }
    }
}

/// Run the tick loop until the tick budget is spent or `shutdown` is set.
/// Returns the number of completed ticks.
fn run<S: Skeleton>(mut skeleton: S, cfg: &PosekitConfig, shutdown: &AtomicBool) -> u64 {
    skeleton.update_leg_tweaks_config(&cfg.leg_tweaks);
    skeleton.update_tap_detection_config(&cfg.tap_detection);

    let response = posekit_feed::skeleton_config_response(skeleton.skeleton_config());
    match serde_json::to_string(&response) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "Failed to serialize skeleton config"),
    }

    let shared = SharedSkeleton::new(skeleton);
    let feed = DataFeedConfig::everything();
    let period = Duration::from_secs_f64(1.0 / f64::from(cfg.tick_hz.max(1)));
    let feed_every = cfg.feed_every.max(1);

    // Calibrate against the first sample.
    shared.control(|s| {
        demo::animate(s, 0, cfg.tick_hz);
        s.reset_trackers_full();
    });

    let mut generation = 0;
    while !shutdown.load(Ordering::SeqCst) && (cfg.ticks == 0 || generation < cfg.ticks) {
        let started = Instant::now();

        shared.control(|s| demo::animate(s, generation, cfg.tick_hz));
        generation = shared.tick();

        if generation % feed_every == 0 {
            let update = posekit_feed::build_update(&feed, &shared);
            match serde_json::to_string(&update) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!(error = %e, generation, "Failed to serialize data feed frame"),
            }
        }

        if let Some(rest) = period.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!(generation, "Tick loop finished");
    generation
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___                __   _ __ "#.bold().cyan());
    println!("{}", r#"  / _ \___  ___ ___  / /__(_) /_"#.bold().cyan());
    println!("{}", r#" / ___/ _ \(_-</ -_)/  '_/ / __/"#.bold().cyan());
    println!("{}", r#"/_/   \___/___/\__//_/\_\/_/\__/ "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "posekit".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Skeletal pose from body-worn trackers");
    println!();
}
