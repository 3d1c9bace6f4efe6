use anyhow::Result;
use clap::{Arg, Command};
use swipeline::constants::DEFAULT_SWIPE_THRESHOLD_PX;
use swipeline::db::{DatabaseConfig, migrations};
use swipeline::engine::{GestureOutcome, GestureTracker, Point};
use swipeline::models::Session;
use swipeline::utils::{Config, init_logging};
use swipeline::{PgStore, SwipeEngine, Uuid, get_db_pool};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let matches = Command::new("swipe-sim")
        .about("Replay a card drag through the gesture tracker and optionally record the result")
        .arg(
            Arg::new("dx")
                .long("dx")
                .help("Horizontal drag distance in pixels (positive is right)")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .default_value("0"),
        )
        .arg(
            Arg::new("dy")
                .long("dy")
                .help("Vertical drag distance in pixels (negative is up)")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .default_value("0"),
        )
        .arg(
            Arg::new("steps")
                .long("steps")
                .help("Number of intermediate moves")
                .value_parser(clap::value_parser!(u32).range(1..))
                .default_value("10"),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .help("Swipe threshold in pixels (defaults to SWIPE_THRESHOLD_PX)")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .help("Record the swipe as this user id (needs DATABASE_URL)")
                .value_parser(clap::value_parser!(Uuid))
                .requires("target"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .help("Profile id the swipe is recorded against")
                .value_parser(clap::value_parser!(Uuid))
                .requires("user"),
        )
        .get_matches();

    let dx = *matches.get_one::<f64>("dx").unwrap_or(&0.0);
    let dy = *matches.get_one::<f64>("dy").unwrap_or(&0.0);
    let steps = *matches.get_one::<u32>("steps").unwrap_or(&10);
    let threshold = match matches.get_one::<f64>("threshold") {
        Some(px) => *px,
        None => Config::from_env()
            .map(|config| config.swipe_threshold_px)
            .unwrap_or(DEFAULT_SWIPE_THRESHOLD_PX),
    };

    let outcome = replay_drag(Point::new(dx, dy), steps, threshold);

    let action = match outcome {
        GestureOutcome::Swiped(action) => {
            info!("Drag ({}, {}) classified as {}", dx, dy, action);
            action
        }
        GestureOutcome::Cancelled => {
            info!("Drag ({}, {}) stayed under the {}px threshold, card returns", dx, dy, threshold);
            return Ok(());
        }
    };

    let (Some(user_id), Some(target_id)) = (
        matches.get_one::<Uuid>("user").copied(),
        matches.get_one::<Uuid>("target").copied(),
    ) else {
        return Ok(());
    };

    let config = Config::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;
    migrations::run_migrations(&pool).await?;

    let engine = SwipeEngine::new(PgStore::new(pool), config.engine_settings());
    let session = Session::new(user_id);
    let decision = engine.swipe(Some(&session), target_id, action).await?;

    info!("Recorded swipe {} ({})", decision.swipe.id, decision.swipe.action);
    match decision.matched {
        Some(matched) => info!("It's a match! {} ({} <> {})", matched.id, matched.user1_id, matched.user2_id),
        None if action.is_like() => info!("Like saved, waiting on {}", target_id),
        None => {}
    }

    if let Ok(superlikes) = engine.get_today_superlike_count(Some(&session)).await {
        if superlikes > 0 {
            warn!("{} superlikes sent today", superlikes);
        }
    }

    Ok(())
}

/// Drag from the origin to `end` in `steps` even moves, then release.
fn replay_drag(end: Point, steps: u32, threshold: f64) -> GestureOutcome {
    let mut tracker = GestureTracker::new(threshold);
    tracker.start(Point::ORIGIN);

    for step in 1..=steps {
        let t = f64::from(step) / f64::from(steps);
        let state = tracker.move_to(Point::new(end.x * t, end.y * t));
        tracing::debug!(
            "step {}: offset ({:.1}, {:.1}) rotation {:.1} scale {:.2}",
            step,
            state.drag_offset.x,
            state.drag_offset.y,
            state.rotation,
            state.scale
        );
    }

    tracker.end()
}
