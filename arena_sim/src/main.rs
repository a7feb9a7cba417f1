//! Red/Blue Cyber Arena CLI
//!
//! Plays a match between the learning red team agent and a blue team defender.

use arena_env::{ArenaContext, ArenaError, TokioContext};
use arena_sim::{
    Arena, ArenaConfig, DefenderProfile, MatchRecorder, MatchReport, MatchRunner, SimContext, TracingObserver,
};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Red/Blue Cyber Arena
#[derive(Parser, Debug)]
#[command(name = "arena-sim")]
#[command(about = "Pit a learning red team agent against a blue team defender", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of rounds to play
    #[arg(short, long, default_value = "10")]
    rounds: u32,

    /// Defender profile (heuristic, easy, medium, hard, random, interactive)
    #[arg(short, long, default_value = "heuristic")]
    profile: String,

    /// Game speed multiplier for pacing
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Sleep for real between steps instead of advancing a virtual clock
    #[arg(long)]
    realtime: bool,

    /// Verbose output (every step)
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,

    /// Export every step to a JSON file
    #[arg(long)]
    export: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.json {
        Level::WARN
    } else if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ArenaError> {
    let profile: DefenderProfile = args.profile.parse().map_err(|e| {
        let available: Vec<&str> = DefenderProfile::all().iter().map(|p| p.name()).collect();
        error!("Available profiles: {}", available.join(", "));
        e
    })?;

    // Determine seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    if !args.json {
        info!("Red/Blue Cyber Arena v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("Defender: {} - {}", profile.name(), profile.description());
    }

    let config = ArenaConfig {
        seed,
        rounds: args.rounds,
        profile,
        speed: args.speed,
        ..Default::default()
    };
    let arena = Arena::new(config)?;
    let defender_name = arena.defender_name().to_string();
    let mut runner = MatchRunner::new(arena);

    let ctx: Box<dyn ArenaContext> = if args.realtime {
        Box::new(TokioContext::new())
    } else {
        Box::new(SimContext::new())
    };

    let mut recorder = MatchRecorder::new(&defender_name, seed);
    let report = runner.run(ctx.as_ref(), (TracingObserver, &mut recorder)).await;

    if let Some(path) = &args.export {
        let export = recorder.finish(report.clone());
        export.write_to_file(path)?;
        info!("Exported {} frames to {}", export.frames.len(), path);
    }

    if args.json {
        let summary = serde_json::to_string_pretty(&report).map_err(ArenaError::serialization)?;
        println!("{}", summary);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &MatchReport) {
    info!("");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("Final statistics (seed={})", report.seed);
    info!("  Total rounds: {}", report.rounds);
    info!("  Blue team wins: {} ({:.1}%)", report.blue_wins, report.blue_win_rate);
    info!("  Red team wins: {} ({:.1}%)", report.red_wins, report.red_win_rate);
    if report.halted > 0 {
        info!("  Halted rounds: {}", report.halted);
    }
    info!("  Average steps per round: {:.1}", report.average_steps);
    info!("  Average round duration: {:.1}s", report.average_round_secs);

    match report.winner.as_str() {
        "blue" => info!("Blue team is the overall winner!"),
        "red" => info!("Red team agent is the overall winner!"),
        _ => info!("It's a tie!"),
    }

    info!(
        "Agent: {} states learned, exploration {:.2}%, strategy {}",
        report.agent.states_learned,
        report.agent.epsilon * 100.0,
        report.agent.current_strategy
    );
    info!(
        "Defender: {} actions, {:.1}% of rounds won",
        report.defender_stats.total_actions, report.defender_stats.win_rate
    );
}
