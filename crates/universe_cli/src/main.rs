use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use universe_core::{
    check_universe, generate_systems, CheckOptions, ConsistencyReport, GenerateParams,
    StarSystemId, Universe, UniverseContent,
};
use universe_world::{load_content, load_universe, register_user, save_universe};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "universe_cli", about = "Universe generation and consistency tools")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Universe state file. Created on first save.
    #[arg(long, global = true, default_value = "./universe.json")]
    universe: PathBuf,
    #[arg(long, global = true, default_value = "./content")]
    content_dir: String,
    /// Seed for every random draw. A random seed is drawn and logged when absent.
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate undiscovered star systems for future exploration.
    #[command(name = "universe:generate-undiscovered")]
    GenerateUndiscovered {
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        count: i64,
        /// Minimum distance between systems (defaults to min_system_distance).
        #[arg(long)]
        min_distance: Option<f64>,
        /// Position draws per system before it is skipped.
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Widen the sampling range beyond known space.
        #[arg(long)]
        expand_range: bool,
        /// Maximum distance from the origin (defaults to max_origin_distance).
        #[arg(long)]
        max_distance: Option<f64>,
    },
    /// Scan the universe for inconsistencies and optionally repair them.
    #[command(name = "universe:check-consistency")]
    CheckConsistency {
        /// Recompute counts and coordinates, fill gaps, clear bad home planets.
        #[arg(long)]
        fix: bool,
        /// Reassign orphan planets and split overfull systems.
        #[arg(long)]
        fix_orphans: bool,
        /// Move systems that sit too close to a neighbour.
        #[arg(long)]
        fix_distances: bool,
        /// Print every issue found.
        #[arg(short, long)]
        verbose: bool,
        /// Write the full report as JSON to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List systems within exploration range of a system.
    #[command(name = "universe:nearby")]
    Nearby {
        #[arg(long)]
        system: String,
        /// Search radius (defaults to exploration_radius).
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Register a user and assign a home planet.
    #[command(name = "user:register")]
    Register {
        #[arg(long)]
        name: String,
    },
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    let resolved_seed = seed.unwrap_or_else(rand::random);
    tracing::info!(seed = resolved_seed, "rng seeded");
    ChaCha8Rng::seed_from_u64(resolved_seed)
}

fn generate_undiscovered(
    common: &CommonArgs,
    content: &UniverseContent,
    count: i64,
    min_distance: Option<f64>,
    max_attempts: Option<u32>,
    expand_range: bool,
    max_distance: Option<f64>,
) -> Result<ExitCode> {
    let Some(count) = u32::try_from(count).ok().filter(|c| *c >= 1) else {
        eprintln!("Count must be at least 1");
        return Ok(ExitCode::FAILURE);
    };
    if min_distance.is_some_and(|d| !d.is_finite() || d < 0.0) {
        eprintln!("--min-distance must be a finite, non-negative number");
        return Ok(ExitCode::FAILURE);
    }
    if max_distance.is_some_and(|d| !d.is_finite() || d <= 0.0) {
        eprintln!("--max-distance must be a finite, positive number");
        return Ok(ExitCode::FAILURE);
    }

    let mut universe = load_universe(&common.universe)?;
    let mut rng = make_rng(common.seed);
    let mut params = GenerateParams::from_constants(count, &content.constants);
    params.expand_range = expand_range;
    if let Some(min_distance) = min_distance {
        params.min_distance = min_distance;
    }
    if let Some(max_attempts) = max_attempts {
        params.max_attempts = max_attempts;
    }
    if let Some(max_distance) = max_distance {
        params.max_origin_distance = max_distance;
    }

    println!(
        "Generating {count} undiscovered systems: \
         min_distance={:.1} max_attempts={} max_distance={:.1}",
        params.min_distance, params.max_attempts, params.max_origin_distance,
    );
    let outcome = generate_systems(&mut universe, content, &params, &mut rng);
    save_universe(&universe, &common.universe)?;

    println!("{}", "-".repeat(80));
    println!(
        "Created {} systems with {} planets; {} failed.",
        outcome.created.len(),
        outcome.planets_created,
        outcome.failed,
    );
    for id in &outcome.created {
        let system = &universe.star_systems[id];
        println!(
            "  {id}  {:<28} ({:8.2}, {:8.2}, {:8.2})  {:<12} planets={}",
            system.name,
            system.x,
            system.y,
            system.z,
            system.star_type.as_str(),
            system.planet_count,
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn check_consistency(
    common: &CommonArgs,
    content: &UniverseContent,
    options: CheckOptions,
    verbose: bool,
    report_path: Option<&Path>,
) -> Result<ExitCode> {
    let mut universe = load_universe(&common.universe)?;
    let mut rng = make_rng(common.seed);
    let report = check_universe(&mut universe, content, &options, &mut rng);

    write_report(&mut std::io::stdout().lock(), &report, verbose)?;

    if options.fix || options.fix_orphans || options.fix_distances {
        save_universe(&universe, &common.universe)?;
    }
    if let Some(path) = report_path {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    Ok(ExitCode::from(report.exit_code()))
}

fn write_report(
    out: &mut impl Write,
    report: &ConsistencyReport,
    verbose: bool,
) -> std::io::Result<()> {
    writeln!(out, "{}", "-".repeat(80))?;
    writeln!(out, "{:<32}{:>10}", "star systems", report.counts.star_systems)?;
    writeln!(out, "{:<32}{:>10}", "planets", report.counts.planets)?;
    writeln!(
        out,
        "{:<32}{:>10}",
        "users with home planets", report.counts.users_with_home_planets
    )?;
    writeln!(out, "{}", "-".repeat(80))?;

    if report.is_clean() {
        writeln!(out, "No issues found.")?;
    } else {
        writeln!(out, "Found {} issues:", report.issues.len())?;
        for (kind, count) in report.counts_by_kind() {
            writeln!(out, "  {:<30}{count:>10}", kind.as_str())?;
        }
    }
    if verbose {
        for issue in &report.issues {
            writeln!(out, "  [{}] {}: {}", issue.kind, issue.subject, issue.detail)?;
        }
    }

    let repairs = report.repairs.entries();
    if !repairs.is_empty() {
        writeln!(out, "Repairs:")?;
        for (label, count) in repairs {
            writeln!(out, "  {label:<30}{count:>10}")?;
        }
    }
    Ok(())
}

fn nearby(
    common: &CommonArgs,
    content: &UniverseContent,
    system: &str,
    radius: Option<f64>,
) -> Result<ExitCode> {
    let universe = load_universe(&common.universe)?;
    let id = StarSystemId(system.to_string());
    let Some(center) = universe.star_systems.get(&id) else {
        eprintln!("Unknown star system {system}");
        return Ok(ExitCode::FAILURE);
    };
    let radius = radius.unwrap_or(content.constants.exploration_radius);
    let found = universe.nearby_systems(
        center.position(),
        radius,
        content.constants.max_nearby_systems + 1,
    );

    println!("Systems within {radius:.1} of {}:", center.name);
    print_nearby(&universe, &id, &found);
    Ok(ExitCode::SUCCESS)
}

fn print_nearby(universe: &Universe, center: &StarSystemId, found: &[(StarSystemId, f64)]) {
    for (id, d) in found.iter().filter(|(id, _)| id != center) {
        let system = &universe.star_systems[id];
        let marker = if system.discovered { "" } else { " (undiscovered)" };
        println!("  {id}  {:<28} {d:8.2}{marker}", system.name);
    }
}

fn register(common: &CommonArgs, content: &UniverseContent, name: &str) -> Result<ExitCode> {
    let mut universe = load_universe(&common.universe)?;
    let mut rng = make_rng(common.seed);
    let user_id = register_user(&mut universe, content, name, &mut rng);
    save_universe(&universe, &common.universe)?;

    let user = &universe.users[&user_id];
    match &user.home_planet_id {
        Some(planet_id) => println!(
            "Registered {name} ({user_id}) with home planet {}",
            universe.planets[planet_id].name
        ),
        None => println!("Registered {name} ({user_id}) without a home planet"),
    }
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let content = load_content(&cli.common.content_dir)?;
    match cli.command {
        Commands::GenerateUndiscovered {
            count,
            min_distance,
            max_attempts,
            expand_range,
            max_distance,
        } => generate_undiscovered(
            &cli.common,
            &content,
            count,
            min_distance,
            max_attempts,
            expand_range,
            max_distance,
        ),
        Commands::CheckConsistency {
            fix,
            fix_orphans,
            fix_distances,
            verbose,
            report,
        } => check_consistency(
            &cli.common,
            &content,
            CheckOptions {
                fix,
                fix_orphans,
                fix_distances,
            },
            verbose,
            report.as_deref(),
        ),
        Commands::Nearby { system, radius } => nearby(&cli.common, &content, &system, radius),
        Commands::Register { name } => register(&cli.common, &content, &name),
    }
}
