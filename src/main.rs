use clap::{Args, Parser, Subcommand, ValueEnum};
use potsearch::domains::{Cost, Domain, InvalidInput, Pancakes, TilePuzzle};
use potsearch::experiments::{
    generate_state_costs, run_experiment, write_state_cost_file, ExperimentConfig,
};
use potsearch::search::{AstarSearcher, PotentialSearcher, SearchStatistics, Verbosity};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Parser)]
#[command(version)]
/// Bounded-cost heuristic search on the sliding-tile and pancake puzzles.
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(
        value_enum,
        help = "The verbosity level",
        short = 'v',
        long = "verbosity",
        default_value_t = Verbosity::Normal
    )]
    verbosity: Verbosity,
    #[arg(help = "Whether to use coloured output", short = 'c', long = "colour")]
    colour: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum DomainName {
    Tile,
    Pancakes,
}

#[derive(Args)]
struct DomainArgs {
    #[arg(
        value_enum,
        help = "The puzzle domain",
        short = 'd',
        long = "domain",
        default_value_t = DomainName::Pancakes
    )]
    domain: DomainName,
    #[arg(help = "Tile puzzle width", long = "width", default_value_t = 4)]
    width: usize,
    #[arg(help = "Tile puzzle height", long = "height", default_value_t = 4)]
    height: usize,
    #[arg(help = "Pancake stack size", long = "size", default_value_t = 14)]
    size: usize,
    #[arg(
        help = "Heuristic degradation: the ignored-tile threshold for the \
        tile puzzle (an integer), the gap degradation for pancakes (a \
        multiple of 0.5)",
        long = "degradation",
        default_value_t = 0.0
    )]
    degradation: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one instance optimally with A*.
    Astar {
        #[command(flatten)]
        domain: DomainArgs,
        #[arg(help = "Space-separated state, e.g. \"2 4 1 3 5\"")]
        instance: String,
        #[arg(
            help = "The time limit for the search, supports syntax like 30min",
            long = "time-limit",
            value_parser = humantime::parse_duration,
            default_value = "1h"
        )]
        time_limit: Duration,
    },
    /// Find any solution strictly under a cost bound with Potential Search.
    Potential {
        #[command(flatten)]
        domain: DomainArgs,
        #[arg(help = "Space-separated state, e.g. \"2 4 1 3 5\"")]
        instance: String,
        #[arg(help = "The cost bound C; solutions must cost less", long = "bound")]
        bound: Cost,
        #[arg(
            help = "Order the open list by h alone instead of the potential",
            long = "pure-heuristic"
        )]
        pure_heuristic: bool,
        #[arg(
            help = "The time limit for the search, supports syntax like 30min",
            long = "time-limit",
            value_parser = humantime::parse_duration,
            default_value = "300s"
        )]
        time_limit: Duration,
    },
    /// Generate random instances by walking from the goal.
    Generate {
        #[command(flatten)]
        domain: DomainArgs,
        #[arg(long = "count", default_value_t = 10)]
        count: usize,
        #[arg(long = "min-ops", default_value_t = 200)]
        min_ops: usize,
        #[arg(long = "max-ops", default_value_t = 300)]
        max_ops: usize,
        #[arg(help = "RNG seed for reproducible output", long = "seed")]
        seed: Option<u64>,
    },
    /// Write instance/optimal-cost records for heuristic-accuracy analysis.
    StateCosts {
        #[command(flatten)]
        domain: DomainArgs,
        #[arg(help = "The output record file")]
        output: PathBuf,
        #[arg(long = "count", default_value_t = 100)]
        count: usize,
        #[arg(long = "min-ops", default_value_t = 200)]
        min_ops: usize,
        #[arg(long = "max-ops", default_value_t = 300)]
        max_ops: usize,
        #[arg(
            long = "time-limit",
            value_parser = humantime::parse_duration,
            default_value = "1h"
        )]
        time_limit: Duration,
        #[arg(long = "seed")]
        seed: Option<u64>,
    },
    /// Run the pure-heuristic vs potential-search comparison experiment.
    Experiment {
        #[arg(help = "Directory holding the instance-ids and results files")]
        files_dir: PathBuf,
        #[arg(long = "stack-size", default_value_t = 14)]
        stack_size: usize,
        #[arg(long = "instances", default_value_t = 100)]
        instances: usize,
        #[arg(
            help = "Budget of each bounded search",
            long = "time-limit",
            value_parser = humantime::parse_duration,
            default_value = "300s"
        )]
        time_limit: Duration,
        #[arg(
            help = "Budget of the A* pre-pass that establishes the true cost",
            long = "true-cost-time-limit",
            value_parser = humantime::parse_duration,
            default_value = "1h"
        )]
        true_cost_time_limit: Duration,
        #[arg(long = "seed")]
        seed: Option<u64>,
    },
}

enum AnyDomain {
    Tile(TilePuzzle),
    Pancakes(Pancakes),
}

fn build_domain(args: &DomainArgs) -> Result<AnyDomain, InvalidInput> {
    match args.domain {
        DomainName::Tile => {
            let mut puzzle = TilePuzzle::new(args.width, args.height)?;
            if args.degradation < 0.0
                || args.degradation.fract() != 0.0
                || args.degradation > 255.0
            {
                return Err(InvalidInput::BadDegradation(args.degradation));
            }
            puzzle.set_ignored_tiles(args.degradation as u8);
            Ok(AnyDomain::Tile(puzzle))
        }
        DomainName::Pancakes => {
            let mut domain = Pancakes::new(args.size)?;
            domain.set_degradation(args.degradation)?;
            Ok(AnyDomain::Pancakes(domain))
        }
    }
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

fn main() {
    let cli = Cli::parse();

    let level: tracing::Level = cli.verbosity.into();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(cli.colour)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(error) = run(cli.command) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Astar {
            domain,
            instance,
            time_limit,
        } => match build_domain(&domain)? {
            AnyDomain::Tile(puzzle) => solve_astar(&puzzle, &instance, time_limit),
            AnyDomain::Pancakes(pancakes) => solve_astar(&pancakes, &instance, time_limit),
        },
        Commands::Potential {
            domain,
            instance,
            bound,
            pure_heuristic,
            time_limit,
        } => match build_domain(&domain)? {
            AnyDomain::Tile(puzzle) => {
                solve_potential(&puzzle, &instance, bound, pure_heuristic, time_limit)
            }
            AnyDomain::Pancakes(pancakes) => {
                solve_potential(&pancakes, &instance, bound, pure_heuristic, time_limit)
            }
        },
        Commands::Generate {
            domain,
            count,
            min_ops,
            max_ops,
            seed,
        } => {
            let mut rng = make_rng(seed);
            match build_domain(&domain)? {
                AnyDomain::Tile(puzzle) => generate(&puzzle, &mut rng, count, min_ops, max_ops),
                AnyDomain::Pancakes(pancakes) => {
                    generate(&pancakes, &mut rng, count, min_ops, max_ops)
                }
            }
            Ok(())
        }
        Commands::StateCosts {
            domain,
            output,
            count,
            min_ops,
            max_ops,
            time_limit,
            seed,
        } => {
            let mut rng = make_rng(seed);
            match build_domain(&domain)? {
                AnyDomain::Tile(puzzle) => {
                    let records =
                        generate_state_costs(&puzzle, &mut rng, count, min_ops, max_ops, time_limit)?;
                    write_state_cost_file(&output, &records)?;
                }
                AnyDomain::Pancakes(pancakes) => {
                    let records = generate_state_costs(
                        &pancakes, &mut rng, count, min_ops, max_ops, time_limit,
                    )?;
                    write_state_cost_file(&output, &records)?;
                }
            }
            println!("wrote {count} records to {}", output.display());
            Ok(())
        }
        Commands::Experiment {
            files_dir,
            stack_size,
            instances,
            time_limit,
            true_cost_time_limit,
            seed,
        } => {
            std::fs::create_dir_all(&files_dir)?;
            let instances_path =
                files_dir.join(format!("pancakes_instances_ids_{stack_size}.csv"));
            let results_path = files_dir.join(format!("pancakes_results_{stack_size}.csv"));
            let config = ExperimentConfig {
                stack_size,
                num_instances: instances,
                search_time_limit: time_limit,
                true_cost_time_limit,
                ..ExperimentConfig::default()
            };
            let mut rng = make_rng(seed);
            run_experiment(&config, &instances_path, &results_path, &mut rng)?;
            Ok(())
        }
    }
}

fn solve_astar<D: Domain>(
    domain: &D,
    instance: &str,
    time_limit: Duration,
) -> Result<(), Box<dyn Error>>
where
    D::State: FromStr<Err = InvalidInput>,
{
    let start: D::State = instance.trim().parse()?;
    let mut searcher = AstarSearcher::new(domain);
    let solution = searcher.solve(&start, time_limit)?;
    print_solution(solution.cost, solution.total_time, searcher.statistics());
    Ok(())
}

fn solve_potential<D: Domain>(
    domain: &D,
    instance: &str,
    bound: Cost,
    pure_heuristic: bool,
    time_limit: Duration,
) -> Result<(), Box<dyn Error>>
where
    D::State: FromStr<Err = InvalidInput>,
{
    let start: D::State = instance.trim().parse()?;
    let mut searcher = PotentialSearcher::new(domain);
    let solution = searcher.solve(&start, bound, pure_heuristic, time_limit)?;
    print_solution(solution.cost, solution.total_time, searcher.statistics());
    Ok(())
}

fn print_solution(cost: Cost, total_time: Duration, statistics: &SearchStatistics) {
    println!("cost: {cost}");
    println!("time: {:.3}s", total_time.as_secs_f64());
    println!(
        "expanded: {}, generated: {}, reopened: {}",
        statistics.expanded, statistics.generated, statistics.reopened
    );
}

fn generate<D: Domain>(domain: &D, rng: &mut SmallRng, count: usize, min_ops: usize, max_ops: usize)
where
    D::State: Display,
{
    for instance in domain.generate_instances(rng, count, min_ops, max_ops) {
        println!("{instance}");
    }
}
