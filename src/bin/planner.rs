use clap::Parser;
use sasplan::search::{
    config::PlannerConfig,
    heuristics::{HeuristicConfig, HeuristicName},
    search_engines::{SearchEngineName, SearchResult},
    OperatorCost, PlannerError, Task, Verbosity,
};
use std::{path::PathBuf, process::ExitCode, rc::Rc, time::Duration};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(version)]
/// Run the sasplan heuristic search planner on a SAS+ task.
struct Cli {
    #[arg(help = "The SAS+ task file")]
    task: PathBuf,
    #[arg(
        help = "The output plan file",
        short = 'o',
        long = "output",
        id = "OUTPUT",
        default_value = "sas_plan"
    )]
    plan: PathBuf,
    #[arg(
        help = "A TOML planner configuration. When given, it replaces the \
        search options below.",
        long = "config",
        id = "CONFIG"
    )]
    config: Option<PathBuf>,
    #[arg(
        value_enum,
        help = "The search engine to use",
        short = 'e',
        long = "engine",
        id = "ENGINE",
        default_value_t = SearchEngineName::LazyGreedy
    )]
    search_engine_name: SearchEngineName,
    #[arg(
        value_enum,
        help = "The heuristics to use, repeat the flag for several",
        long = "heuristic",
        id = "HEURISTIC",
        default_values_t = [HeuristicName::Cea]
    )]
    heuristic_names: Vec<HeuristicName>,
    #[arg(
        help = "Indices of the heuristics whose preferred operators are used",
        short = 'p',
        long = "preferred",
        id = "PREFERRED",
        value_delimiter = ',',
        default_values_t = [0]
    )]
    preferred: Vec<usize>,
    #[arg(
        value_enum,
        help = "How operator costs are adjusted for the heuristics and g values",
        long = "cost-type",
        id = "COST_TYPE",
        default_value_t = OperatorCost::Normal
    )]
    cost_type: OperatorCost,
    #[arg(
        help = "The search time limit, for example 30min or 1h",
        short = 't',
        long = "time-limit",
        id = "TIME_LIMIT",
        value_parser = humantime::parse_duration
    )]
    time_limit: Option<Duration>,
    #[arg(help = "Maximum number of expanded states", long = "max-expansions")]
    max_expansions: Option<usize>,
    #[arg(help = "Memory limit in MB", long = "memory-limit")]
    memory_limit_mb: Option<usize>,
    #[arg(
        value_enum,
        help = "The verbosity level",
        short = 'v',
        long = "verbosity",
        id = "VERBOSITY",
        default_value_t = Verbosity::Normal
    )]
    verbosity: Verbosity,
    #[arg(help = "Whether to use coloured output", short = 'c', long = "colour")]
    colour: bool,
}

impl Cli {
    fn planner_config(&self) -> Result<PlannerConfig, PlannerError> {
        let config = match &self.config {
            Some(path) => PlannerConfig::from_path(path)?,
            None => PlannerConfig {
                engine: self.search_engine_name,
                heuristics: self
                    .heuristic_names
                    .iter()
                    .map(|&name| HeuristicConfig::from(name))
                    .collect(),
                preferred: self.preferred.clone(),
                cost_type: self.cost_type,
                time_limit: self.time_limit,
                max_expansions: self.max_expansions,
                memory_limit_mb: self.memory_limit_mb,
                ..PlannerConfig::default()
            },
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level: tracing::Level = cli.verbosity.into();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(cli.colour)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match plan(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(1)
        }
    }
}

fn plan(cli: &Cli) -> Result<ExitCode, PlannerError> {
    let config = cli.planner_config()?;
    let task = Rc::new(Task::from_path(&cli.task)?);
    info!(
        num_variables = task.num_variables(),
        num_operators = task.operators.len(),
        "task loaded"
    );

    let mut engine = config.create_search_engine(task.clone())?;
    let mut termination = config.termination_condition();
    let result = engine.search(&mut termination);

    match result {
        SearchResult::Success(plan) => {
            info!(plan_length = plan.len(), plan_cost = plan.cost(&task), "plan found");
            println!("{}", plan.to_string(&task));
            std::fs::write(&cli.plan, plan.to_string(&task) + "\n")?;
            Ok(ExitCode::SUCCESS)
        }
        SearchResult::ProvablyUnsolvable | SearchResult::IncompleteUnsolvable => {
            info!(?result, "no plan found");
            Ok(ExitCode::from(2))
        }
        SearchResult::TimeLimitExceeded
        | SearchResult::MemoryLimitExceeded
        | SearchResult::ExpansionLimitExceeded => {
            warn!(?result, "search stopped before finding a plan");
            Ok(ExitCode::from(3))
        }
    }
}
