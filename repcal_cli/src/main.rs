use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use repcal_core::recurrence::{canonical_date, weekday_index, weekday_name, DATE_FORMAT};
use repcal_core::store::seed_if_missing;
use repcal_core::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

type CliPlanner = Planner<JsonRoutineStore, JsonCompletionStore>;

#[derive(Parser)]
#[command(name = "repcal")]
#[command(about = "Workout routine calendar and completion tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the workout checklist for a day (default: today)
    Day {
        /// Date as YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Toggle completion of one exercise on a day
    Toggle {
        /// Routine ID
        routine: String,

        /// Exercise ID within the routine
        exercise: String,

        /// Date as YYYY-MM-DD (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Show the month calendar with completion markers
    Calendar {
        /// Month as YYYY-MM (default: current month)
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,
    },

    /// Show monthly completion statistics
    Stats {
        /// Month as YYYY-MM (default: current month)
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,
    },

    /// Manage workout routines
    Routines {
        #[command(subcommand)]
        command: RoutineCommands,
    },

    /// Export a month's calendar to CSV
    Export {
        /// Month as YYYY-MM (default: current month)
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,

        /// Output CSV path
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum RoutineCommands {
    /// List routines and their exercises
    List,

    /// Create a routine
    Add(AddRoutine),

    /// Delete a routine (its completion history is kept)
    Remove { id: String },

    /// Put a routine back on the calendar
    Activate { id: String },

    /// Take a routine off the calendar without deleting it
    Deactivate { id: String },
}

#[derive(Args)]
struct AddRoutine {
    /// Routine name
    #[arg(long)]
    name: String,

    /// Exercise as NAME, NAME:SETSxREPS or NAME:SECONDSs (repeatable)
    #[arg(long = "exercise", required = true)]
    exercises: Vec<String>,

    /// Schedule every day
    #[arg(long, conflicts_with_all = ["weekdays", "dates", "every"])]
    daily: bool,

    /// Weekdays as 0-6 (0 = Sunday) or names, comma separated (default: mon,wed,fri)
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_weekday,
        conflicts_with_all = ["dates", "every"]
    )]
    weekdays: Vec<u8>,

    /// Specific dates as YYYY-MM-DD, comma separated
    #[arg(long, value_delimiter = ',', conflicts_with = "every")]
    dates: Vec<String>,

    /// Custom interval in days (stored but never scheduled)
    #[arg(long)]
    every: Option<u32>,

    /// Create the routine inactive
    #[arg(long)]
    inactive: bool,
}

fn main() -> Result<()> {
    repcal_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());

    let today = Local::now().date_naive();

    match cli.command {
        Some(Commands::Day { date }) => cmd_day(&data_dir, &config, date.unwrap_or(today), today),
        Some(Commands::Toggle {
            routine,
            exercise,
            date,
        }) => cmd_toggle(&data_dir, &config, date.unwrap_or(today), &routine, &exercise),
        Some(Commands::Calendar { month }) => {
            cmd_calendar(&data_dir, &config, month_or_current(month)?, today)
        }
        Some(Commands::Stats { month }) => cmd_stats(&data_dir, &config, month_or_current(month)?),
        Some(Commands::Routines { command }) => cmd_routines(&data_dir, &config, command),
        Some(Commands::Export { month, output }) => {
            cmd_export(&data_dir, &config, month_or_current(month)?, &output)
        }
        // Default to today's checklist
        None => cmd_day(&data_dir, &config, today, today),
    }
}

/// Seed if configured, load both stores, and report load problems
fn open_planner(data_dir: &Path, config: &Config) -> Result<CliPlanner> {
    let mut routine_store = JsonRoutineStore::in_dir(data_dir);
    if config.routines.seed_samples && seed_if_missing(&mut routine_store)? {
        println!("Created sample routines in {}", routine_store.path().display());
    }

    let (planner, errors) = Planner::load(routine_store, JsonCompletionStore::in_dir(data_dir));
    for error in &errors {
        eprintln!("warning: {} (continuing without this data)", error);
    }

    for problem in validate_routines(planner.routines()) {
        tracing::warn!("Routine data problem: {}", problem);
    }

    Ok(planner)
}

fn cmd_day(data_dir: &Path, config: &Config, date: NaiveDate, today: NaiveDate) -> Result<()> {
    let planner = open_planner(data_dir, config)?;
    let obligations = planner.resolve(date);

    if date == today {
        println!("Today's Workouts ({})", describe_date(date));
    } else {
        println!("Workouts for {}", describe_date(date));
    }
    println!();

    if obligations.is_empty() {
        if date == today {
            println!("  Enjoy your rest day!");
        } else {
            println!("  This is a rest day");
        }
        return Ok(());
    }

    for obligation in &obligations {
        let mark = if obligation.completed { "x" } else { " " };
        let target = planner
            .routine(&obligation.routine_id)
            .and_then(|r| r.exercises.iter().find(|e| e.id == obligation.exercise_id))
            .and_then(|e| e.target_summary())
            .map(|t| format!("  ({})", t))
            .unwrap_or_default();
        println!(
            "  [{}] {}{}    {} {}",
            mark, obligation.label, target, obligation.routine_id, obligation.exercise_id
        );
    }

    let completed = obligations.iter().filter(|o| o.completed).count();
    println!();
    println!("  {}/{} done", completed, obligations.len());
    Ok(())
}

fn cmd_toggle(
    data_dir: &Path,
    config: &Config,
    date: NaiveDate,
    routine_id: &str,
    exercise_id: &str,
) -> Result<()> {
    let mut planner = open_planner(data_dir, config)?;

    let label = planner
        .resolve(date)
        .into_iter()
        .find(|o| o.routine_id == routine_id && o.exercise_id == exercise_id)
        .map(|o| o.label)
        .ok_or_else(|| {
            Error::NotFound(format!(
                "no exercise {}/{} scheduled on {}",
                routine_id,
                exercise_id,
                canonical_date(date)
            ))
        })?;

    let completed = planner.toggle(date, routine_id, exercise_id)?;
    if completed {
        println!("✓ Completed: {} ({})", label, canonical_date(date));
    } else {
        println!("○ Not completed: {} ({})", label, canonical_date(date));
    }
    Ok(())
}

fn cmd_calendar(
    data_dir: &Path,
    config: &Config,
    month: YearMonth,
    today: NaiveDate,
) -> Result<()> {
    let planner = open_planner(data_dir, config)?;
    let grid = planner.month_grid(month);

    println!("{} {}", month.name(), month.year());
    println!();
    println!(
        "{}",
        (0..7)
            .map(|d| format!("{:>4}", weekday_name(d).unwrap_or("?")))
            .collect::<Vec<_>>()
            .join(" ")
    );
    for week in grid.weeks() {
        let row = week
            .iter()
            .map(|day| calendar_cell(day, today))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}", row);
    }
    println!();
    println!("  . scheduled   + partial   * complete   >today   (n) other month");
    println!();

    print_stats(&MonthStats::from_days(grid.days(), month));
    Ok(())
}

fn cmd_stats(data_dir: &Path, config: &Config, month: YearMonth) -> Result<()> {
    let planner = open_planner(data_dir, config)?;
    println!("{} {}", month.name(), month.year());
    print_stats(&planner.month_stats(month));
    Ok(())
}

fn cmd_routines(data_dir: &Path, config: &Config, command: RoutineCommands) -> Result<()> {
    let mut planner = open_planner(data_dir, config)?;

    match command {
        RoutineCommands::List => {
            if planner.routines().is_empty() {
                println!("No routines yet. Create one with `repcal routines add`.");
            }
            for routine in planner.routines() {
                let status = if routine.is_active { "active" } else { "inactive" };
                println!(
                    "{}  {}  [{}]  {}",
                    routine.id,
                    routine.name,
                    routine.schedule.describe(),
                    status
                );
                for exercise in &routine.exercises {
                    match exercise.target_summary() {
                        Some(target) => {
                            println!("    {}  {}  ({})", exercise.id, exercise.name, target)
                        }
                        None => println!("    {}  {}", exercise.id, exercise.name),
                    }
                }
            }
        }

        RoutineCommands::Add(args) => {
            let routine = build_routine(args)?;
            let (id, name) = (routine.id.clone(), routine.name.clone());
            planner.add_routine(routine)?;
            println!("✓ Created routine {} ({})", name, id);
        }

        RoutineCommands::Remove { id } => {
            let removed = planner.remove_routine(&id)?;
            println!("✓ Removed routine {} ({})", removed.name, removed.id);
        }

        RoutineCommands::Activate { id } => {
            planner.set_routine_active(&id, true)?;
            println!("✓ Activated routine {}", id);
        }

        RoutineCommands::Deactivate { id } => {
            planner.set_routine_active(&id, false)?;
            println!("✓ Deactivated routine {}", id);
        }
    }

    Ok(())
}

fn cmd_export(data_dir: &Path, config: &Config, month: YearMonth, output: &Path) -> Result<()> {
    let planner = open_planner(data_dir, config)?;
    let grid = planner.month_grid(month);
    let count = export_month_csv(&grid, output)?;

    println!("✓ Exported {} days of {} to CSV", count, month);
    println!("  CSV: {}", output.display());
    Ok(())
}

fn build_routine(args: AddRoutine) -> Result<Routine> {
    let schedule = if args.daily {
        RecurrenceRule::Daily
    } else if !args.weekdays.is_empty() {
        RecurrenceRule::Weekdays {
            days: args.weekdays.into_iter().collect(),
        }
    } else if !args.dates.is_empty() {
        RecurrenceRule::SpecificDates {
            dates: args.dates.into_iter().collect(),
        }
    } else if let Some(interval) = args.every {
        RecurrenceRule::Custom {
            interval: Some(interval),
        }
    } else {
        // Mon, Wed, Fri
        RecurrenceRule::Weekdays {
            days: BTreeSet::from([1, 3, 5]),
        }
    };

    let mut draft = RoutineDraft::new(args.name, schedule);
    draft.is_active = !args.inactive;
    for spec in &args.exercises {
        draft = draft.exercise(parse_exercise(spec)?);
    }
    draft.build()
}

/// Parse `NAME`, `NAME:SETSxREPS` or `NAME:SECONDSs`
fn parse_exercise(spec: &str) -> Result<ExerciseDraft> {
    let Some((name, target)) = spec.rsplit_once(':') else {
        return Ok(ExerciseDraft::named(spec));
    };

    let invalid = || {
        Error::RoutineValidation(format!(
            "exercise '{}': expected NAME:SETSxREPS or NAME:SECONDSs",
            spec
        ))
    };
    let target = target.trim().to_lowercase();
    let mut draft = ExerciseDraft::named(name);

    if let Some(seconds) = target.strip_suffix('s') {
        draft.duration = Some(seconds.parse().map_err(|_| invalid())?);
    } else {
        let (sets, reps) = target.split_once('x').ok_or_else(invalid)?;
        draft.sets = Some(sets.parse().map_err(|_| invalid())?);
        draft.reps = Some(reps.parse().map_err(|_| invalid())?);
    }

    Ok(draft)
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn parse_month(s: &str) -> std::result::Result<YearMonth, String> {
    YearMonth::parse(s).map_err(|e| e.to_string())
}

fn parse_weekday(s: &str) -> std::result::Result<u8, String> {
    let s = s.trim().to_lowercase();
    if let Ok(index) = s.parse::<u8>() {
        return match weekday_name(index) {
            Some(_) => Ok(index),
            None => Err(format!("weekday {} is outside 0-6", index)),
        };
    }
    (0..7)
        .find(|&i| weekday_name(i).is_some_and(|name| s.starts_with(&name.to_lowercase())))
        .ok_or_else(|| format!("unknown weekday '{}'", s))
}

fn month_or_current(month: Option<YearMonth>) -> Result<YearMonth> {
    match month {
        Some(month) => Ok(month),
        None => YearMonth::current(),
    }
}

fn describe_date(date: NaiveDate) -> String {
    format!(
        "{} {}",
        canonical_date(date),
        weekday_name(weekday_index(date)).unwrap_or("?")
    )
}

fn calendar_cell(day: &CalendarDay, today: NaiveDate) -> String {
    use chrono::Datelike;

    if !day.in_month {
        return format!("({:>2})", day.date.day());
    }

    let marker = if day.is_perfect() {
        '*'
    } else if day.is_partial() {
        '+'
    } else if day.has_obligations {
        '.'
    } else {
        ' '
    };
    let lead = if day.date == today { '>' } else { ' ' };
    format!("{}{:>2}{}", lead, day.date.day(), marker)
}

fn print_stats(stats: &MonthStats) {
    println!("  Perfect days:    {}", stats.perfect_days);
    println!("  Active days:     {}", stats.active_days);
    println!(
        "  Completion rate: {}% ({}/{})",
        stats.completion_rate, stats.completed_obligations, stats.total_obligations
    );
}
