use crate::{modular::Residue, parse::RollMax, simulator::Simulator, TotalSize};
use bytesize::ByteSize;
use pico_args;
use std::{fmt, str::FromStr};
use tabular::{row, Table};
// `std::time::Instant` panics on wasm32-unknown-unknown; this crate doesn't.
use trice::Instant;

///////////////////////////
// String parser helpers //
///////////////////////////

fn parse_req<T>(label: &'static str, s: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    T::from_str(s).map_err(|err| format!("invalid {label}: {err}"))
}

fn parse_opt<T>(label: &'static str, opt_s: Option<&str>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    opt_s
        .map(T::from_str)
        .transpose()
        .map_err(|err| format!("invalid {label}: {err}"))
}

//////////////////////
// CLI Args Wrapper //
//////////////////////

pub struct Args(pico_args::Arguments);

impl Args {
    pub fn new(inner: pico_args::Arguments) -> Self {
        Self(inner)
    }

    fn subcommand(&mut self) -> Result<Option<String>, String> {
        self.0.subcommand().map_err(|err| err.to_string())
    }

    fn opt_value(&mut self, keys: impl Into<pico_args::Keys>) -> Result<Option<String>, String> {
        self.0
            .opt_value_from_fn(keys, |s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn free_value(&mut self) -> Result<String, String> {
        self.0
            .free_from_fn(|s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn expect_finished(self) -> Result<(), String> {
        let remaining = self.0.finish();
        if !remaining.is_empty() {
            Err(format!("unexpected arguments left: '{:?}'", remaining))
        } else {
            Ok(())
        }
    }

    fn maybe_help(&mut self, usage: &str) {
        if self.0.contains(["-h", "--help"]) {
            print!("{}", usage);
            std::process::exit(0);
        }
    }
}

/////////////
// Metrics //
/////////////

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metrics(pub Vec<(String, String)>);

impl Metrics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((label.into(), value.into()));
        self
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new("{:>}  {:<}");

        for (label, value) in &self.0 {
            table.add_row(row!(label, value));
        }

        table
    }
}

///////////////////
// Command trait //
///////////////////

pub trait Command: Sized {
    const USAGE: &'static str;

    type Output: fmt::Display;

    fn try_from_cli_args(args: Args) -> Result<Self, String>;
    fn run(self) -> Result<Self::Output, String>;
}

//////////////////
// CountCommand //
//////////////////

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountCommand {
    roll_max: RollMax,
    num_rolls: u32,
}

impl CountCommand {
    pub fn try_from_str_args(roll_max: Option<&str>, num_rolls: &str) -> Result<Self, String> {
        Ok(Self {
            roll_max: parse_opt("roll max", roll_max)?.unwrap_or_default(),
            num_rolls: parse_req("sequence length", num_rolls)?,
        })
    }
}

impl Command for CountCommand {
    const USAGE: &'static str = "\
rollmax count - count the valid roll sequences of length n

USAGE:
    rollmax count [option ...] <n>

EXAMPLES:
    rollmax count 2 -r [1,1,2,2,2,3]
    rollmax count 5000

OPTIONS:
    · --roll-max / -r [a,b,c,d,e,f] (default: [15,15,15,15,15,15])
      The max number of times each face 1..=6 may be rolled in a row.
";

    type Output = CountCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let roll_max = args.opt_value(["-r", "--roll-max"])?;
        let num_rolls = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(roll_max.as_deref(), &num_rolls)
    }

    fn run(self) -> Result<Self::Output, String> {
        let sim = Simulator::new(&self.roll_max).map_err(|err| err.to_string())?;
        let sim_size = sim.total_size();

        let start_time = Instant::now();
        let count = sim.run(self.num_rolls).map_err(|err| err.to_string())?;
        let search_duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("search duration", format!("{:.2?}", search_duration));
        metrics.push("steps", self.num_rolls.saturating_sub(1).to_string());
        metrics.push(
            "simulator size",
            format!(
                "{} (Σ rollMax: {})",
                ByteSize::b(sim_size as u64),
                self.roll_max.total_max_run(),
            ),
        );

        Ok(CountCommandOutput {
            roll_max: self.roll_max,
            num_rolls: self.num_rolls,
            count,
            metrics,
        })
    }
}

#[derive(Clone, Debug)]
pub struct CountCommandOutput {
    pub roll_max: RollMax,
    pub num_rolls: u32,
    pub count: Residue,
    pub metrics: Metrics,
}

impl fmt::Display for CountCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = Table::new("{:>}  {:<}  {:>}")
            .with_row(row!("n", "rollMax", "count"))
            .with_row(row!(self.num_rolls, self.roll_max, self.count));

        write!(f, "\n{}\n{}", table, self.metrics.to_table())
    }
}

///////////////////
// SeriesCommand //
///////////////////

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesCommand {
    roll_max: RollMax,
    num_rolls: u32,
}

impl SeriesCommand {
    pub fn try_from_str_args(roll_max: Option<&str>, num_rolls: &str) -> Result<Self, String> {
        Ok(Self {
            roll_max: parse_opt("roll max", roll_max)?.unwrap_or_default(),
            num_rolls: parse_req("sequence length", num_rolls)?,
        })
    }
}

impl Command for SeriesCommand {
    const USAGE: &'static str = "\
rollmax series - count the valid roll sequences of every length 1..=n

USAGE:
    rollmax series [option ...] <n>

EXAMPLES:
    rollmax series 10 -r [1,1,2,2,2,3]

OPTIONS:
    · --roll-max / -r [a,b,c,d,e,f] (default: [15,15,15,15,15,15])
      The max number of times each face 1..=6 may be rolled in a row.
";

    type Output = SeriesCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let roll_max = args.opt_value(["-r", "--roll-max"])?;
        let num_rolls = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(roll_max.as_deref(), &num_rolls)
    }

    fn run(self) -> Result<Self::Output, String> {
        let start_time = Instant::now();
        let counts = Simulator::series(self.num_rolls, &self.roll_max).map_err(|err| err.to_string())?;
        let search_duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("search duration", format!("{:.2?}", search_duration));
        metrics.push("roll max", self.roll_max.to_string());
        metrics.push("series size", ByteSize::b(counts.total_size() as u64).to_string());

        Ok(SeriesCommandOutput { counts, metrics })
    }
}

#[derive(Clone, Debug)]
pub struct SeriesCommandOutput {
    pub counts: Vec<Residue>,
    pub metrics: Metrics,
}

impl fmt::Display for SeriesCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new("{:>}  {:>}").with_row(row!(format!("{:>8}", "n"), "count"));

        for (idx, count) in self.counts.iter().enumerate() {
            table.add_row(row!(idx + 1, count));
        }

        write!(f, "\n{}\n{}", table, self.metrics.to_table())
    }
}

/////////////////
// BaseCommand //
/////////////////

#[derive(Debug)]
pub enum BaseCommand {
    Count(CountCommand),
    Series(SeriesCommand),
}

impl Command for BaseCommand {
    const USAGE: &'static str = "\
rollmax - count die roll sequences where no face repeats more than its max run

USAGE:
    rollmax [option ...] <subcommand>

SUBCOMMANDS:
    · rollmax count - count the valid roll sequences of length n
    · rollmax series - count the valid roll sequences of every length 1..=n

ENVIRONMENT:
    · RUST_LOG (default: warn)
      Log filter, e.g., `RUST_LOG=debug rollmax count 100`.
";

    type Output = String;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        let maybe_subcommand = args.subcommand()?;

        match maybe_subcommand.as_deref() {
            Some("count") => Ok(Self::Count(CountCommand::try_from_cli_args(args)?)),
            Some("series") => Ok(Self::Series(SeriesCommand::try_from_cli_args(args)?)),
            Some(command) => Err(format!("'{}' is not a recognized command", command)),
            None => {
                args.maybe_help(Self::USAGE);
                Err("no subcommand specified".to_string())
            }
        }
    }

    fn run(self) -> Result<String, String> {
        match self {
            Self::Count(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Series(cmd) => cmd.run().map(|out| out.to_string()),
        }
    }
}
