use crate::domains::{Cost, InvalidInput, PancakesState};
use crate::search::SearchError;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const INSTANCE_IDS_HEADER: &str = "instance_id,stack,cost";
pub const RESULTS_HEADER: &str =
    "instance_id,degradation,bound,h_cost,h_expanded,p_cost,p_expanded";

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("cannot parse line {line_number} of {}: {reason}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line_number: usize,
        reason: String,
    },
    #[error("results file and instance-ids file must either both exist or both be missing")]
    MismatchedExperimentFiles,
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error("true-cost pre-pass failed: {0}")]
    TrueCostSearch(#[from] SearchError),
}

/// One line of the instance-ids file: a generated instance together with
/// its dense id and its optimal cost from the A* pre-pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub instance_id: u64,
    pub stack: PancakesState,
    pub cost: Cost,
}

impl fmt::Display for InstanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.instance_id, self.stack, self.cost)
    }
}

impl FromStr for InstanceRecord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.splitn(3, ',');
        let instance_id = next_field(&mut fields)?
            .parse::<u64>()
            .map_err(|e| e.to_string())?;
        let stack = next_field(&mut fields)?
            .parse::<PancakesState>()
            .map_err(|e| e.to_string())?;
        let cost = next_field(&mut fields)?
            .parse::<Cost>()
            .map_err(|e| e.to_string())?;
        Ok(Self {
            instance_id,
            stack,
            cost,
        })
    }
}

fn next_field<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Result<&'a str, String> {
    fields.next().ok_or_else(|| "missing field".to_owned())
}

/// One line of the results file: the pure-heuristic (`h_*`) and potential
/// (`p_*`) runs for an (instance, degradation, bound) cell. Costs use the
/// sentinels -1 (timeout) and -2 (no solution under the bound).
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub instance_id: u64,
    pub degradation: f64,
    /// The bound multiplier label (1, 1.1, …, 2), not the absolute bound.
    pub bound: f64,
    pub h_cost: i64,
    pub h_expanded: u64,
    pub p_cost: i64,
    pub p_expanded: u64,
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{}",
            self.instance_id,
            self.degradation,
            self.bound,
            self.h_cost,
            self.h_expanded,
            self.p_cost,
            self.p_expanded
        )
    }
}

impl FromStr for ResultRecord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() != 7 {
            return Err(format!("expected 7 fields, got {}", fields.len()));
        }
        Ok(Self {
            instance_id: fields[0].parse().map_err(|e: std::num::ParseIntError| e.to_string())?,
            degradation: fields[1].parse().map_err(|e: std::num::ParseFloatError| e.to_string())?,
            bound: fields[2].parse().map_err(|e: std::num::ParseFloatError| e.to_string())?,
            h_cost: fields[3].parse().map_err(|e: std::num::ParseIntError| e.to_string())?,
            h_expanded: fields[4].parse().map_err(|e: std::num::ParseIntError| e.to_string())?,
            p_cost: fields[5].parse().map_err(|e: std::num::ParseIntError| e.to_string())?,
            p_expanded: fields[6].parse().map_err(|e: std::num::ParseIntError| e.to_string())?,
        })
    }
}

/// Prepare the two experiment files for (re)use. Both existing means a
/// previous run is being resumed: its instances are reloaded so new ones
/// are not duplicated and ids stay dense. Exactly one existing means the
/// pair went out of sync, which no run can recover from.
pub fn setup_experiment_files(
    instances_path: &Path,
    results_path: &Path,
) -> Result<(u64, HashSet<PancakesState>), ExperimentError> {
    if instances_path.is_file() != results_path.is_file() {
        return Err(ExperimentError::MismatchedExperimentFiles);
    }

    if !instances_path.is_file() {
        fs::write(instances_path, format!("{INSTANCE_IDS_HEADER}\n"))?;
        fs::write(results_path, format!("{RESULTS_HEADER}\n"))?;
        return Ok((0, HashSet::new()));
    }

    let records = read_instances(instances_path)?;
    let next_id = records.last().map_or(0, |record| record.instance_id + 1);
    let seen = records.into_iter().map(|record| record.stack).collect();
    Ok((next_id, seen))
}

pub fn read_instances(path: &Path) -> Result<Vec<InstanceRecord>, ExperimentError> {
    read_records(path, INSTANCE_IDS_HEADER)
}

pub fn read_results(path: &Path) -> Result<Vec<ResultRecord>, ExperimentError> {
    read_records(path, RESULTS_HEADER)
}

fn read_records<R>(path: &Path, header: &str) -> Result<Vec<R>, ExperimentError>
where
    R: FromStr<Err = String>,
{
    let contents = fs::read_to_string(path)?;
    let mut lines = contents.lines().enumerate();
    match lines.next() {
        Some((_, first)) if first == header => {}
        _ => {
            return Err(ExperimentError::MalformedRecord {
                path: path.to_owned(),
                line_number: 1,
                reason: format!("missing header {header:?}"),
            })
        }
    }

    lines
        .map(|(index, line)| {
            line.parse::<R>()
                .map_err(|reason| ExperimentError::MalformedRecord {
                    path: path.to_owned(),
                    line_number: index + 1,
                    reason,
                })
        })
        .collect()
}

pub fn append_instance(path: &Path, record: &InstanceRecord) -> Result<(), ExperimentError> {
    append_line(path, &record.to_string())
}

pub fn append_result(path: &Path, record: &ResultRecord) -> Result<(), ExperimentError> {
    append_line(path, &record.to_string())
}

fn append_line(path: &Path, line: &str) -> Result<(), ExperimentError> {
    let mut file = fs::OpenOptions::new().append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}
