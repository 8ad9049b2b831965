use crate::domains::Cost;
use crate::experiments::ExperimentError;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// One line of a state-cost file: a state and its optimal solution cost,
/// used by the heuristic-accuracy analysis. The line format is
/// `<space-separated state>;<cost>`; which domain the states belong to is
/// agreed on out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCostRecord<S> {
    pub state: S,
    pub cost: Cost,
}

pub fn write_state_cost_file<S: Display>(
    path: &Path,
    records: &[StateCostRecord<S>],
) -> Result<(), ExperimentError> {
    let mut contents = String::new();
    for record in records {
        contents.push_str(&format!("{};{}\n", record.state, record.cost));
    }
    fs::write(path, contents)?;
    Ok(())
}

pub fn read_state_cost_file<S>(path: &Path) -> Result<Vec<StateCostRecord<S>>, ExperimentError>
where
    S: FromStr,
    S::Err: Display,
{
    let contents = fs::read_to_string(path)?;
    contents
        .lines()
        .enumerate()
        .map(|(index, line)| {
            parse_record(line).map_err(|reason| ExperimentError::MalformedRecord {
                path: path.to_owned(),
                line_number: index + 1,
                reason,
            })
        })
        .collect()
}

fn parse_record<S>(line: &str) -> Result<StateCostRecord<S>, String>
where
    S: FromStr,
    S::Err: Display,
{
    let (state, cost) = line
        .rsplit_once(';')
        .ok_or_else(|| "missing ';' separator".to_owned())?;
    Ok(StateCostRecord {
        state: state.parse::<S>().map_err(|e| e.to_string())?,
        cost: cost.parse::<Cost>().map_err(|e| e.to_string())?,
    })
}
