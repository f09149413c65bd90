//! Checkpoint files
//!
//! A checkpoint is a plain text file. The first line is the simulation time it was written at,
//! every other line is `<cell index>;<oil amount>`, one per cell in ascending index order.

use crate::solver::OilField;
use crate::types::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// The contents of a checkpoint file
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// Simulation time the checkpoint was written at
    pub time: f64,
    /// Cell indices and their oil amounts
    pub amounts: Vec<(usize, f64)>,
}

impl Checkpoint {
    /// Create a checkpoint of every cell of `field`
    pub fn from_field(time: f64, field: &OilField) -> Self {
        Self {
            time,
            amounts: field.amount().iter().copied().enumerate().collect(),
        }
    }

    /// Write the checkpoint
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "{}", self.time)?;
        for (index, amount) in &self.amounts {
            writeln!(writer, "{index};{amount}")?;
        }
        Ok(())
    }

    /// Write the checkpoint to a file
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Parse a checkpoint
    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let header = lines.next().ok_or(Error::InvalidCheckpoint {
            line: 1,
            message: String::from("empty file"),
        })??;
        let time = header
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::InvalidCheckpoint {
                line: 1,
                message: format!("invalid time {header:?}: {e}"),
            })?;

        let mut amounts = vec![];
        for (i, line) in lines.enumerate() {
            let line = line?;
            let line_number = i + 2;
            if line.trim().is_empty() {
                continue;
            }
            let invalid = |message: String| Error::InvalidCheckpoint {
                line: line_number,
                message,
            };
            let (index, amount) = line
                .split_once(';')
                .ok_or_else(|| invalid(format!("expected <index>;<amount>, got {line:?}")))?;
            let index = index
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid(format!("invalid cell index {index:?}: {e}")))?;
            let amount = amount
                .trim()
                .parse::<f64>()
                .map_err(|e| invalid(format!("invalid oil amount {amount:?}: {e}")))?;
            amounts.push((index, amount));
        }
        Ok(Self { time, amounts })
    }

    /// Read a checkpoint from a file
    pub fn read_from_file(path: &Path) -> Result<Self> {
        Self::read(BufReader::new(File::open(path)?))
    }

    /// Set the amounts of the listed cells in `field`
    ///
    /// Cells that are not listed keep their amount. Every index is checked before any amount is
    /// set, so `field` is unchanged when an error is returned.
    pub fn apply(&self, field: &mut OilField) -> Result<()> {
        let ncells = field.len();
        let mut seen = vec![false; ncells];
        for (line, (index, _)) in self.amounts.iter().enumerate() {
            let invalid = |message: String| Error::InvalidCheckpoint {
                line: line + 2,
                message,
            };
            if *index >= ncells {
                return Err(invalid(format!(
                    "cell {index} does not exist in a mesh with {ncells} cells"
                )));
            }
            if seen[*index] {
                return Err(invalid(format!("cell {index} is listed twice")));
            }
            seen[*index] = true;
        }

        let amount = field.amount_mut();
        for (index, value) in &self.amounts {
            amount[*index] = *value;
        }
        Ok(())
    }
}
