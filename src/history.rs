// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Transfer journal for undo support

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Operation;
use crate::{LabelError, Result};

/// A single copy or move recorded in the journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub labels: Vec<String>,
    pub file_hash: String,
    pub undone: bool,
}

impl TransferRecord {
    pub fn new(
        operation: Operation,
        source: PathBuf,
        destination: PathBuf,
        labels: Vec<String>,
        file_hash: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            operation,
            source,
            destination,
            labels,
            file_hash,
            undone: false,
        }
    }
}

/// JSONL journal of transfers
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append an entry to the journal
    pub fn append(&self, record: &TransferRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(record)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read all journal entries, skipping lines that do not parse
    pub fn read_all(&self) -> Result<Vec<TransferRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);

        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Failed to parse journal entry: {}", e),
            }
        }

        Ok(records)
    }

    /// Get the most recent N entries (newest first)
    pub fn get_recent(&self, count: usize) -> Result<Vec<TransferRecord>> {
        let mut records = self.read_all()?;
        records.reverse();
        records.truncate(count);
        Ok(records)
    }

    /// Entries that have not been undone, oldest first
    pub fn get_undoable(&self) -> Result<Vec<TransferRecord>> {
        Ok(self.read_all()?.into_iter().filter(|r| !r.undone).collect())
    }

    /// Mark an entry as undone by rewriting the journal
    pub fn mark_undone(&self, id: &str) -> Result<()> {
        let records = self.read_all()?;

        let mut writer = std::io::BufWriter::new(File::create(&self.path)?);
        for mut record in records {
            if record.id == id {
                record.undone = true;
            }
            writeln!(writer, "{}", serde_json::to_string(&record)?)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Undo the most recent `count` transfers, newest first.
    ///
    /// Moves are moved back; copies are deleted once their content checks out.
    pub fn undo_recent(&self, count: usize, dry_run: bool) -> Result<Vec<TransferRecord>> {
        let mut undone = Vec::new();
        for record in self.get_undoable()?.into_iter().rev().take(count) {
            if dry_run {
                info!("Would undo {:?} -> {:?}", record.destination, record.source);
            } else {
                undo(&record)?;
                self.mark_undone(&record.id)?;
                info!("Undone {:?} -> {:?}", record.destination, record.source);
            }
            undone.push(record);
        }
        Ok(undone)
    }

    /// Clear the journal
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reverse one transfer on disk
pub fn undo(record: &TransferRecord) -> Result<()> {
    if !record.destination.exists() {
        return Err(LabelError::Config(format!(
            "{} no longer exists",
            record.destination.display()
        )));
    }
    if hash_file(&record.destination)? != record.file_hash {
        return Err(LabelError::HashMismatch(record.destination.clone()));
    }

    match record.operation {
        Operation::Copy => fs::remove_file(&record.destination)?,
        Operation::Move => {
            if record.source.exists() {
                return Err(LabelError::Config(format!(
                    "{} already exists",
                    record.source.display()
                )));
            }
            if let Some(parent) = record.source.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&record.destination, &record.source)?;
        }
    }
    Ok(())
}

/// blake3 hash of a file's content
pub fn hash_file(path: &Path) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut file = File::open(path)?;
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}
