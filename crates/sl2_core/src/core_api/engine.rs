use std::fs;
use std::path::Path;

use log::debug;

use crate::codec::hex_string;
use crate::layout::SlotIndex;
use crate::save::{SaveFile, Slot};
use crate::transplant::{TransplantOutcome, transplant_with_report};

use super::error::{CoreError, CoreErrorCode};
use super::types::{ChecksumReport, SaveSummary, SlotSummary};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

#[derive(Debug)]
pub struct Session {
    save: SaveFile,
    summary: SaveSummary,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: Into<Vec<u8>>>(
        &self,
        file_name: impl Into<String>,
        bytes: B,
    ) -> Result<Session, CoreError> {
        let save = SaveFile::parse(file_name, bytes.into())?;
        Ok(Session::from_save(save))
    }

    pub fn open_path(&self, path: &Path) -> Result<Session, CoreError> {
        let bytes = fs::read(path).map_err(|e| {
            CoreError::structural(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!("opening {} ({} bytes)", path.display(), bytes.len());
        self.open_bytes(file_name, bytes)
    }
}

impl Session {
    fn from_save(save: SaveFile) -> Self {
        let summary = summarize(&save);
        Self { save, summary }
    }

    pub fn file_name(&self) -> &str {
        self.save.file_name()
    }

    pub fn save(&self) -> &SaveFile {
        &self.save
    }

    pub fn summary(&self) -> &SaveSummary {
        &self.summary
    }

    pub fn slot(&self, index: usize) -> Result<Slot<'_>, CoreError> {
        Ok(self.save.slot(SlotIndex::new(index)?))
    }

    pub fn checksums(&self) -> ChecksumReport {
        self.save.verify_checksums()
    }

    /// Copy an active slot of this save into `target_slot` of `target`.
    /// Returns the new target buffer; both sessions stay untouched.
    pub fn transplant_into(
        &self,
        target: &Session,
        source_slot: usize,
        target_slot: usize,
    ) -> Result<TransplantOutcome, CoreError> {
        let record = self.slot(source_slot)?;
        if !record.record.active {
            return Err(CoreError::policy(
                CoreErrorCode::InactiveSource,
                format!(
                    "source slot {} of {} is not active",
                    source_slot + 1,
                    self.file_name()
                ),
            )
            .in_slot(source_slot));
        }

        transplant_with_report(&record, target_slot, &self.save, &target.save)
    }

    /// Parse a buffer produced from this session under the same file name.
    pub fn reopen(&self, bytes: Vec<u8>) -> Result<Session, CoreError> {
        Engine::new().open_bytes(self.file_name(), bytes)
    }
}

fn summarize(save: &SaveFile) -> SaveSummary {
    let slots = save
        .records()
        .iter()
        .map(|record| SlotSummary {
            index: record.index.get(),
            active: record.active,
            name: record.display_name.clone(),
            level: record.level,
            seconds_played: record.seconds_played,
            parsing_issues: record.parsing_issues.clone(),
        })
        .collect();

    SaveSummary {
        file_name: save.file_name().to_string(),
        file_len: save.bytes().len(),
        owner_id: hex_string(save.owner_id()),
        slots,
    }
}
