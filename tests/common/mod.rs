#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sheet_sql::data::Cell;
use tempfile::{TempDir, tempdir};

pub const DEFINITIONS_CSV: &str = "\
Table,Ordinal,Column,Type,Nullable
ref_condition,1,id,int,NO
ref_condition,2,code,varchar(20),NO
ref_condition,3,description,varchar(255),YES
ref_condition,4,active_flag,bit,NO
ref_condition,5,created_date_time,datetime,NO
event_log,1,id,bigint(20),NO
event_log,2,happened_at,datetime,NO
event_log,3,amount,decimal,YES
event_log,4,status,\"enum('open','closed')\",NO
";

/// Builds a grid of text cells from string literals.
pub fn text_grid(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|row| row.iter().map(|field| Cell::text(*field)).collect())
        .collect()
}

/// Definition grid for `ref_condition` (id, code, description, active_flag).
pub fn ref_condition_definitions() -> Vec<Vec<Cell>> {
    text_grid(&[
        &["Table", "Ordinal", "Column", "Type", "Nullable"],
        &["ref_condition", "1", "id", "int", "no"],
        &["ref_condition", "2", "code", "varchar(20)", "no"],
        &["ref_condition", "3", "description", "varchar(255)", "yes"],
        &["ref_condition", "4", "active_flag", "bit", "no"],
    ])
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
