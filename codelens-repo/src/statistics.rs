//! Statistics Collector

use crate::filter::{relative_path, IgnoreRules};
use crate::language::LanguageTable;
use codelens_core::{
    AnalysisConfig, CodelensResult, RepositoryStatistics, Scanned, SkipReason, Skipped,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    rules: IgnoreRules,
    languages: LanguageTable,
}

impl StatisticsCollector {
    pub fn new(rules: IgnoreRules, languages: LanguageTable) -> Self {
        Self { rules, languages }
    }

    pub fn from_config(config: &AnalysisConfig) -> CodelensResult<Self> {
        Ok(Self::new(
            IgnoreRules::new(&config.ignored_dirs)?,
            LanguageTable::from_config(config),
        ))
    }

    /// Count files, lines, languages and extensions over every non-ignored file.
    ///
    /// A file that cannot be read still counts as a file but contributes no lines.
    pub fn collect_statistics(&self, root: &Path) -> Scanned<RepositoryStatistics> {
        let mut stats = RepositoryStatistics::default();
        let mut skipped = Vec::new();
        let mut unreadable = Vec::new();

        self.rules.walk_files(root, &mut skipped, |entry| {
            let path = entry.path();
            let extension = LanguageTable::extension_of(path);
            let language = self.languages.language_for_extension(&extension);

            stats.total_files += 1;
            *stats.languages.entry(language.to_string()).or_insert(0) += 1;
            *stats.file_types.entry(extension).or_insert(0) += 1;

            match count_lines(path) {
                Ok(lines) => stats.total_lines += lines,
                Err(e) => unreadable.push(Skipped::new(
                    relative_path(root, path),
                    SkipReason::UnreadableFile(e.to_string()),
                )),
            }
        });
        skipped.extend(unreadable);

        debug!(
            root = %root.display(),
            total_files = stats.total_files,
            total_lines = stats.total_lines,
            "Statistics collected"
        );

        Scanned::new(stats, skipped)
    }
}

/// Number of lines in a file, decoding nothing.
///
/// `\n`, `\r\n` and a lone `\r` each end a line, and trailing bytes without a terminator form
/// one more line. Invalid UTF-8 does not matter.
pub fn count_lines(path: &Path) -> io::Result<usize> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut lines = 0;
    let mut pending = false;
    let mut after_cr = false;

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        for &byte in buf {
            match byte {
                b'\n' if after_cr => {
                    after_cr = false;
                }
                b'\n' => {
                    lines += 1;
                    pending = false;
                }
                b'\r' => {
                    lines += 1;
                    pending = false;
                    after_cr = true;
                }
                _ => {
                    pending = true;
                    after_cr = false;
                }
            }
        }
        let consumed = buf.len();
        reader.consume(consumed);
    }

    if pending {
        lines += 1;
    }
    Ok(lines)
}
