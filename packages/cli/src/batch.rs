//! Parallel processing of a directory of reports.
//!
//! Documents are independent, so each one is parsed on the blocking pool
//! with its own deadline. A failure or timeout is logged and counted; the
//! rest of the batch carries on.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt as _};
use verba_cli_utils::ProgressCallback;
use verba_report_models::ExtractConfig;

use crate::CliError;
use crate::process::{OutputOptions, process_file};

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Documents processed at once.
    pub jobs: usize,
    /// Deadline for each document.
    pub timeout: Duration,
    pub output: OutputOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jobs: 4,
            timeout: Duration::from_secs(30),
            output: OutputOptions::default(),
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Inputs that produced outputs, with their row counts.
    pub processed: Vec<(PathBuf, usize)>,
    /// Inputs that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.processed.iter().map(|(_, rows)| rows).sum()
    }
}

/// Lists the `.txt` and `.pdf` reports directly inside `dir`, sorted.
///
/// When a PDF already has a text dump with the same stem, only the text
/// file is kept.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be read.
pub fn discover_inputs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut by_stem: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_txt = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if !is_txt && !verba_extract::pdf_text::is_pdf(&path) {
            continue;
        }
        let stem = path.with_extension("");
        if is_txt || !by_stem.contains_key(&stem) {
            by_stem.insert(stem, path);
        }
    }

    Ok(by_stem.into_values().collect())
}

/// Processes every report in `dir`.
///
/// # Errors
///
/// Returns [`CliError`] only if the directory cannot be listed; per-document
/// failures are collected in the summary.
pub async fn run_batch(
    dir: &Path,
    config: Arc<ExtractConfig>,
    options: &BatchOptions,
    progress: Arc<dyn ProgressCallback>,
) -> Result<BatchSummary, CliError> {
    let inputs = discover_inputs(dir)?;
    log::info!(
        "Processing {} documents from {} (jobs={}, timeout={}s)",
        inputs.len(),
        dir.display(),
        options.jobs,
        options.timeout.as_secs()
    );
    progress.set_total(inputs.len() as u64);

    let results: Vec<_> = stream::iter(inputs.into_iter().map(|path| {
        let config = Arc::clone(&config);
        let output = options.output.clone();
        let timeout = options.timeout;
        let progress = Arc::clone(&progress);
        async move {
            let result = process_with_deadline(path.clone(), config, output, timeout).await;
            progress.set_message(outcome_message(&path, &result));
            progress.inc(1);
            (path, result)
        }
    }))
    .buffer_unordered(options.jobs.max(1))
    .collect()
    .await;

    let mut summary = BatchSummary::default();
    for (path, result) in results {
        match result {
            Ok(rows) => summary.processed.push((path, rows)),
            Err(e) => {
                log::error!("{}: {e}", path.display());
                summary.failed.push((path, e.to_string()));
            }
        }
    }
    summary.processed.sort();
    summary.failed.sort();

    progress.finish(format!(
        "{} documents processed, {} failed, {} rows",
        summary.processed.len(),
        summary.failed.len(),
        summary.total_rows()
    ));

    Ok(summary)
}

/// One-line outcome shown on the progress bar as each document finishes.
fn outcome_message(path: &Path, result: &Result<usize, CliError>) -> String {
    let document = verba_extract::document_name(path);
    match result {
        Ok(rows) => format!("{document}: {rows} rows"),
        Err(CliError::Timeout { secs, .. }) => format!("{document}: timed out after {secs}s"),
        Err(_) => format!("{document}: failed"),
    }
}

/// Runs one document on the blocking pool. On timeout the task is left to
/// finish in the background and its result is dropped.
async fn process_with_deadline(
    path: PathBuf,
    config: Arc<ExtractConfig>,
    output: OutputOptions,
    timeout: Duration,
) -> Result<usize, CliError> {
    let document = verba_extract::document_name(&path);
    let task = tokio::task::spawn_blocking(move || {
        process_file(&path, &config, &output).map(|p| p.document.rows.len())
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined?,
        Err(_) => Err(CliError::Timeout {
            document,
            secs: timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use verba_cli_utils::null_progress;

    #[derive(Default)]
    struct Recorded {
        total: Mutex<u64>,
        done: Mutex<u64>,
        messages: Mutex<Vec<String>>,
        finished: Mutex<Option<String>>,
    }

    impl ProgressCallback for Recorded {
        fn set_total(&self, total: u64) {
            *self.total.lock().unwrap() = total;
        }

        fn inc(&self, delta: u64) {
            *self.done.lock().unwrap() += delta;
        }

        fn set_message(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }

        fn finish(&self, msg: String) {
            *self.finished.lock().unwrap() = Some(msg);
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("verba-batch-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const GOOD: &str = "agosto de 2019\nLocação\nFulano de Tal\nBeltrano *\n(*) nota\n";

    #[test]
    fn text_dump_wins_over_pdf() {
        let dir = scratch_dir("discover");
        for name in ["b.pdf", "b.txt", "a.pdf", "c.txt", "notes.md"] {
            std::fs::write(dir.join(name), "").unwrap();
        }

        let inputs = discover_inputs(&dir).unwrap();
        let names: Vec<String> = inputs
            .iter()
            .map(|p| verba_extract::document_name(p))
            .collect();
        assert_eq!(names, ["a.pdf", "b.txt", "c.txt"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failures_do_not_abort_the_batch() {
        let dir = scratch_dir("run");
        std::fs::write(dir.join("agosto 2019.txt"), GOOD).unwrap();
        std::fs::write(dir.join("broken.txt"), "agosto de 2019\nLocação\nFulano\n").unwrap();

        let options = BatchOptions {
            jobs: 2,
            output: OutputOptions {
                out_dir: Some(dir.join("out")),
                markdown: false,
            },
            ..BatchOptions::default()
        };
        let summary = run_batch(
            &dir,
            Arc::new(ExtractConfig::default()),
            &options,
            null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(summary.processed.len(), 1);
        assert_eq!(summary.total_rows(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].0.ends_with("broken.txt"));
        assert!(dir.join("out").join("2019-08.csv").is_file());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn progress_names_each_finished_document() {
        let dir = scratch_dir("progress");
        std::fs::write(dir.join("agosto 2019.txt"), GOOD).unwrap();
        std::fs::write(dir.join("broken.txt"), "agosto de 2019\nLocação\nFulano\n").unwrap();

        let recorded = Arc::new(Recorded::default());
        let options = BatchOptions {
            jobs: 1,
            output: OutputOptions {
                out_dir: Some(dir.join("out")),
                markdown: false,
            },
            ..BatchOptions::default()
        };
        run_batch(
            &dir,
            Arc::new(ExtractConfig::default()),
            &options,
            Arc::clone(&recorded) as Arc<dyn ProgressCallback>,
        )
        .await
        .unwrap();

        assert_eq!(*recorded.total.lock().unwrap(), 2);
        assert_eq!(*recorded.done.lock().unwrap(), 2);
        let mut messages = recorded.messages.lock().unwrap().clone();
        messages.sort();
        assert_eq!(messages, ["agosto 2019.txt: 2 rows", "broken.txt: failed"]);
        assert_eq!(
            recorded.finished.lock().unwrap().as_deref(),
            Some("1 documents processed, 1 failed, 2 rows")
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn timeout_message_names_the_deadline() {
        let result = Err(CliError::Timeout {
            document: "agosto 2019.pdf".to_owned(),
            secs: 30,
        });
        assert_eq!(
            outcome_message(Path::new("files/agosto 2019.pdf"), &result),
            "agosto 2019.pdf: timed out after 30s"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_directory_is_an_error() {
        let result = run_batch(
            Path::new("no/such/dir"),
            Arc::new(ExtractConfig::default()),
            &BatchOptions::default(),
            null_progress(),
        )
        .await;
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
