//! Reads input shards and extracts one key per record.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use glob::{glob, Pattern};
use tracing::{debug, info, warn};

use common::error::{InvalidRecord, LoadError, LoadResult};
use common::Workload;

/// What to do with a record that has no usable key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Skip the record, log it and count it.
    #[default]
    Lenient,

    /// Fail the whole load on the first invalid record.
    Strict,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub policy: Policy,

    /// Field delimiter.
    pub delimiter: u8,

    /// Whether the first row of every shard is a header to be ignored.
    pub has_headers: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            policy: Policy::Lenient,
            delimiter: b',',
            has_headers: false,
        }
    }
}

/// Keys read from one input file.
#[derive(Debug)]
pub struct Shard {
    pub path: PathBuf,

    /// Trimmed keys, in file order.
    pub keys: Vec<String>,

    /// Number of invalid records that were skipped.
    pub skipped: usize,
}

/// Expand the input spec into the list of shard files.
///
/// An existing file is a single shard and an existing directory contributes
/// every file directly inside it. Anything else is treated as a glob spec.
/// Shards are returned in path order.
pub fn resolve_inputs(input: &str) -> LoadResult<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let pattern = if path.is_dir() {
        // The directory name is literal, only the trailing `*` is a wildcard.
        Path::new(&Pattern::escape(input))
            .join("*")
            .to_string_lossy()
            .into_owned()
    } else {
        if let Err(e) = Pattern::new(input) {
            // Not a glob, so it names a plain path.
            if !path.exists() {
                return Err(LoadError::NotFound(input.to_string()));
            }
            return Err(LoadError::Pattern {
                pattern: input.to_string(),
                message: e.msg.to_string(),
            });
        }
        input.to_string()
    };

    let entries = glob(&pattern).map_err(|e| LoadError::Pattern {
        pattern: pattern.clone(),
        message: e.msg.to_string(),
    })?;

    let mut shards = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::Io(e.into()))?;
        if entry.is_file() {
            shards.push(entry);
        }
    }

    if shards.is_empty() {
        return Err(LoadError::NotFound(input.to_string()));
    }

    shards.sort();
    Ok(shards)
}

/// Load every shard named by `input`.
///
/// Fails with [`LoadError::NotFound`] before reading anything when no shard
/// exists.
pub fn load(input: &str, workload: &Workload, options: &LoadOptions) -> LoadResult<Vec<Shard>> {
    let paths = resolve_inputs(input)?;
    info!("Loading {} shard(s) for workload `{}`", paths.len(), workload.name);

    paths
        .iter()
        .map(|path| load_shard(path, workload, options))
        .collect()
}

/// Read one shard. The file is closed when this returns.
pub fn load_shard(path: &Path, workload: &Workload, options: &LoadOptions) -> LoadResult<Shard> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
        _ => LoadError::Io(e),
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(true)
        .from_reader(file);

    let mut keys = Vec::new();
    let mut skipped = 0;
    let mut record = StringRecord::new();

    while reader.read_record(&mut record)? {
        match extract_key(&record, workload) {
            Ok(key) => keys.push(key.to_string()),
            Err(reason) => {
                let line = record.position().map_or(0, |pos| pos.line());
                match options.policy {
                    Policy::Strict => {
                        return Err(LoadError::Validation {
                            shard: path.to_path_buf(),
                            line,
                            reason,
                        })
                    }
                    Policy::Lenient => {
                        warn!(shard = %path.display(), line, %reason, "skipping invalid record");
                        skipped += 1;
                    }
                }
            }
        }
    }

    debug!(
        shard = %path.display(),
        records = keys.len(),
        skipped,
        "shard loaded"
    );

    Ok(Shard {
        path: path.to_path_buf(),
        keys,
        skipped,
    })
}

/// Extract the trimmed key of a record, or say why there is none.
pub fn extract_key<'r>(
    record: &'r StringRecord,
    workload: &Workload,
) -> Result<&'r str, InvalidRecord> {
    if record.iter().all(|field| field.trim().is_empty()) {
        return Err(InvalidRecord::Empty);
    }

    let key = (workload.extract_fn)(record)
        .ok_or(InvalidRecord::MissingKey)?
        .trim();

    if key.is_empty() {
        return Err(InvalidRecord::BlankKey);
    }
    Ok(key)
}
