//! Logging lifecycle: level resolution, file sinks and the handler registry.
//!
//! The subscriber stack is installed once per process: a reloadable level
//! filter, one console (stderr) layer and one file layer that writes
//! through a swappable [`FileSlot`]. Re-initialization therefore never
//! accumulates handlers; it reloads the level and supersedes the current
//! file sink. Every opened sink is tracked in the [`HandlerRegistry`] and
//! closed exactly once, either when superseded or at shutdown.
//!
//! Logging I/O failures never escape this module: an uncreatable logs
//! directory or unopenable log file degrades to console-only output.

use parking_lot::{Mutex, RwLock};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing_subscriber::{
    filter::LevelFilter, fmt, fmt::MakeWriter, layer::SubscriberExt, registry::Registry, reload,
    util::SubscriberInitExt,
};

/// Resolve a configured level name against the standard level table.
///
/// Unrecognized or absent names fall back to `INFO`; a bad level is never
/// an error.
pub fn resolve_level(name: Option<&str>) -> LevelFilter {
    name.and_then(|name| name.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO)
}

// ============================================================================
// FileSink
// ============================================================================

/// One open append-mode log file.
///
/// The sink owns its file handle for the lifetime of one logging session:
/// it is released when superseded by the next initialization or when the
/// registry shuts down, never by an interpreter-exit style hook. Closing
/// an already-closed sink is a no-op, and writes after close are discarded.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    /// Open `path` in append mode, creating the file if missing.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.lock().is_some()
    }

    /// Close the sink, flushing buffered output. Idempotent.
    pub fn close(&self) {
        if let Some(mut file) = self.file.lock().take() {
            file.flush().ok();
        }
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        match self.file.lock().as_mut() {
            Some(file) => file.write(buf),
            // Closed sink: discard silently, console output still works
            None => Ok(buf.len()),
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.file.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

// ============================================================================
// HandlerRegistry
// ============================================================================

/// Process-wide ordered list of every file sink ever opened.
///
/// Guarantees each sink is closed exactly once: superseded sinks are closed
/// when replaced, and `close_all` sweeps whatever is left at shutdown.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    sinks: Mutex<Vec<Arc<FileSink>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a sink for guaranteed cleanup. A sink already tracked is not
    /// tracked twice.
    pub fn track(&self, sink: &Arc<FileSink>) {
        let mut sinks = self.sinks.lock();
        if !sinks.iter().any(|known| Arc::ptr_eq(known, sink)) {
            sinks.push(Arc::clone(sink));
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.lock().is_empty()
    }

    /// Number of tracked sinks still holding an open file.
    pub fn open_count(&self) -> usize {
        self.sinks.lock().iter().filter(|s| s.is_open()).count()
    }

    /// Close every tracked sink. Closing an already-closed sink is a no-op.
    pub fn close_all(&self) {
        for sink in self.sinks.lock().iter() {
            sink.close();
        }
    }
}

// ============================================================================
// FileSlot
// ============================================================================

/// Swappable current file sink, shared with the file `fmt` layer.
///
/// Holds at most one live sink; installing a replacement closes the
/// predecessor, so repeated initializations can never stack file handlers.
#[derive(Debug, Clone, Default)]
pub struct FileSlot(Arc<RwLock<Option<Arc<FileSink>>>>);

impl FileSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<FileSink>> {
        self.0.read().clone()
    }

    /// Install `sink` (or none), closing whatever was there before.
    pub fn replace(&self, sink: Option<Arc<FileSink>>) {
        let previous = {
            let mut slot = self.0.write();
            std::mem::replace(&mut *slot, sink)
        };
        if let Some(previous) = previous {
            previous.close();
        }
    }
}

/// Writer handed to the file layer; resolves the current sink per write.
pub struct SlotWriter(Arc<RwLock<Option<Arc<FileSink>>>>);

impl Write for SlotWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &*self.0.read() {
            Some(sink) => sink.write(buf),
            // No file sink this session: console-only
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &*self.0.read() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileSlot {
    type Writer = SlotWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SlotWriter(Arc::clone(&self.0))
    }
}

// ============================================================================
// LoggingRuntime
// ============================================================================

/// Options for one logging initialization.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Tool name; the log file is `<tool>.log` inside the logs directory.
    pub tool: String,
    /// Resolved level for this session.
    pub level: LevelFilter,
    /// Logs directory, already tilde-expanded by the config layer.
    pub logs_dir: PathBuf,
    /// Skip file handlers entirely (test harnesses, descriptor-sensitive
    /// environments). The logs directory is still created.
    pub disable_file_logging: bool,
}

/// Process-wide logging pipeline.
///
/// Built lazily on first use. The console layer is part of the installed
/// stack, so no amount of re-initialization can duplicate it.
pub struct LoggingRuntime {
    /// Reload handle for the level filter; absent when another subscriber
    /// already owns the process dispatcher.
    filter: Option<reload::Handle<LevelFilter, Registry>>,
    slot: FileSlot,
    registry: HandlerRegistry,
}

impl LoggingRuntime {
    /// The process-wide runtime, installing the subscriber stack on first
    /// call.
    pub fn global() -> &'static LoggingRuntime {
        static RUNTIME: OnceLock<LoggingRuntime> = OnceLock::new();
        RUNTIME.get_or_init(Self::install)
    }

    fn install() -> Self {
        let slot = FileSlot::new();
        let (filter_layer, filter_handle) = reload::Layer::new(LevelFilter::INFO);

        let installed = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().with_writer(io::stderr))
            .with(fmt::layer().with_ansi(false).with_writer(slot.clone()))
            .try_init()
            .is_ok();

        Self {
            // If another subscriber owns the dispatcher our layers are not
            // in the stack; level reloads become no-ops and file sinks
            // still rotate (writes just never arrive).
            filter: installed.then_some(filter_handle),
            slot,
            registry: HandlerRegistry::new(),
        }
    }

    /// Bring the pipeline to a consistent state for one session.
    ///
    /// Repeated calls fully supersede the previous session's file sink and
    /// never touch the console layer.
    pub fn initialize(&self, opts: &LogOptions) {
        if let Some(handle) = &self.filter {
            // Best-effort: a torn-down reload layer only costs the level change
            let _ = handle.reload(opts.level);
        }

        if opts.disable_file_logging {
            // Keep the logs directory present for anything that expects it,
            // but leave file handlers untouched.
            let _ = fs::create_dir_all(&opts.logs_dir);
            return;
        }

        rotate_file_sink(&self.slot, &self.registry, &opts.logs_dir, &opts.tool);
    }

    /// Currently installed file sink, if any.
    pub fn current_sink(&self) -> Option<Arc<FileSink>> {
        self.slot.current()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Release the current sink and close everything ever opened.
    pub fn shutdown(&self) {
        self.slot.replace(None);
        self.registry.close_all();
    }
}

/// Supersede the current file sink with a fresh one for `<tool>.log`.
///
/// The previous sink is closed before anything else so a failure past that
/// point leaves the pipeline console-only rather than pointing at a stale
/// file.
fn rotate_file_sink(slot: &FileSlot, registry: &HandlerRegistry, logs_dir: &Path, tool: &str) {
    slot.replace(None);

    if let Err(err) = fs::create_dir_all(logs_dir) {
        tracing::warn!(
            dir = %logs_dir.display(),
            %err,
            "cannot create logs directory, continuing with console logging only"
        );
        return;
    }

    let path = logs_dir.join(format!("{tool}.log"));
    match FileSink::open(&path) {
        Ok(sink) => {
            let sink = Arc::new(sink);
            registry.track(&sink);
            slot.replace(Some(sink));
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                %err,
                "cannot open log file, continuing with console logging only"
            );
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level_known_names() {
        assert_eq!(resolve_level(Some("debug")), LevelFilter::DEBUG);
        assert_eq!(resolve_level(Some("DEBUG")), LevelFilter::DEBUG);
        assert_eq!(resolve_level(Some("warn")), LevelFilter::WARN);
        assert_eq!(resolve_level(Some("off")), LevelFilter::OFF);
    }

    #[test]
    fn test_resolve_level_fallback() {
        assert_eq!(resolve_level(Some("loud")), LevelFilter::INFO);
        assert_eq!(resolve_level(None), LevelFilter::INFO);
    }

    #[test]
    fn test_sink_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::open(&dir.path().join("tool.log")).unwrap();
        assert!(sink.is_open());

        sink.close();
        assert!(!sink.is_open());
        // Second close is a no-op, not an error
        sink.close();
        assert!(!sink.is_open());
    }

    #[test]
    fn test_write_after_close_discards() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::open(&dir.path().join("tool.log")).unwrap();
        sink.close();

        assert_eq!(sink.write(b"dropped").unwrap(), 7);
        assert_eq!(fs::read(sink.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_registry_tracks_once() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HandlerRegistry::new();
        let sink = Arc::new(FileSink::open(&dir.path().join("tool.log")).unwrap());

        registry.track(&sink);
        registry.track(&sink);
        assert_eq!(registry.len(), 1);

        registry.close_all();
        assert_eq!(registry.open_count(), 0);
        // Sweeping again stays a no-op
        registry.close_all();
    }

    #[test]
    fn test_slot_replace_closes_predecessor() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new();

        let first = Arc::new(FileSink::open(&dir.path().join("a.log")).unwrap());
        let second = Arc::new(FileSink::open(&dir.path().join("b.log")).unwrap());

        slot.replace(Some(Arc::clone(&first)));
        slot.replace(Some(Arc::clone(&second)));

        assert!(!first.is_open());
        assert!(second.is_open());
        assert!(Arc::ptr_eq(&slot.current().unwrap(), &second));
    }

    #[test]
    fn test_repeated_rotation_bounds_handlers() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new();
        let registry = HandlerRegistry::new();

        let n = 5;
        for _ in 0..n {
            rotate_file_sink(&slot, &registry, dir.path(), "mediatool");
        }

        // At most one live file handler, every predecessor closed
        assert_eq!(registry.open_count(), 1);
        assert_eq!(registry.len(), n);
        assert!(dir.path().join("mediatool.log").exists());
    }

    #[test]
    fn test_rotation_degrades_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        fs::write(&blocker, b"not a directory").unwrap();

        let slot = FileSlot::new();
        let registry = HandlerRegistry::new();
        rotate_file_sink(&slot, &registry, &blocker, "mediatool");

        // Console-only session: no sink installed, nothing tracked
        assert!(slot.current().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rotation_supersedes_even_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new();
        let registry = HandlerRegistry::new();

        rotate_file_sink(&slot, &registry, dir.path(), "mediatool");
        let first = slot.current().unwrap();

        let blocker = dir.path().join("blocked");
        fs::write(&blocker, b"").unwrap();
        rotate_file_sink(&slot, &registry, &blocker, "mediatool");

        assert!(!first.is_open());
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_slot_writer_reaches_current_sink() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new();
        let sink = Arc::new(FileSink::open(&dir.path().join("tool.log")).unwrap());
        slot.replace(Some(Arc::clone(&sink)));

        let mut writer = slot.make_writer();
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        let contents = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(contents, "hello\n");
    }

    #[test]
    fn test_global_initialize_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = LoggingRuntime::global();

        runtime.initialize(&LogOptions {
            tool: "globaltool".into(),
            level: LevelFilter::DEBUG,
            logs_dir: dir.path().to_path_buf(),
            disable_file_logging: false,
        });

        assert!(dir.path().join("globaltool.log").exists());
        // Leave the global slot empty so the tempdir can be removed
        runtime.slot.replace(None);
    }

    #[test]
    fn test_disable_file_logging_creates_dir_only() {
        let dir = tempfile::tempdir().unwrap();
        let logs_dir = dir.path().join("logs");
        let runtime = LoggingRuntime::global();

        runtime.initialize(&LogOptions {
            tool: "shytool".into(),
            level: LevelFilter::INFO,
            logs_dir: logs_dir.clone(),
            disable_file_logging: true,
        });

        assert!(logs_dir.is_dir());
        assert!(!logs_dir.join("shytool.log").exists());
    }
}
