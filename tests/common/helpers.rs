use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tempfile::TempDir;
use steadyfetch::{DownloaderBuilder, HashAlgorithm, Hasher};

// Common test constants
pub const TEST_URL: &str = "https://example.test/file.bin";
pub const TEST_USER_AGENT: &str = "steadyfetch-test-agent";
pub const TEST_SIZE: usize = 1000;

static TRACING: Once = Once::new();

/// Installs a tracing subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Creates test file content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Creates random test content of specified size
pub fn create_random_content(size: usize) -> Vec<u8> {
    (0..size).map(|_| rand::random::<u8>()).collect()
}

/// Hex digest of `content` under `algorithm`
pub fn digest_of(algorithm: HashAlgorithm, content: &[u8]) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(content);
    hasher.hex_digest()
}

/// Asserts that a file exists at the given path
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "File should exist at path: {:?}", path);
}

/// Asserts that a file holds exactly the expected bytes
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let actual = fs::read(path).expect("Failed to read file");
    assert_eq!(actual.len(), expected.len(), "File size mismatch at path: {:?}", path);
    assert!(actual == expected, "File content mismatch at path: {:?}", path);
}

/// A builder with no backoff, so retry tests run instantly.
pub fn create_fast_retry_builder() -> DownloaderBuilder {
    DownloaderBuilder::new()
        .retry_delay(Duration::ZERO)
        .timeout(Duration::from_secs(5))
        .user_agent(TEST_USER_AGENT)
}

/// Records every progress report for later inspection.
pub fn progress_recorder() -> (Arc<Mutex<Vec<(u64, u64)>>>, impl Fn(u64, u64) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback = move |downloaded: u64, total: u64| {
        sink.lock().unwrap().push((downloaded, total));
    };
    (seen, callback)
}

/// Asserts that progress reports strictly increase and end at `total`.
pub fn assert_progress_monotonic(reports: &[(u64, u64)], total: u64) {
    assert!(!reports.is_empty(), "Expected at least one progress report");
    for pair in reports.windows(2) {
        assert!(
            pair[1].0 > pair[0].0,
            "Progress went from {} to {}",
            pair[0].0,
            pair[1].0
        );
    }
    let last = reports.last().unwrap();
    assert_eq!(last.0, total);
    assert!(reports.iter().all(|(_, t)| *t == total));
}

/// A file name unlikely to collide inside the shared temp directory.
pub fn unique_filename(extension: &str) -> String {
    format!("steadyfetch-test-{:016x}.{}", rand::random::<u64>(), extension)
}
