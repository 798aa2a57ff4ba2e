//! Discovery of the `pg_worker` binary used when tests run as root.

use camino::Utf8PathBuf;

const WORKER_NAME: &str = "pg_worker";

/// Finds the worker built with this package, then one on `PATH`.
pub(super) fn locate_worker() -> Option<Utf8PathBuf> {
    option_env!("CARGO_BIN_EXE_pg_worker")
        .map(Utf8PathBuf::from)
        .filter(|path| path.is_file())
        .or_else(worker_beside_test_binary)
        .or_else(worker_on_path)
}

/// `target/<profile>/pg_worker`, next to the `deps/` directory holding the
/// test binary.
fn worker_beside_test_binary() -> Option<Utf8PathBuf> {
    let test_binary = Utf8PathBuf::from_path_buf(std::env::current_exe().ok()?).ok()?;
    let candidate = test_binary.parent()?.parent()?.join(WORKER_NAME);
    candidate.is_file().then_some(candidate)
}

fn worker_on_path() -> Option<Utf8PathBuf> {
    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .filter_map(|directory| Utf8PathBuf::from_path_buf(directory.join(WORKER_NAME)).ok())
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::locate_worker;

    #[test]
    fn worker_built_with_the_package_is_found() {
        let worker = locate_worker().expect("pg_worker should be built for integration tests");
        assert_eq!(worker.file_name(), Some("pg_worker"));
    }
}
