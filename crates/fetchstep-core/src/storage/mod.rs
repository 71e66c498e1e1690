//! Staging files for transfers.
//!
//! Bytes are written to `<target>.part` and only renamed onto the target once the
//! transfer has finished and been synced, so an abandoned or failed transfer never
//! leaves a truncated file where a valid artifact is expected.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.iso` → `file.iso.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("file.iso"));
        assert_eq!(p.to_string_lossy(), "file.iso.part");
        let p2 = temp_path(Path::new("/tmp/archive.zip"));
        assert_eq!(p2.to_string_lossy(), "/tmp/archive.zip.part");
    }

    #[test]
    fn sequential_writes_then_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.bin");
        let tp = temp_path(&final_path);

        let writer = StorageWriterBuilder::create(&tp).unwrap().build();
        writer.append(b"hello ").unwrap();
        writer.append(b"world").unwrap();
        assert_eq!(writer.written(), 11);
        writer.sync().unwrap();
        writer.finalize(&final_path).unwrap();

        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"hello world");
    }

    #[test]
    fn create_makes_parent_dirs_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("a/b/out.part");
        let w = StorageWriterBuilder::create(&tp).unwrap().build();
        w.append(b"stale data").unwrap();
        drop(w);

        let w = StorageWriterBuilder::create(&tp).unwrap().build();
        w.append(b"new").unwrap();
        w.sync().unwrap();
        assert_eq!(std::fs::read(&tp).unwrap(), b"new");
    }

    #[test]
    fn discard_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("out.part");
        let w = StorageWriterBuilder::create(&tp).unwrap().build();
        w.append(b"partial").unwrap();
        w.discard();
        assert!(!tp.exists());
    }
}
