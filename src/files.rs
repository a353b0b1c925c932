use std::fs;
use std::io;
use std::path::Path;

/// Make sure the directory holding `path` exists.
///
/// A path with an extension is taken to be a file and its parent is created.
pub fn with_dir(path: impl AsRef<Path>) -> io::Result<()> {
  let path = path.as_ref();
  let dir = if path.extension().is_some() { path.parent().unwrap_or_else(|| Path::new("")) } else { path };

  if dir.as_os_str().is_empty() || dir.exists() {
    return Ok(());
  }
  fs::create_dir_all(dir)
}
