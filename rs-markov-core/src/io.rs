use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{MarkovError, Result};
use crate::model::snapshot::ModelSnapshot;

/// Reads a whole UTF-8 corpus file.
///
/// # Errors
/// Returns `CorpusSource` carrying the path if the file cannot be read.
pub fn read_corpus_file<P: AsRef<Path>>(path: P) -> Result<String> {
	let path = path.as_ref();
	fs::read_to_string(path).map_err(|source| MarkovError::CorpusSource { path: path.to_path_buf(), source })
}

/// Appends one line to a corpus file, creating it if needed.
pub fn append_line<P: AsRef<Path>>(path: P, line: &str) -> Result<()> {
	let mut file = OpenOptions::new().create(true).append(true).open(path)?;
	writeln!(file, "{}", line)?;
	Ok(())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/message_log.txt` + `"bin"` → `data/message_log.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Serializes a snapshot with `postcard`.
///
/// The bytes go to a temporary sibling first and are renamed into place, so
/// a reader never sees a half-written cache.
pub fn save_snapshot<P: AsRef<Path>>(path: P, snapshot: &ModelSnapshot) -> Result<()> {
	let path = path.as_ref();
	let bytes = postcard::to_stdvec(snapshot)?;
	let tmp = path.with_extension("tmp");
	fs::write(&tmp, bytes)?;
	fs::rename(&tmp, path)?;
	Ok(())
}

/// Loads a snapshot written by [`save_snapshot`].
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<ModelSnapshot> {
	let bytes = fs::read(path)?;
	Ok(postcard::from_bytes(&bytes)?)
}
