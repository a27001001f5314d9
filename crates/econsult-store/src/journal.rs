//! JSON-lines journal: one serialized [`Comment`] per line, append-only.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use econsult_core::Comment;

use crate::StoreError;

#[derive(Debug)]
pub(crate) struct Journal {
    path: PathBuf,
    file: File,
    /// Length of the journal up to the last complete entry.
    len: u64,
}

impl Journal {
    /// Open (or create) the journal at `path` and return every stored comment.
    ///
    /// The file is read as bytes, so a write interrupted inside a multibyte
    /// character still replays. A final line without a trailing newline that
    /// fails to parse is treated as an interrupted write and truncated away.
    /// Any other bad line is an error, and every entry must pass
    /// [`Comment::check`].
    pub(crate) fn open(path: &Path) -> Result<(Self, Vec<Comment>), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;

        let mut comments = Vec::new();
        let mut good_len = 0_usize;
        let mut offset = 0_usize;

        for (index, raw) in content.split_inclusive(|b| *b == b'\n').enumerate() {
            let line = index + 1;
            offset += raw.len();
            let terminated = raw.ends_with(b"\n");
            let body = raw.trim_ascii();

            if body.is_empty() {
                good_len = offset;
                continue;
            }

            match serde_json::from_slice::<Comment>(body) {
                Ok(comment) => {
                    let expected = comments.len() as u64 + 1;
                    if comment.id != expected {
                        return Err(StoreError::OutOfOrder {
                            line,
                            expected,
                            found: comment.id,
                        });
                    }
                    comment
                        .check()
                        .map_err(|source| StoreError::InvalidEntry { line, source })?;
                    comments.push(comment);
                    good_len = offset;
                }
                Err(source) if !terminated => {
                    tracing::warn!(
                        path = %path.display(),
                        line,
                        error = %source,
                        "dropping torn final journal entry"
                    );
                    file.set_len(good_len as u64)?;
                }
                Err(source) => return Err(StoreError::Journal { line, source }),
            }
        }

        let mut len = good_len as u64;
        if !content.is_empty() && !content.ends_with(b"\n") && good_len == content.len() {
            // Last entry parsed but lacks its newline; terminate it so the next
            // append starts on a fresh line.
            file.write_all(b"\n")?;
            len += 1;
        }

        tracing::info!(
            path = %path.display(),
            comments = comments.len(),
            "replayed comment journal"
        );

        Ok((
            Self {
                path: path.to_path_buf(),
                file,
                len,
            },
            comments,
        ))
    }

    /// Write one comment as a single line.
    ///
    /// On a failed write the file is cut back to the previous entry so a torn
    /// line never precedes later appends.
    pub(crate) fn append(&mut self, comment: &Comment) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(comment).map_err(StoreError::Encode)?;
        line.push(b'\n');

        if let Err(e) = self.file.write_all(&line) {
            if let Err(truncate_err) = self.file.set_len(self.len) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %truncate_err,
                    "failed to roll back torn journal write"
                );
            }
            return Err(StoreError::Io(e));
        }

        self.len += line.len() as u64;
        Ok(())
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}
