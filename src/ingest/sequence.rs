//! Lazily decoded frame files from an extraction directory.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::codec;
use crate::frame::IndexedFrame;

/// Ordered frame files, decoded one at a time.
///
/// Owns the temporary directory the files live in. The directory is removed
/// once the sequence is exhausted or dropped, whichever comes first.
#[derive(Debug)]
pub struct FrameSequence {
    dir: Option<TempDir>,
    files: std::vec::IntoIter<PathBuf>,
    position: usize,
    len: usize,
}

impl FrameSequence {
    /// Sequence with no frames and no backing directory.
    pub fn empty() -> Self {
        Self {
            dir: None,
            files: Vec::new().into_iter(),
            position: 0,
            len: 0,
        }
    }

    /// Take ownership of `dir` and list its `.jpg` files in natural order.
    pub fn from_dir(dir: TempDir) -> Result<Self> {
        let files = list_frames(dir.path())?;
        let len = files.len();
        Ok(Self {
            dir: Some(dir),
            files: files.into_iter(),
            position: 0,
            len,
        })
    }

    /// Number of frame files found at construction.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Backing directory, while it still exists.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }

    fn release(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(err) = dir.close() {
                log::warn!("failed to remove frame dir {}: {}", path.display(), err);
            }
        }
    }
}

impl Iterator for FrameSequence {
    type Item = IndexedFrame;

    fn next(&mut self) -> Option<IndexedFrame> {
        for path in self.files.by_ref() {
            let index = self.position;
            self.position += 1;
            match codec::decode(&path) {
                Ok(buffer) => return Some(IndexedFrame::new(index, buffer)),
                Err(err) => log::warn!("skipping frame {} ({}): {:#}", index, path.display(), err),
            }
        }
        self.release();
        None
    }
}

impl Drop for FrameSequence {
    fn drop(&mut self) {
        self.release();
    }
}

fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("read frame dir {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.context("read frame dir entry")?.path();
        let is_jpg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg"));
        if is_jpg && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare names so that digit runs order by numeric value (`frame_2` < `frame_10`).
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_digits(&mut a);
                let right = take_digits(&mut b);
                let l = left.trim_start_matches('0');
                let r = right.trim_start_matches('0');
                let ord = l
                    .len()
                    .cmp(&r.len())
                    .then_with(|| l.cmp(r))
                    .then_with(|| left.len().cmp(&right.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        digits.push(c);
    }
    digits
}
