//! Content store
//!
//! Blobs live in `b<branch>/r<revision>/<nameHash>` below the metadata folder.
//! A blob is only written in the revision that changed the file, so reading a
//! file at a revision scans backwards until its blob is found.

use crate::errors::RepoError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const BUFFER_SIZE: usize = 1 << 20;
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug)]
pub struct Store {
    path: Box<Path>,
}

/// Destination of a blob write, optionally zlib-compressed
enum BlobWriter {
    Plain(BufWriter<File>),
    Zlib(flate2::write::ZlibEncoder<BufWriter<File>>),
}

impl BlobWriter {
    fn create(path: &Path, compress: bool) -> anyhow::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .with_context(|| format!("Unable to create blob file {}", path.display()))?;
        let file = BufWriter::new(file);

        Ok(if compress {
            BlobWriter::Zlib(flate2::write::ZlibEncoder::new(
                file,
                flate2::Compression::default(),
            ))
        } else {
            BlobWriter::Plain(file)
        })
    }

    fn write_all(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        match self {
            BlobWriter::Plain(writer) => writer.write_all(chunk),
            BlobWriter::Zlib(writer) => writer.write_all(chunk),
        }
    }

    fn finish(self) -> std::io::Result<()> {
        match self {
            BlobWriter::Plain(mut writer) => writer.flush(),
            BlobWriter::Zlib(writer) => writer.finish()?.flush(),
        }
    }
}

/// Source of a blob read, transparently decompressing
enum BlobReader {
    Plain(BufReader<File>),
    Zlib(flate2::read::ZlibDecoder<BufReader<File>>),
}

impl Read for BlobReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            BlobReader::Plain(reader) => reader.read(buf),
            BlobReader::Zlib(reader) => reader.read(buf),
        }
    }
}

impl Store {
    pub fn new(path: Box<Path>) -> Self {
        Store { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn branch_path(&self, branch: usize) -> PathBuf {
        self.path.join(format!("b{}", branch))
    }

    pub fn revision_path(&self, branch: usize, revision: usize) -> PathBuf {
        self.branch_path(branch).join(format!("r{}", revision))
    }

    pub fn blob_path(&self, branch: usize, revision: usize, name_hash: &str) -> PathBuf {
        self.revision_path(branch, revision).join(name_hash)
    }

    /// Stable key for a repository-relative path
    pub fn hash_str(value: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(value.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Hash a file in bounded chunks, writing it to `save_to` on the way.
    ///
    /// Returns the content hash and the number of bytes written to the blob.
    /// Empty files never produce a blob. An already existing `save_to` means two
    /// distinct files mapped to the same blob name and is an integrity error.
    pub fn hash_file(
        &self,
        path: &Path,
        compress: bool,
        save_to: Option<&Path>,
    ) -> anyhow::Result<(String, u64)> {
        let file =
            File::open(path).with_context(|| format!("Unable to open file {}", path.display()))?;
        let size = file
            .metadata()
            .with_context(|| format!("Unable to stat file {}", path.display()))?
            .len();
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

        let save_to = save_to.filter(|_| size > 0);
        if let Some(target) = save_to
            && target.exists()
        {
            return Err(RepoError::integrity(format!(
                "Hash conflict: blob {} already exists while storing {}",
                target.display(),
                path.display()
            ))
            .into());
        }

        let temp_path = match save_to {
            Some(target) => Some(
                target
                    .parent()
                    .with_context(|| format!("Invalid blob path {}", target.display()))?
                    .join(Self::generate_temp_name()),
            ),
            None => None,
        };

        let result = Self::stream_blob(path, &mut reader, compress, temp_path.as_deref(), save_to);
        if result.is_err()
            && let Some(temp_path) = &temp_path
        {
            let _ = std::fs::remove_file(temp_path);
        }

        result
    }

    fn stream_blob(
        path: &Path,
        reader: &mut impl Read,
        compress: bool,
        temp_path: Option<&Path>,
        save_to: Option<&Path>,
    ) -> anyhow::Result<(String, u64)> {
        let mut writer = match temp_path {
            Some(temp_path) => Some(BlobWriter::create(temp_path, compress)?),
            None => None,
        };

        let mut hasher = Sha1::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            let read = reader
                .read(&mut buffer)
                .with_context(|| format!("Unable to read file {}", path.display()))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
            if let Some(writer) = writer.as_mut() {
                writer
                    .write_all(&buffer[..read])
                    .context("Unable to write blob content")?;
            }
        }

        let mut written = 0;
        if let (Some(writer), Some(temp_path), Some(target)) = (writer, temp_path, save_to) {
            writer.finish().context("Unable to finish blob content")?;
            written = std::fs::metadata(temp_path)?.len();
            std::fs::rename(temp_path, target)
                .with_context(|| format!("Unable to rename blob file to {}", target.display()))?;
        }

        Ok((format!("{:x}", hasher.finalize()), written))
    }

    /// Walk back from `revision` to the revision that physically holds the blob
    pub fn find_physical_revision(
        &self,
        branch: usize,
        revision: usize,
        name_hash: &str,
    ) -> anyhow::Result<(usize, PathBuf)> {
        for candidate in (0..=revision).rev() {
            let path = self.blob_path(branch, candidate, name_hash);
            if path.exists() {
                return Ok((candidate, path));
            }
        }

        Err(RepoError::integrity(format!(
            "Blob {} not found in branch b{} at or before revision r{}",
            name_hash, branch, revision
        ))
        .into())
    }

    /// Read a versioned file, or stream it into `to_file` in bounded chunks.
    ///
    /// A missing blob is fatal, while I/O errors on an existing blob are only
    /// logged and reported as `None`. After a successful copy to `to_file` the
    /// returned bytes are empty.
    pub fn read_or_copy(
        &self,
        branch: usize,
        revision: usize,
        name_hash: &str,
        compress: bool,
        to_file: Option<&Path>,
    ) -> anyhow::Result<Option<Bytes>> {
        let (_, source) = self.find_physical_revision(branch, revision, name_hash)?;

        let result = Self::open_blob(&source, compress).and_then(|mut reader| match to_file {
            Some(target) => {
                Self::copy_to(&mut reader, target)?;
                Ok(Bytes::new())
            }
            None => {
                let mut content = Vec::new();
                reader
                    .read_to_end(&mut content)
                    .with_context(|| format!("Unable to read blob {}", source.display()))?;
                Ok(Bytes::from(content))
            }
        });

        match result {
            Ok(content) => Ok(Some(content)),
            Err(error) => {
                tracing::warn!("{:#}", error);
                Ok(None)
            }
        }
    }

    /// Copy an existing blob into another revision folder without recompressing
    pub fn copy_versioned(
        &self,
        (branch, revision): (usize, usize),
        (target_branch, target_revision): (usize, usize),
        name_hash: &str,
    ) -> anyhow::Result<()> {
        let (_, source) = self.find_physical_revision(branch, revision, name_hash)?;
        let target = self.blob_path(target_branch, target_revision, name_hash);
        std::fs::copy(&source, &target).with_context(|| {
            format!(
                "Unable to copy blob {} to {}",
                source.display(),
                target.display()
            )
        })?;

        Ok(())
    }

    fn open_blob(path: &Path, compress: bool) -> anyhow::Result<BlobReader> {
        let file =
            File::open(path).with_context(|| format!("Unable to open blob {}", path.display()))?;
        let reader = BufReader::with_capacity(BUFFER_SIZE, file);

        Ok(if compress {
            BlobReader::Zlib(flate2::read::ZlibDecoder::new(reader))
        } else {
            BlobReader::Plain(reader)
        })
    }

    /// Decode into a sibling temp file first, so a bad blob never clobbers `target`
    fn copy_to(reader: &mut BlobReader, target: &Path) -> anyhow::Result<()> {
        let parent = target
            .parent()
            .with_context(|| format!("Invalid target path {}", target.display()))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create directory {}", parent.display()))?;
        let temp_path = parent.join(Self::generate_temp_name());

        let result = Self::decode_into(reader, &temp_path).and_then(|_| {
            std::fs::rename(&temp_path, target)
                .with_context(|| format!("Unable to rename temp file to {}", target.display()))
        });
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }

        result
    }

    fn decode_into(reader: &mut BlobReader, path: &Path) -> anyhow::Result<()> {
        let mut file = BufWriter::new(
            std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .with_context(|| format!("Unable to create file {}", path.display()))?,
        );

        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            let read = reader.read(&mut buffer).context("Unable to read blob")?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])
                .with_context(|| format!("Unable to write file {}", path.display()))?;
        }
        file.flush()?;

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-blob-{}", rand::random::<u32>())
    }
}
