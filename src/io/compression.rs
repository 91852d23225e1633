//! Transparent compression for input and output files.
//!
//! Inputs are recognised by file extension first and by magic bytes second, so
//! a gzipped file without a `.gz` suffix still reads correctly. Outputs are
//! compressed only when their extension asks for it.
//!
//! Each codec is behind a feature flag:
//! - **Gzip** (`.gz`) - `compression-gzip`, via `flate2`
//! - **Zstd** (`.zst`) - `compression-zstd`, via `zstd`
//! - **Bzip2** (`.bz2`) - `compression-bzip2`, via `bzip2`
//! - **Xz** (`.xz`) - `compression-xz`, via `xz2`
//!
//! A file that is recognised as compressed with a codec that was not compiled
//! in is an error rather than being read as garbage.
//!
//! Output writers are [`FinishWrite`] objects: call [`FinishWrite::finish`]
//! once everything is written, so that trailer and flush failures surface as
//! errors instead of being lost when the writer is dropped.

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A writer whose stream has to be completed explicitly.
pub trait FinishWrite: Write {
    /// Write any trailer, flush every layer down to the file and report the
    /// first failure.
    ///
    /// # Errors
    /// Returns the error of whichever layer failed to complete.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// Boxed output stream, possibly compressed.
pub type OutputWriter = Box<dyn FinishWrite>;

impl<W: Write> FinishWrite for BufWriter<W> {
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

#[cfg(feature = "compression-gzip")]
impl FinishWrite for flate2::write::GzEncoder<OutputWriter> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        flate2::write::GzEncoder::finish(*self)?.finish()
    }
}

#[cfg(feature = "compression-zstd")]
impl FinishWrite for zstd::stream::write::Encoder<'static, OutputWriter> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        zstd::stream::write::Encoder::finish(*self)?.finish()
    }
}

#[cfg(feature = "compression-bzip2")]
impl FinishWrite for bzip2::write::BzEncoder<OutputWriter> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        bzip2::write::BzEncoder::finish(*self)?.finish()
    }
}

#[cfg(feature = "compression-xz")]
impl FinishWrite for xz2::write::XzEncoder<OutputWriter> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        xz2::write::XzEncoder::finish(*self)?.finish()
    }
}

/// Supported compression formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Gzip,
    Zstd,
    Bzip2,
    Xz,
}

const ALL: [Codec; 4] = [Codec::Gzip, Codec::Zstd, Codec::Bzip2, Codec::Xz];

impl Codec {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
        }
    }

    /// Lowercase extensions, with the leading dot.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Gzip => &[".gz", ".gzip"],
            Self::Zstd => &[".zst", ".zstd"],
            Self::Bzip2 => &[".bz2", ".bzip2"],
            Self::Xz => &[".xz"],
        }
    }

    #[must_use]
    pub const fn magic_bytes(self) -> &'static [u8] {
        match self {
            Self::Gzip => &[0x1f, 0x8b],
            Self::Zstd => &[0x28, 0xb5, 0x2f, 0xfd],
            Self::Bzip2 => b"BZh",
            Self::Xz => &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00],
        }
    }

    /// Whether support for this codec was compiled in.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        match self {
            Self::Gzip => cfg!(feature = "compression-gzip"),
            Self::Zstd => cfg!(feature = "compression-zstd"),
            Self::Bzip2 => cfg!(feature = "compression-bzip2"),
            Self::Xz => cfg!(feature = "compression-xz"),
        }
    }

    /// Codec implied by the file name, matched case-insensitively.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().to_string_lossy().to_lowercase();
        ALL.into_iter()
            .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
    }

    /// Codec whose signature starts `buf`.
    #[must_use]
    pub fn from_magic(buf: &[u8]) -> Option<Self> {
        ALL.into_iter().find(|c| buf.starts_with(c.magic_bytes()))
    }

    fn unsupported(self) -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            format!(
                "{} support is not compiled in (enable feature `compression-{}`)",
                self.name(),
                self.name()
            ),
        )
    }

    /// Wrap `reader` with a decompressor.
    ///
    /// # Errors
    /// Fails when the codec is not compiled in or the stream header is invalid.
    #[allow(unreachable_patterns)]
    pub fn wrap_reader(self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        match self {
            #[cfg(feature = "compression-gzip")]
            Self::Gzip => Ok(Box::new(flate2::read::MultiGzDecoder::new(reader))),
            #[cfg(feature = "compression-zstd")]
            Self::Zstd => Ok(Box::new(zstd::stream::read::Decoder::new(reader)?)),
            #[cfg(feature = "compression-bzip2")]
            Self::Bzip2 => Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader))),
            #[cfg(feature = "compression-xz")]
            Self::Xz => Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader))),
            other => Err(other.unsupported()),
        }
    }

    /// Wrap `writer` with a compressor. The stream is complete only after
    /// [`FinishWrite::finish`].
    ///
    /// # Errors
    /// Fails when the codec is not compiled in.
    #[allow(unreachable_patterns)]
    pub fn wrap_writer(self, writer: OutputWriter) -> io::Result<OutputWriter> {
        match self {
            #[cfg(feature = "compression-gzip")]
            Self::Gzip => Ok(Box::new(flate2::write::GzEncoder::new(
                writer,
                flate2::Compression::default(),
            ))),
            #[cfg(feature = "compression-zstd")]
            Self::Zstd => Ok(Box::new(zstd::stream::write::Encoder::new(writer, 3)?)),
            #[cfg(feature = "compression-bzip2")]
            Self::Bzip2 => Ok(Box::new(bzip2::write::BzEncoder::new(
                writer,
                bzip2::Compression::default(),
            ))),
            #[cfg(feature = "compression-xz")]
            Self::Xz => Ok(Box::new(xz2::write::XzEncoder::new(writer, 6))),
            other => Err(other.unsupported()),
        }
    }
}

/// Open `reader` for reading, decompressing when the path or content says so.
///
/// # Errors
/// Fails when the detected codec is unavailable.
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> io::Result<Box<dyn Read>> {
    if let Some(codec) = Codec::from_path(&path_hint) {
        return codec.wrap_reader(Box::new(BufReader::new(reader)));
    }
    let mut buffered = BufReader::new(reader);
    let codec = Codec::from_magic(buffered.fill_buf()?);
    match codec {
        Some(codec) => codec.wrap_reader(Box::new(buffered)),
        None => Ok(Box::new(buffered)),
    }
}

/// Open `writer` for writing, compressing when the path extension says so.
///
/// # Errors
/// Fails when the codec implied by the extension is unavailable.
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> io::Result<OutputWriter> {
    let buffered: OutputWriter = Box::new(BufWriter::new(writer));
    match Codec::from_path(path_hint) {
        Some(codec) => codec.wrap_writer(buffered),
        None => Ok(buffered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection_is_case_insensitive() {
        assert_eq!(Codec::from_path("rates.CSV.GZ"), Some(Codec::Gzip));
        assert_eq!(Codec::from_path("rates.csv.zst"), Some(Codec::Zstd));
        assert_eq!(Codec::from_path("rates.csv"), None);
    }

    #[test]
    fn test_plain_csv_header_is_not_mistaken_for_bzip2() {
        assert_eq!(Codec::from_magic(b"BZ,year\n"), None);
        assert_eq!(Codec::from_magic(b"BZh91AY"), Some(Codec::Bzip2));
    }
}
