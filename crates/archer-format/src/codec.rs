use std::io::{self, Read};

/// Compression codec of a single-file compressor format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Codec {
    Gzip,
    Bzip2,
    Xz,
    Lzip,
    Lzop,
    Zstd,
}

impl Codec {
    /// Wrap `reader` in an in-process decoder, if this build carries one.
    ///
    /// Returns `None` for codecs that can only be decoded by an external tool.
    pub fn decoder<R: Read + 'static>(self, reader: R) -> Option<io::Result<Decoder>> {
        match self {
            #[cfg(feature = "gzip")]
            Self::Gzip => {
                let decoder = flate2::read::MultiGzDecoder::new(reader);
                Some(Ok(Decoder::new(decoder)))
            }
            #[cfg(feature = "bzip2")]
            Self::Bzip2 => {
                let decoder = bzip2::read::MultiBzDecoder::new(reader);
                Some(Ok(Decoder::new(decoder)))
            }
            #[cfg(feature = "xz")]
            Self::Xz => {
                let stream = match xz2::stream::Stream::new_auto_decoder(u64::MAX, 0) {
                    Ok(stream) => stream,
                    Err(err) => return Some(Err(io::Error::other(err))),
                };
                let decoder = xz2::read::XzDecoder::new_stream(reader, stream);
                Some(Ok(Decoder::new(decoder)))
            }
            #[cfg(feature = "zstd")]
            Self::Zstd => Some(zstd::stream::read::Decoder::new(reader).map(Decoder::new)),
            _ => {
                drop(reader);
                None
            }
        }
    }
}

/// In-process decoder for a [`Codec`].
pub struct Decoder {
    inner: Box<dyn Read>,
}

impl Decoder {
    #[cfg_attr(
        not(any(feature = "gzip", feature = "bzip2", feature = "xz", feature = "zstd")),
        allow(dead_code)
    )]
    fn new(inner: impl Read + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Read for Decoder {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn external_only_codecs_have_no_decoder() {
        assert!(Codec::Lzip.decoder(Cursor::new(Vec::new())).is_none());
        assert!(Codec::Lzop.decoder(Cursor::new(Vec::new())).is_none());
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn gzip_decoder_roundtrip() {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"hello").unwrap();
        let data = encoder.finish().unwrap();

        let mut decoder = Codec::Gzip.decoder(Cursor::new(data)).unwrap().unwrap();
        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn gzip_decoder_rejects_garbage() {
        let mut decoder = Codec::Gzip
            .decoder(Cursor::new(b"not gzip at all".to_vec()))
            .unwrap()
            .unwrap();
        let mut out = Vec::new();
        assert!(decoder.read_to_end(&mut out).is_err());
    }
}
