//! Input acquisition.
//!
//! The parsing core never touches I/O. Bytes come in through [`Fetcher`],
//! text embedded in foreign containers comes out through [`Extractor`],
//! and [`Loader`] composes the two above [`HumdrumFile::parse`]. Shorthand
//! data-library URIs are expanded to plain URLs first, so a
//! network-capable fetcher only ever sees real locations.

use std::fs;

use crate::error::{ExtractionError, FetchError, LoadError};
use crate::file::HumdrumFile;

/// Byte source for a named input (path or URL).
pub trait Fetcher {
    fn fetch(&self, source: &str) -> Result<Vec<u8>, FetchError>;
}

/// Pulls Humdrum text out of a foreign container (a PDF with an embedded
/// score, for instance).
pub trait Extractor {
    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError>;
}

/// Local filesystem fetcher. Accepts plain paths and `file://` URIs and
/// refuses anything with another scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch(&self, source: &str) -> Result<Vec<u8>, FetchError> {
        let path = match source.strip_prefix("file://") {
            Some(rest) => rest,
            None if source.contains("://") => {
                return Err(FetchError::UnsupportedScheme {
                    uri: source.to_string(),
                });
            }
            None => source,
        };
        fs::read(path).map_err(|e| FetchError::Io {
            path: path.to_string(),
            source: e,
        })
    }
}

/// Expand the shorthand data-library schemes to web URLs.
///
/// `humdrum://location/file` and its abbreviation `h://` address the kern
/// data service; `jrp://id` addresses the JRP database. Plain http(s) URLs
/// pass through unchanged. Anything else yields `None`.
pub fn uri_to_url(uri: &str) -> Option<String> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return Some(uri.to_string());
    }
    if let Some(id) = uri.strip_prefix("jrp://") {
        return Some(format!("http://jrp.ccarh.org/cgi-bin/jrp?a=humdrum&f={}", id));
    }
    let rest = uri
        .strip_prefix("humdrum://")
        .or_else(|| uri.strip_prefix("h://"))?;
    match rest.rsplit_once('/') {
        Some((location, file)) => Some(format!(
            "http://kern.ccarh.org/cgi-bin/ksdata?l={}&file={}&format=kern",
            location, file
        )),
        None => Some(format!(
            "http://kern.ccarh.org/cgi-bin/ksdata?file={}&format=kern",
            rest
        )),
    }
}

/// Loads Humdrum files through an injected fetcher.
#[derive(Debug, Clone, Default)]
pub struct Loader<F: Fetcher> {
    fetcher: F,
}

impl<F: Fetcher> Loader<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetch and parse one input. Input bytes are taken as UTF-8; stray
    /// bytes from legacy encodings are replaced, not fatal.
    pub fn load(&self, source: &str) -> Result<HumdrumFile, LoadError> {
        let target = uri_to_url(source).unwrap_or_else(|| source.to_string());
        let bytes = self.fetcher.fetch(&target)?;
        Ok(HumdrumFile::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Fetch a foreign container and parse the Humdrum text extracted
    /// from it.
    pub fn load_embedded<E: Extractor>(
        &self,
        source: &str,
        extractor: &E,
    ) -> Result<HumdrumFile, LoadError> {
        let target = uri_to_url(source).unwrap_or_else(|| source.to_string());
        let bytes = self.fetcher.fetch(&target)?;
        let text = extractor.extract(&bytes)?;
        Ok(HumdrumFile::parse(&text))
    }
}
