//! Upload signature sniffing.
//!
//! MP4-family files start with a `ftyp` box: a 4-byte big-endian size
//! followed by the ASCII box type. Only the first 12 bytes are inspected.

use std::io::SeekFrom;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use crate::error::{MediaError, MediaResult};

/// Length of the inspected prefix.
pub const HEADER_LEN: usize = 12;

const FTYP: &[u8; 4] = b"ftyp";

/// Check that `stream` looks like MP4-family media.
///
/// The stream is rewound to offset 0 afterwards, whether or not the check
/// passes. `None` (no upload attached) is invalid media; read or seek
/// failures are reported as [`MediaError::Io`].
pub async fn validate_media<R>(stream: Option<&mut R>) -> MediaResult<()>
where
    R: AsyncRead + AsyncSeek + Unpin + ?Sized,
{
    let stream = stream.ok_or_else(|| MediaError::invalid_media("no media stream"))?;

    let mut header = [0u8; HEADER_LEN];
    let len = read_prefix(stream, &mut header).await?;

    stream.seek(SeekFrom::Start(0)).await?;

    if has_ftyp_signature(&header[..len]) {
        Ok(())
    } else {
        Err(MediaError::invalid_media("missing ftyp signature"))
    }
}

/// Whether the bytes after the 4-byte size field contain `ftyp`.
pub fn has_ftyp_signature(header: &[u8]) -> bool {
    header
        .get(4..)
        .is_some_and(|rest| rest.windows(FTYP.len()).any(|w| w == FTYP))
}

/// Fill `buf` as far as the stream allows, tolerating short reads.
async fn read_prefix<R>(stream: &mut R, buf: &mut [u8]) -> MediaResult<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
