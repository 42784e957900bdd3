//! One download attempt with libcurl, streaming the body into a staged file.

use crate::retry::FetchError;
use crate::storage::StagedFile;
use std::time::Duration;

use super::source_url::is_file_url;

/// Timeouts for a download attempt.
#[derive(Debug, Clone, Copy)]
pub struct CurlTimeouts {
    pub connect: Duration,
    /// Abort when throughput stays below 1 KiB/s for this long.
    pub low_speed_time: Duration,
    pub total: Duration,
}

impl Default for CurlTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            low_speed_time: Duration::from_secs(60),
            total: Duration::from_secs(3600),
        }
    }
}

/// GET `url` into `staged`, following redirects. Returns the number of bytes written.
pub(crate) fn download_once(
    url: &str,
    staged: &mut StagedFile,
    timeouts: CurlTimeouts,
) -> Result<u64, FetchError> {
    staged.reset()?;
    let mut write_error: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.fail_on_error(false)?;
    easy.connect_timeout(timeouts.connect)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(timeouts.low_speed_time)?;
    easy.timeout(timeouts.total)?;
    easy.useragent(concat!("debrel/", env!("CARGO_PKG_VERSION")))?;

    let perform = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match staged.write_chunk(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };
    if let Some(e) = write_error {
        return Err(FetchError::Storage(e));
    }
    perform?;

    if !is_file_url(url) {
        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
    }

    let received = staged.written();
    let advertised = easy.content_length_download()?;
    if advertised >= 0.0 && advertised as u64 != received {
        return Err(FetchError::PartialTransfer {
            expected: advertised as u64,
            received,
        });
    }
    Ok(received)
}
