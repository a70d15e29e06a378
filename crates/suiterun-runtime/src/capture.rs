//! Child output capture
//!
//! When a log directory is configured, a test's stdout and stderr are piped
//! and every chunk is copied to both the console and the test's log file.

use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use tokio::fs::File;
use tokio::io::{self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{ChildStderr, ChildStdout};

const CHUNK_SIZE: usize = 8 * 1024;

/// Log file location for a test: dots in the id become directories.
///
/// `suite.sub.test` under `logs` maps to `logs/suite/sub/test.log`.
pub fn log_path_for(log_dir: &Path, test_id: &str) -> PathBuf {
    log_dir.join(format!(
        "{}.log",
        test_id.replace('.', MAIN_SEPARATOR_STR)
    ))
}

/// Copy both child streams to the console and `log` until both close.
pub(crate) async fn tee_output(
    mut stdout: Option<ChildStdout>,
    mut stderr: Option<ChildStderr>,
    log: &mut File,
) -> io::Result<()> {
    let mut console = io::stdout();
    let mut out_buf = vec![0u8; CHUNK_SIZE];
    let mut err_buf = vec![0u8; CHUNK_SIZE];

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            read = read_chunk(&mut stdout, &mut out_buf) => {
                match read? {
                    0 => stdout = None,
                    n => write_both(&mut console, log, &out_buf[..n]).await?,
                }
            }
            read = read_chunk(&mut stderr, &mut err_buf) => {
                match read? {
                    0 => stderr = None,
                    n => write_both(&mut console, log, &err_buf[..n]).await?,
                }
            }
        }
    }

    log.flush().await
}

/// Read from `reader` if it is still open; a closed stream never resolves.
async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
) -> io::Result<usize> {
    match reader {
        Some(reader) => reader.read(buf).await,
        None => std::future::pending().await,
    }
}

async fn write_both<C, L>(console: &mut C, log: &mut L, chunk: &[u8]) -> io::Result<()>
where
    C: AsyncWrite + Unpin,
    L: AsyncWrite + Unpin,
{
    console.write_all(chunk).await?;
    console.flush().await?;
    log.write_all(chunk).await
}
