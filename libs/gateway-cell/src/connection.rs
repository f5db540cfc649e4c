use std::io;
use std::net::SocketAddr;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{debug, error, info, instrument, warn};

use shared_models::{AppError, Session};

use crate::codec::{ProtocolError, Response};
use crate::router::Dispatcher;

/// Longest request line accepted, newline excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

const FALLBACK_ERR: &str = "{\"Statu\":\"err\",\"data\":{\"err_info\":\"internal error\"}}\n";

#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Line(String),
    TooLong,
    Closed,
}

/// Serves one client until it disconnects or a read fails.
///
/// The session lives only as long as this call. Each line is dispatched on the
/// blocking pool; the session moves into the blocking task and back out with
/// the response. An over-long line gets an `err` and is skipped up to its
/// newline.
#[instrument(name = "connection", skip_all, fields(peer = %peer))]
pub async fn handle_connection<S>(stream: S, peer: SocketAddr, dispatcher: Dispatcher)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut session = Session::default();
    info!("Connection opened");

    loop {
        let line = match read_frame(&mut reader, &mut buf).await {
            Ok(Frame::Line(line)) => line,
            Ok(Frame::Closed) => break,
            Ok(Frame::TooLong) => {
                warn!("Request longer than {} bytes", MAX_LINE_BYTES);
                let response = Response::err(&AppError::from(ProtocolError::LineTooLong));
                if let Err(e) = write_response(&mut writer, &response).await {
                    warn!("Write failed: {}", e);
                    break;
                }
                match discard_line(&mut reader).await {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(e) => {
                        warn!("Read failed: {}", e);
                        break;
                    }
                }
            }
            Err(e) => {
                warn!("Read failed: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let worker = dispatcher.clone();
        let dispatched = tokio::task::spawn_blocking(move || {
            let response = worker.handle_line(&mut session, &line);
            (session, response)
        })
        .await;

        let response = match dispatched {
            Ok((returned, response)) => {
                session = returned;
                response
            }
            Err(e) => {
                error!("Request task failed: {}", e);
                session = Session::default();
                Response::err(&AppError::Internal(e.to_string()))
            }
        };
        debug!(ok = response.is_ok(), "Request handled");

        if let Err(e) = write_response(&mut writer, &response).await {
            warn!("Write failed: {}", e);
            break;
        }
    }

    info!("Connection closed");
}

async fn write_response<W>(writer: &mut W, response: &Response) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let encoded = response.to_line().unwrap_or_else(|e| {
        error!("{}", e);
        FALLBACK_ERR.to_string()
    });
    writer.write_all(encoded.as_bytes()).await?;
    writer.flush().await
}

/// Reads one line of at most [`MAX_LINE_BYTES`]. A final line without a
/// newline still counts.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = MAX_LINE_BYTES as u64 + 1;
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(Frame::Closed);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > MAX_LINE_BYTES {
        return Ok(Frame::TooLong);
    }
    Ok(Frame::Line(String::from_utf8_lossy(buf).into_owned()))
}

/// Drops input through the next newline. Returns `false` at end of stream.
async fn discard_line<R>(reader: &mut R) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(false);
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(true);
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_split_on_newlines() {
        let mut input: &[u8] = b"first\r\nsecond\nlast";
        let mut buf = Vec::new();

        assert_eq!(read_frame(&mut input, &mut buf).await.unwrap(), Frame::Line("first".into()));
        assert_eq!(read_frame(&mut input, &mut buf).await.unwrap(), Frame::Line("second".into()));
        assert_eq!(read_frame(&mut input, &mut buf).await.unwrap(), Frame::Line("last".into()));
        assert_eq!(read_frame(&mut input, &mut buf).await.unwrap(), Frame::Closed);
    }

    #[tokio::test]
    async fn long_lines_are_cut_and_skipped() {
        let mut data = vec![b'x'; MAX_LINE_BYTES + 10];
        data.extend_from_slice(b"\nnext\n");
        let mut input: &[u8] = &data;
        let mut buf = Vec::new();

        assert_eq!(read_frame(&mut input, &mut buf).await.unwrap(), Frame::TooLong);
        assert!(buf.len() <= MAX_LINE_BYTES + 1);
        assert!(discard_line(&mut input).await.unwrap());
        assert_eq!(read_frame(&mut input, &mut buf).await.unwrap(), Frame::Line("next".into()));
    }

    #[tokio::test]
    async fn a_line_at_the_limit_is_accepted() {
        let mut data = vec![b'x'; MAX_LINE_BYTES];
        data.push(b'\n');
        let mut input: &[u8] = &data;
        let mut buf = Vec::new();

        let frame = read_frame(&mut input, &mut buf).await.unwrap();
        assert_eq!(frame, Frame::Line("x".repeat(MAX_LINE_BYTES)));
    }

    #[tokio::test]
    async fn discarding_stops_at_end_of_stream() {
        let mut input: &[u8] = b"no newline here";
        assert!(!discard_line(&mut input).await.unwrap());
    }
}
