use std::fmt;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use gramoc_frame::Channel;
use gramoc_payload::Value;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::RetryPolicy;
use crate::connection::Connection;
use crate::error::{ClientError, ErrorKind, Result};
use crate::readout::Readout;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lifecycle of a session.
///
/// `Init -> Handshaking -> Established` on success, `Init -> Handshaking ->
/// Failed` on a rejected handshake, and `Established -> TearingDown -> Closed`
/// on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Handshaking,
    Established,
    Failed,
    TearingDown,
    Closed,
}

impl SessionState {
    pub const fn name(self) -> &'static str {
        match self {
            SessionState::Init => "init",
            SessionState::Handshaking => "handshaking",
            SessionState::Established => "established",
            SessionState::Failed => "failed",
            SessionState::TearingDown => "tearing down",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handshake and teardown state machine over one [`Connection`].
pub struct Session<R, W> {
    conn: Option<Connection<R, W>>,
    state: SessionState,
}

impl<R: Read, W: Write> Session<R, W> {
    /// Wrap an open connection. The session starts in [`SessionState::Init`].
    pub fn new(conn: Connection<R, W>) -> Self {
        Self {
            conn: Some(conn),
            state: SessionState::Init,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Borrow the underlying connection; `None` once closed or after a
    /// connection error.
    pub fn connection(&self) -> Option<&Connection<R, W>> {
        self.conn.as_ref()
    }

    /// Perform one SYN/ACK handshake attempt.
    ///
    /// Sends `SYN`, waits for one reply and answers `ACK` only when the reply
    /// is `ACK` as a STRING on COM. Any other reply leaves the session
    /// [`SessionState::Failed`] with [`ClientError::HandshakeRejected`]; the
    /// caller decides whether to try again. A connection error also drops the
    /// connection, after which only [`Session::close`] is accepted.
    pub fn connect(&mut self) -> Result<()> {
        match self.state {
            SessionState::Init | SessionState::Failed if self.conn.is_some() => {}
            state => {
                return Err(ClientError::InvalidState {
                    operation: "connect",
                    state,
                })
            }
        }

        self.state = SessionState::Handshaking;
        debug!("shaking hands");

        match self.handshake() {
            Ok(()) => {
                self.state = SessionState::Established;
                info!("session established");
                Ok(())
            }
            Err(err) => {
                self.state = SessionState::Failed;
                self.retire_on_fatal(Err(err))
            }
        }
    }

    /// Repeat [`Session::connect`] until it succeeds.
    ///
    /// Only rejected or unparsable handshake replies are retried; connection
    /// failures are returned immediately. Waits between attempts observe
    /// `cancel`. Returns the number of attempts made.
    pub fn connect_with_retry(&mut self, policy: &RetryPolicy, cancel: &AtomicBool) -> Result<u32> {
        let mut attempts = 0u32;

        loop {
            if cancel.load(Ordering::SeqCst) {
                return Err(ClientError::Cancelled);
            }

            attempts = attempts.saturating_add(1);
            let err = match self.connect() {
                Ok(()) => return Ok(attempts),
                Err(err) => err,
            };

            if !matches!(err.kind(), ErrorKind::Handshake | ErrorKind::Parse) {
                return Err(err);
            }
            if policy.max_attempts.is_some_and(|max| attempts >= max) {
                warn!(attempts, error = %err, "giving up on handshake");
                return Err(ClientError::RetriesExhausted { attempts });
            }

            debug!(attempt = attempts, error = %err, "handshake attempt failed, retrying");
            wait_cancellable(policy.interval, cancel)?;
        }
    }

    /// Send a typed value on the COM channel.
    pub fn send(&mut self, value: impl Into<Value>) -> Result<()> {
        self.send_on(value, Channel::Com)
    }

    /// Send a typed value on an explicit channel.
    pub fn send_on(&mut self, value: impl Into<Value>, channel: Channel) -> Result<()> {
        let value = value.into();
        let sent = self.established("send")?.send_value(&value, channel);
        self.retire_on_fatal(sent)
    }

    /// Receive and decode the next frame.
    ///
    /// A connection or framing error leaves the stream at an unknown offset,
    /// so the connection is dropped and the session becomes
    /// [`SessionState::Failed`].
    pub fn recv(&mut self) -> Result<Readout> {
        let received = self.established("receive")?.recv();
        self.retire_on_fatal(received)
    }

    /// Ask the server to start streaming data (`STD`).
    pub fn start_data(&mut self) -> Result<()> {
        let sent = self.established("start data")?.send_command(Command::StartData);
        self.retire_on_fatal(sent)
    }

    /// Ask the server to stop streaming data (`SPD`).
    pub fn stop_data(&mut self) -> Result<()> {
        let sent = self.established("stop data")?.send_command(Command::StopData);
        self.retire_on_fatal(sent)
    }

    /// Tear the session down and close the connection.
    ///
    /// Sends `SPD` then `FIN`, then discards incoming frames until `FIN`
    /// arrives as a STRING on COM. The connection is closed whatever the
    /// outcome and the session ends [`SessionState::Closed`]. Closing an
    /// already closed session, or one whose connection was lost, only marks
    /// it closed.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            SessionState::Closed => return Ok(()),
            SessionState::Handshaking | SessionState::TearingDown => {
                return Err(ClientError::InvalidState {
                    operation: "close",
                    state: self.state,
                })
            }
            SessionState::Init | SessionState::Established | SessionState::Failed => {}
        }

        let Some(mut conn) = self.conn.take() else {
            self.state = SessionState::Closed;
            return Ok(());
        };

        self.state = SessionState::TearingDown;
        debug!("closing session");

        let drained = teardown(&mut conn);
        let closed = conn.close();
        self.state = SessionState::Closed;

        let received = drained?;
        closed?;
        info!(frames_drained = received, "session closed");
        Ok(())
    }

    fn handshake(&mut self) -> Result<()> {
        let conn = self.conn.as_mut().ok_or(ClientError::InvalidState {
            operation: "connect",
            state: SessionState::Closed,
        })?;

        conn.send_command(Command::Synchronize)?;
        let reply = conn.recv()?;
        if !reply.is_command(Command::Acknowledge) {
            warn!(%reply, "unexpected handshake reply");
            return Err(ClientError::HandshakeRejected(Box::new(reply)));
        }

        debug!("received SYN/ACK");
        conn.send_command(Command::Acknowledge)
    }

    /// Drop the connection after an error that leaves the stream unusable,
    /// such as a read that stopped partway through a frame.
    fn retire_on_fatal<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() && self.conn.take().is_some() {
                self.state = SessionState::Failed;
                warn!(error = %err, "connection lost, session failed");
            }
        }
        result
    }

    fn established(&mut self, operation: &'static str) -> Result<&mut Connection<R, W>> {
        match (self.state, self.conn.as_mut()) {
            (SessionState::Established, Some(conn)) => Ok(conn),
            (state, _) => Err(ClientError::InvalidState { operation, state }),
        }
    }
}

/// Send SPD and FIN, then drain until the server's FIN. Returns frames read.
fn teardown<R: Read, W: Write>(conn: &mut Connection<R, W>) -> Result<usize> {
    conn.send_command(Command::StopData)?;
    conn.send_command(Command::Disconnect)?;

    let mut received = 0usize;
    loop {
        let frame = conn.recv_frame()?;
        received += 1;

        match Readout::decode(&frame, conn.decode_config()) {
            Ok(readout) if readout.is_command(Command::Disconnect) => return Ok(received),
            Ok(readout) => debug!(%readout, "discarding frame while draining"),
            Err(err) => warn!(error = %err, "discarding undecodable frame while draining"),
        }
    }
}

fn wait_cancellable(duration: Duration, cancel: &AtomicBool) -> Result<()> {
    let deadline = Instant::now() + duration;
    loop {
        if cancel.load(Ordering::SeqCst) {
            return Err(ClientError::Cancelled);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        std::thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use bytes::BytesMut;
    use gramoc_frame::{encode_frame, DataType, Frame, FrameReader, FrameWriter};
    use gramoc_payload::DecodeConfig;

    use super::*;

    /// Inbound bytes shared with the test so consumption can be inspected
    /// after the session drops its connection.
    #[derive(Clone, Default)]
    struct SharedReader(Arc<Mutex<Cursor<Vec<u8>>>>);

    impl SharedReader {
        fn position(&self) -> u64 {
            self.0.lock().unwrap().position()
        }
    }

    impl Read for SharedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().read(buf)
        }
    }

    #[derive(Clone, Default)]
    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl SharedWriter {
        fn frames(&self) -> Vec<Frame> {
            let wire = self.0.lock().unwrap().clone();
            let len = wire.len() as u64;
            let mut reader = FrameReader::new(Cursor::new(wire));
            let mut frames = Vec::new();
            while reader.get_ref().position() < len {
                frames.push(reader.read_frame().unwrap());
            }
            frames
        }

        fn tokens(&self) -> Vec<String> {
            self.frames()
                .iter()
                .map(|f| String::from_utf8(f.payload.to_vec()).unwrap())
                .collect()
        }
    }

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Script(BytesMut);

    impl Script {
        fn frame(mut self, data_type: DataType, channel: Channel, payload: &str) -> Self {
            encode_frame(
                data_type.wire_code(),
                channel.code(),
                payload.as_bytes(),
                &mut self.0,
            )
            .unwrap();
            self
        }

        fn command(self, command: Command) -> Self {
            self.frame(DataType::String, Channel::Com, command.token())
        }

        fn len(&self) -> u64 {
            self.0.len() as u64
        }
    }

    type TestSession = Session<SharedReader, SharedWriter>;

    fn session(script: &Script) -> (TestSession, SharedReader, SharedWriter) {
        let reader = SharedReader(Arc::new(Mutex::new(Cursor::new(script.0.to_vec()))));
        let writer = SharedWriter::default();
        let conn = Connection::from_parts(
            FrameReader::new(reader.clone()),
            FrameWriter::new(writer.clone()),
            DecodeConfig::default(),
        );
        (Session::new(conn), reader, writer)
    }

    fn quick_retry(max_attempts: Option<u32>) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    #[test]
    fn handshake_success_sends_one_ack() {
        let script = Script::default().command(Command::Acknowledge);
        let (mut session, _, writer) = session(&script);

        session.connect().unwrap();

        assert_eq!(session.state(), SessionState::Established);
        assert_eq!(writer.tokens(), vec!["SYN", "ACK"]);
        let frames = writer.frames();
        assert!(frames
            .iter()
            .all(|f| f.data_type() == DataType::String && f.channel() == Some(Channel::Com)));
    }

    #[test]
    fn handshake_rejects_other_reply_without_ack() {
        let script = Script::default().frame(DataType::String, Channel::Com, "NAK");
        let (mut session, _, writer) = session(&script);

        let err = session.connect().unwrap_err();

        match err {
            ClientError::HandshakeRejected(readout) => {
                assert_eq!(readout.value(), Some(&Value::from("NAK")));
            }
            other => panic!("expected handshake rejection, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(writer.tokens(), vec!["SYN"]);
    }

    #[test]
    fn handshake_rejects_ack_on_data_channel() {
        let script = Script::default().frame(DataType::String, Channel::Dat, "ACK");
        let (mut session, _, writer) = session(&script);

        assert_eq!(session.connect().unwrap_err().kind(), ErrorKind::Handshake);
        assert_eq!(writer.tokens(), vec!["SYN"]);
    }

    #[test]
    fn handshake_rejects_non_string_reply() {
        let script = Script::default().frame(DataType::Int, Channel::Com, "1");
        let (mut session, _, writer) = session(&script);

        assert!(session.connect().is_err());
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(writer.frames().len(), 1);
    }

    #[test]
    fn handshake_transport_failure() {
        let (mut session, _, writer) = session(&Script::default());

        let err = session.connect().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(writer.tokens(), vec!["SYN"]);
    }

    #[test]
    fn connect_twice_is_invalid() {
        let script = Script::default().command(Command::Acknowledge);
        let (mut session, _, _) = session(&script);
        session.connect().unwrap();

        let err = session.connect().unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidState {
                operation: "connect",
                state: SessionState::Established
            }
        ));
    }

    #[test]
    fn retry_until_acknowledged() {
        let script = Script::default()
            .frame(DataType::String, Channel::Com, "BUSY")
            .frame(DataType::Int, Channel::Com, "not-a-number")
            .command(Command::Acknowledge);
        let (mut session, _, writer) = session(&script);

        let attempts = session
            .connect_with_retry(&quick_retry(None), &AtomicBool::new(false))
            .unwrap();

        assert_eq!(attempts, 3);
        assert_eq!(session.state(), SessionState::Established);
        assert_eq!(writer.tokens(), vec!["SYN", "SYN", "SYN", "ACK"]);
    }

    #[test]
    fn retry_gives_up_after_max_attempts() {
        let script = Script::default()
            .frame(DataType::String, Channel::Com, "NO")
            .frame(DataType::String, Channel::Com, "NO")
            .command(Command::Acknowledge);
        let (mut session, _, writer) = session(&script);

        let err = session
            .connect_with_retry(&quick_retry(Some(2)), &AtomicBool::new(false))
            .unwrap_err();

        assert!(matches!(err, ClientError::RetriesExhausted { attempts: 2 }));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(writer.tokens(), vec!["SYN", "SYN"]);
    }

    #[test]
    fn retry_stops_on_connection_failure() {
        let script = Script::default().frame(DataType::String, Channel::Com, "NO");
        let (mut session, _, writer) = session(&script);

        let err = session
            .connect_with_retry(&quick_retry(None), &AtomicBool::new(false))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(writer.tokens(), vec!["SYN", "SYN"]);
    }

    #[test]
    fn retry_honors_cancellation() {
        let (mut session, _, writer) = session(&Script::default());

        let err = session
            .connect_with_retry(&quick_retry(None), &AtomicBool::new(true))
            .unwrap_err();

        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(session.state(), SessionState::Init);
        assert!(writer.frames().is_empty());
    }

    #[test]
    fn cancellation_interrupts_wait() {
        let cancel = AtomicBool::new(true);
        let started = Instant::now();
        let err = wait_cancellable(Duration::from_secs(30), &cancel).unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn data_operations_require_established_session() {
        let (mut session, _, writer) = session(&Script::default());

        assert!(matches!(
            session.send("early"),
            Err(ClientError::InvalidState {
                operation: "send",
                state: SessionState::Init
            })
        ));
        assert!(session.recv().is_err());
        assert!(session.start_data().is_err());
        assert!(writer.frames().is_empty());
    }

    #[test]
    fn exchange_values_once_established() {
        let script = Script::default()
            .command(Command::Acknowledge)
            .frame(DataType::ListFloat, Channel::Dat, "[0.5, 1.5]");
        let (mut session, _, writer) = session(&script);
        session.connect().unwrap();

        session.send("Hallo Server").unwrap();
        session.send_on(vec![1i64, 2, 3], Channel::Dat).unwrap();
        session.start_data().unwrap();
        let readout = session.recv().unwrap();

        assert_eq!(readout.value(), Some(&Value::ListFloat(vec![0.5, 1.5])));
        let frames = writer.frames();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[2].payload.as_ref(), b"Hallo Server");
        assert_eq!(frames[3].data_type(), DataType::ListInt);
        assert_eq!(frames[3].channel(), Some(Channel::Dat));
        assert_eq!(frames[4].payload.as_ref(), b"STD");
    }

    #[test]
    fn teardown_drains_until_fin() {
        let handshake = Script::default().command(Command::Acknowledge);
        let handshake_len = handshake.len();
        let script = handshake
            .frame(DataType::Int, Channel::Dat, "1")
            .frame(DataType::Int, Channel::Dat, "2")
            .command(Command::Disconnect);
        let fin_end = script.len();
        let script = script.frame(DataType::String, Channel::Com, "unread");
        let (mut session, reader, writer) = session(&script);
        session.connect().unwrap();
        assert_eq!(reader.position(), handshake_len);

        session.close().unwrap();

        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.connection().is_none());
        assert_eq!(reader.position(), fin_end);
        assert_eq!(writer.tokens(), vec!["SYN", "ACK", "SPD", "FIN"]);
    }

    #[test]
    fn teardown_skips_noise_and_bad_payloads() {
        let script = Script::default()
            .command(Command::Acknowledge)
            .frame(DataType::String, Channel::Dat, "FIN")
            .frame(DataType::ListInt, Channel::Com, "[1,")
            .frame(DataType::Map, Channel::Com, "{broken")
            .command(Command::StopData)
            .command(Command::Disconnect);
        let (mut session, reader, _) = session(&script);
        session.connect().unwrap();

        session.close().unwrap();

        assert_eq!(reader.position(), script.len());
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn teardown_peer_disconnect_still_closes() {
        let script = Script::default()
            .command(Command::Acknowledge)
            .frame(DataType::String, Channel::Dat, "partial");
        let (mut session, _, writer) = session(&script);
        session.connect().unwrap();

        let err = session.close().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(writer.tokens(), vec!["SYN", "ACK", "SPD", "FIN"]);
    }

    #[test]
    fn close_is_idempotent_and_blocks_further_use() {
        let script = Script::default()
            .command(Command::Acknowledge)
            .command(Command::Disconnect);
        let (mut session, _, writer) = session(&script);
        session.connect().unwrap();

        session.close().unwrap();
        session.close().unwrap();

        assert_eq!(writer.tokens(), vec!["SYN", "ACK", "SPD", "FIN"]);
        assert!(matches!(
            session.send(1i64),
            Err(ClientError::InvalidState {
                state: SessionState::Closed,
                ..
            })
        ));
        assert!(session.connect().is_err());
    }

    /// Serves the scripted bytes up to `stall_at`, then times out.
    struct StallingReader {
        data: Cursor<Vec<u8>>,
        stall_at: u64,
    }

    impl Read for StallingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let left = self.stall_at.saturating_sub(self.data.position()) as usize;
            if left == 0 {
                return Err(std::io::Error::from(std::io::ErrorKind::WouldBlock));
            }
            let n = left.min(buf.len());
            self.data.read(&mut buf[..n])
        }
    }

    #[test]
    fn stalled_read_mid_header_retires_connection() {
        let handshake = Script::default().command(Command::Acknowledge);
        let stall_at = handshake.len() + 3;
        let script = handshake.frame(DataType::Int, Channel::Dat, "42");
        let writer = SharedWriter::default();
        let conn = Connection::from_parts(
            FrameReader::new(StallingReader {
                data: Cursor::new(script.0.to_vec()),
                stall_at,
            }),
            FrameWriter::new(writer.clone()),
            DecodeConfig::default(),
        );
        let mut session = Session::new(conn);
        session.connect().unwrap();

        let err = session.recv().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.connection().is_none());

        assert!(matches!(
            session.recv(),
            Err(ClientError::InvalidState {
                operation: "receive",
                state: SessionState::Failed
            })
        ));
        assert!(session.send(1i64).is_err());
        assert!(matches!(
            session.connect(),
            Err(ClientError::InvalidState {
                operation: "connect",
                ..
            })
        ));

        session.close().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(writer.tokens(), vec!["SYN", "ACK"]);
    }

    #[test]
    fn write_failure_retires_connection() {
        let script = Script::default().command(Command::Acknowledge);
        let reader = SharedReader(Arc::new(Mutex::new(Cursor::new(script.0.to_vec()))));
        let conn = Connection::from_parts(
            FrameReader::new(reader),
            FrameWriter::new(FailAfter { frames_left: 2 }),
            DecodeConfig::default(),
        );
        let mut session = Session::new(conn);
        session.connect().unwrap();

        let err = session.start_data().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.stop_data().is_err());
        session.close().unwrap();
    }

    #[test]
    fn non_fatal_errors_keep_session() {
        let script = Script::default()
            .command(Command::Acknowledge)
            .frame(DataType::Int, Channel::Dat, "forty-two")
            .frame(DataType::Int, Channel::Dat, "42");
        let (mut session, _, _) = session(&script);
        session.connect().unwrap();

        let map = Value::Map(serde_json::Map::new());
        assert_eq!(session.send(map).unwrap_err().kind(), ErrorKind::Unsupported);
        assert_eq!(session.recv().unwrap_err().kind(), ErrorKind::Parse);
        assert_eq!(session.state(), SessionState::Established);
        assert_eq!(session.recv().unwrap().value(), Some(&Value::Int(42)));
    }

    /// Accepts a fixed number of frame writes, then reports a reset.
    struct FailAfter {
        frames_left: usize,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.frames_left == 0 {
                return Err(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.frames_left = self.frames_left.saturating_sub(1);
            Ok(())
        }
    }

    #[test]
    fn state_names() {
        assert_eq!(SessionState::TearingDown.to_string(), "tearing down");
        assert_eq!(SessionState::Established.name(), "established");
    }
}
