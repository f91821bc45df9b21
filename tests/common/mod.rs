//! Fake SSG3021X served over a loopback TCP listener.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const IDENTITY: &str = "Siglent Technologies,SSG3021X,SSG3XBAQ4R0001,2.2.1R5";

/// How the fake instrument answers.
#[derive(Clone)]
pub struct Behavior {
    pub identity: String,
    /// Answer queries other than `*IDN?`.
    pub answers_queries: bool,
    /// Split every reply into chunks of this many bytes.
    pub chunk_size: Option<usize>,
    /// Fixed replies, checked before the stored state.
    pub replies: HashMap<String, String>,
    /// Write half a reply and close the socket when this query arrives.
    pub hang_up_on: Option<String>,
    /// Answer this query only after the given delay.
    pub slow_query: Option<(String, Duration)>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            identity: IDENTITY.to_string(),
            answers_queries: true,
            chunk_size: None,
            replies: HashMap::new(),
            hang_up_on: None,
            slow_query: None,
        }
    }
}

struct State {
    frequency: f64,
    power: f64,
    output: bool,
}

/// Loopback server speaking the instrument's command set, one client at a time.
pub struct FakeInstrument {
    pub port: u16,
    received: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl FakeInstrument {
    pub async fn start() -> Self {
        Self::with_behavior(Behavior::default()).await
    }

    pub async fn with_behavior(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicUsize::new(0));
        let state = Arc::new(Mutex::new(State {
            frequency: 1.0e9,
            power: -20.0,
            output: false,
        }));

        let task = {
            let received = received.clone();
            let closed = closed.clone();
            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    serve(socket, &behavior, &state, &received).await;
                    closed.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        Self {
            port,
            received,
            closed,
            task,
        }
    }

    /// Every byte received from clients so far.
    pub fn received(&self) -> Vec<u8> {
        self.received.lock().unwrap().clone()
    }

    /// Received bytes split into command lines.
    pub fn commands(&self) -> Vec<String> {
        String::from_utf8(self.received())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Number of client connections that have ended.
    pub fn closed_connections(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wait until `count` client connections have ended.
    pub async fn wait_for_closed(&self, count: usize) -> bool {
        for _ in 0..200 {
            if self.closed_connections() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl Drop for FakeInstrument {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    socket: TcpStream,
    behavior: &Behavior,
    state: &Mutex<State>,
    received: &Mutex<Vec<u8>>,
) {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        received.lock().unwrap().extend_from_slice(&line);

        let command = String::from_utf8_lossy(&line).trim().to_string();
        if !command.ends_with('?') {
            apply(&command, state);
            continue;
        }

        if behavior.hang_up_on.as_deref() == Some(command.as_str()) {
            let _ = writer.write_all(b"1.0").await;
            let _ = writer.shutdown().await;
            return;
        }
        if command != "*IDN?" && !behavior.answers_queries {
            continue;
        }
        if let Some((slow, delay)) = &behavior.slow_query {
            if *slow == command {
                tokio::time::sleep(*delay).await;
            }
        }

        let reply = format!("{}\n", reply(&command, behavior, state));
        let written = match behavior.chunk_size {
            Some(size) => write_chunked(&mut writer, reply.as_bytes(), size).await,
            None => writer.write_all(reply.as_bytes()).await,
        };
        if written.is_err() {
            return;
        }
    }
}

async fn write_chunked<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    bytes: &[u8],
    size: usize,
) -> std::io::Result<()> {
    for chunk in bytes.chunks(size) {
        writer.write_all(chunk).await?;
        writer.flush().await?;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    Ok(())
}

fn apply(command: &str, state: &Mutex<State>) {
    let mut state = state.lock().unwrap();
    match command.split_once(' ') {
        Some(("FREQ", value)) => state.frequency = value.parse().unwrap_or(state.frequency),
        Some(("POW", value)) => state.power = value.parse().unwrap_or(state.power),
        Some((":OUTP", "ON")) => state.output = true,
        Some((":OUTP", "OFF")) => state.output = false,
        _ => {}
    }
}

fn reply(command: &str, behavior: &Behavior, state: &Mutex<State>) -> String {
    if let Some(fixed) = behavior.replies.get(command) {
        return fixed.clone();
    }
    let state = state.lock().unwrap();
    match command {
        "*IDN?" => behavior.identity.clone(),
        "FREQ?" => state.frequency.to_string(),
        "POW?" => state.power.to_string(),
        ":OUTP?" => if state.output { "1" } else { "0" }.to_string(),
        _ => String::new(),
    }
}
