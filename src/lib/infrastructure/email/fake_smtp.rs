//! In-process SMTP server for exercising the mailer over a real socket

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};

/// A message accepted by the fake server
#[derive(Clone, Debug, Default)]
pub struct Delivery {
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
    pub data: String,
}

#[derive(Debug, Default)]
struct Journal {
    connections: AtomicUsize,
    authentications: AtomicUsize,
    deliveries: Mutex<Vec<Delivery>>,
}

/// Accepts every session, advertises `AUTH PLAIN` and records what it is sent.
#[derive(Debug)]
pub struct FakeSmtpServer {
    port: u16,
    journal: Arc<Journal>,
}

impl FakeSmtpServer {
    /// Starts a server that accepts all mail
    pub async fn start() -> Self {
        Self::spawn(None).await
    }

    /// Starts a server that answers every `RCPT TO` with `reply`
    pub async fn rejecting(reply: &'static str) -> Self {
        Self::spawn(Some(reply)).await
    }

    async fn spawn(rcpt_reply: Option<&'static str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake SMTP server");
        let port = listener
            .local_addr()
            .expect("fake SMTP server has no local address")
            .port();

        let journal = Arc::new(Journal::default());
        let sessions = journal.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                sessions.connections.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(session(stream, sessions.clone(), rcpt_reply));
            }
        });

        Self { port, journal }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn connections(&self) -> usize {
        self.journal.connections.load(Ordering::SeqCst)
    }

    pub fn authentications(&self) -> usize {
        self.journal.authentications.load(Ordering::SeqCst)
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.journal
            .deliveries
            .lock()
            .expect("delivery journal poisoned")
            .clone()
    }
}

async fn session(
    stream: TcpStream,
    journal: Arc<Journal>,
    rcpt_reply: Option<&'static str>,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(b"220 localhost ESMTP ready\r\n").await?;

    let mut current = Delivery::default();

    while let Some(line) = lines.next_line().await? {
        let command = line.to_ascii_uppercase();

        let reply = if command.starts_with("EHLO") {
            "250-localhost\r\n250 AUTH PLAIN".to_string()
        } else if command.starts_with("HELO") {
            "250 localhost".to_string()
        } else if command.starts_with("AUTH") {
            journal.authentications.fetch_add(1, Ordering::SeqCst);
            "235 2.7.0 Authentication successful".to_string()
        } else if command.starts_with("MAIL FROM:") {
            current = Delivery {
                mail_from: path(&line),
                ..Delivery::default()
            };
            "250 2.1.0 OK".to_string()
        } else if command.starts_with("RCPT TO:") {
            match rcpt_reply {
                Some(reply) => reply.to_string(),
                None => {
                    current.rcpt_to.push(path(&line));
                    "250 2.1.5 OK".to_string()
                }
            }
        } else if command == "DATA" {
            writer
                .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                .await?;

            let mut data = Vec::new();
            while let Some(data_line) = lines.next_line().await? {
                if data_line == "." {
                    break;
                }
                data.push(data_line.strip_prefix('.').unwrap_or(&data_line).to_string());
            }

            current.data = data.join("\r\n");
            journal
                .deliveries
                .lock()
                .expect("delivery journal poisoned")
                .push(std::mem::take(&mut current));

            "250 2.0.0 Queued".to_string()
        } else if command.starts_with("QUIT") {
            writer.write_all(b"221 2.0.0 Bye\r\n").await?;
            break;
        } else {
            "250 OK".to_string()
        };

        writer.write_all(format!("{reply}\r\n").as_bytes()).await?;
    }

    Ok(())
}

/// Extracts the address from `MAIL FROM:<...>` or `RCPT TO:<...>`
fn path(line: &str) -> String {
    line.split_once(':')
        .map(|(_, rest)| rest.trim().trim_start_matches('<'))
        .and_then(|rest| rest.split('>').next())
        .unwrap_or_default()
        .to_string()
}
