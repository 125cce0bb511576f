use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::presenter::{
    Background, HistoryEntry, HistoryKind, HistorySink, HumanInput, Presenter, Reveal,
};
use crate::error::GameError;
use crate::models::Seat;

/// Terminal front end: typewriter text on stdout, prompts on stdin.
pub struct ConsolePresenter {
    typewriter_delay: Duration,
    stdin: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
    history: Mutex<Vec<(DateTime<Local>, HistoryEntry)>>,
}

impl ConsolePresenter {
    pub fn new(typewriter_delay: Duration) -> Self {
        Self {
            typewriter_delay,
            stdin: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            history: Mutex::new(Vec::new()),
        }
    }

    async fn typewrite(&self, text: &str) {
        let mut stdout = io::stdout();
        if self.typewriter_delay.is_zero() {
            let _ = writeln!(stdout, "{}", text);
            return;
        }
        for c in text.chars() {
            let _ = write!(stdout, "{}", c);
            let _ = stdout.flush();
            tokio::time::sleep(self.typewriter_delay).await;
        }
        let _ = writeln!(stdout);
    }

    async fn read_line(&self) -> Result<String, GameError> {
        let mut lines = self.stdin.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Ok(line.trim().to_string()),
            Ok(None) | Err(_) => Err(GameError::InputClosed),
        }
    }

    /// Everything recorded so far, oldest first.
    pub fn transcript(&self) -> Vec<String> {
        let history = self.history.lock().unwrap_or_else(|p| p.into_inner());
        history
            .iter()
            .map(|(at, entry)| {
                let kind = match entry.kind {
                    HistoryKind::Thinking => "thinking",
                    HistoryKind::Speech => "speech",
                    HistoryKind::Action => "action",
                    HistoryKind::Vote => "vote",
                };
                format!(
                    "[{}] {}号 {} ({}): {}",
                    at.format("%H:%M:%S"),
                    entry.seat,
                    entry.role_label,
                    kind,
                    entry.text
                )
            })
            .collect()
    }
}

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn reveal(&self, reveal: Reveal) {
        let marker = if reveal.is_thinking { "…" } else { ">" };
        println!("{} {}", marker, reveal.title);
        self.typewrite(&reveal.body).await;
        if let Some(audio) = &reveal.audio {
            println!("  [audio] {}", audio);
        }
        if !reveal.auto_play {
            print!("  (enter to continue)");
            let _ = io::stdout().flush();
            let _ = self.read_line().await;
        }
    }

    async fn present_player(&self, seat: Seat) {
        println!("---- {}号 ----", seat);
    }

    async fn clear_presentation(&self) {}

    async fn set_background(&self, background: Background) {
        match background {
            Background::Day => println!("========== 白天 =========="),
            Background::Night => println!("========== 夜晚 =========="),
        }
    }

    async fn announce(&self, text: &str, dwell: Duration) {
        println!();
        for line in text.lines() {
            println!("    {}", line);
        }
        println!();
        tokio::time::sleep(dwell).await;
    }

    async fn mark_dead(&self, seat: Seat) {
        println!("  ✝ {}号", seat);
    }

    async fn show_vote_count(&self, seat: Seat, votes: usize) {
        println!("  {}号: {} 票", seat, votes);
    }

    async fn clear_vote_counts(&self) {}

    async fn show_day(&self, day: u32) {
        println!("第 {} 天", day);
    }

    async fn label_player(&self, seat: Seat, role_label: Option<&str>, badge: Option<&str>) {
        let mut line = format!("{}号", seat);
        if let Some(label) = role_label {
            line.push_str(&format!(" {}", label));
        }
        if let Some(badge) = badge {
            line.push_str(&format!(" [{}]", badge));
        }
        println!("{}", line);
    }

    async fn show_failure(&self, message: &str) {
        eprintln!("!! game halted: {}", message);
    }
}

#[async_trait]
impl HumanInput for ConsolePresenter {
    async fn prompt(&self, text: &str) -> Result<String, GameError> {
        println!("{}", text);
        print!("> ");
        let _ = io::stdout().flush();
        self.read_line().await
    }

    async fn reject(&self, message: &str) {
        println!("{}", message);
    }
}

impl HistorySink for ConsolePresenter {
    fn record(&self, entry: HistoryEntry) {
        let mut history = self.history.lock().unwrap_or_else(|p| p.into_inner());
        history.push((Local::now(), entry));
    }
}
