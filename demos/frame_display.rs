//! A text-mode countdown display that polls the timer once per frame.
//!
//! Press Enter to restart the countdown, type `p` and Enter to pause or
//! resume, `q` and Enter to quit.

use countdown_timer::{CountdownConfig, CountdownSnapshot, CountdownTimer, Timer};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const FRAME: Duration = Duration::from_millis(33);
const BAR_WIDTH: usize = 30;

enum Input {
    Reset,
    TogglePause,
    Quit,
}

fn render(snapshot: &CountdownSnapshot) -> String {
    let progress = snapshot.progress.unwrap_or(0.0);
    let filled = (progress * BAR_WIDTH as f64).round() as usize;
    format!(
        "\r{:>6.1}s / {:.0}s [{}{}] {}",
        snapshot.remaining,
        snapshot.full_duration,
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        if snapshot.running { "running" } else { "paused " },
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;

    let (input_tx, mut input_rx) = mpsc::channel(8);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let input = match line.trim() {
                "q" => Input::Quit,
                "p" => Input::TogglePause,
                _ => Input::Reset,
            };
            if input_tx.send(input).await.is_err() {
                break;
            }
        }
    });

    let timer = CountdownTimer::new();
    timer.on_end(|full| {
        println!("\nTime is up after {full}s, press Enter to go again");
        Ok(())
    });
    timer.set(CountdownConfig::new(15.0).with_step(0.1), true).await?;

    let mut frames = tokio::time::interval(FRAME);
    let mut last = String::new();
    loop {
        tokio::select! {
            _ = frames.tick() => {
                // Keep the previous frame while a firing holds the state.
                if let Some(snapshot) = timer.try_snapshot() {
                    let line = render(&snapshot);
                    if line != last {
                        print!("{line}");
                        std::io::stdout().flush()?;
                        last = line;
                    }
                }
            }
            Some(input) = input_rx.recv() => match input {
                Input::Reset => timer.reset(Some(true)).await?,
                Input::TogglePause => {
                    if timer.is_running().await {
                        timer.pause().await?;
                    } else {
                        timer.resume().await?;
                    }
                }
                Input::Quit => break,
            },
        }
    }

    timer.stop().await?;
    println!();
    Ok(())
}
