use countdown_timer::{CountdownConfig, CountdownTimer, Timer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log::LevelFilter::Debug)
        .chain(std::io::stdout())
        .apply()?;

    let finished = Arc::new(Notify::new());
    let timer = CountdownTimer::new();

    timer.on_begin(|full| {
        println!("Countdown of {full}s started");
        Ok(())
    });
    timer.on_step(|remaining| {
        println!("{remaining:.1}s left");
        Ok(())
    });
    let notify = Arc::clone(&finished);
    timer.on_end(move |full| {
        println!("Countdown of {full}s finished!");
        notify.notify_one();
        Ok(())
    });

    timer.set(CountdownConfig::new(5.0).with_step(0.5), true).await?;
    println!("This should print immediately, waiting for the countdown ...");

    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("Pausing for one second");
    timer.pause().await?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    timer.resume().await?;

    finished.notified().await;
    timer.stop().await?;
    Ok(())
}
