use countdown_timer::{CountdownConfig, CountdownTimer, Signal, Timer};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()?;

    let timer = CountdownTimer::new();

    // Subscribe multiple receivers to the same countdown (broadcast pattern)
    let mut tasks = Vec::new();
    for id in 1..=3 {
        let mut receiver = timer.subscribe();
        tasks.push(tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(Signal::End(full)) => {
                        println!("Receiver {id}: countdown of {full}s ended");
                        break;
                    }
                    Ok(signal) => println!("Receiver {id}: {signal:?}"),
                    Err(e) => {
                        eprintln!("Receiver {id} error: {e}");
                        break;
                    }
                }
            }
        }));
    }

    timer.set(CountdownConfig::new(10.0), true).await?;
    println!("Countdown started with 3 subscribers");

    // Control the countdown from a different task
    let controller = timer.clone();
    let control = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        println!("[Controller] Running at double speed");
        controller.set_scale(2.0).await?;
        tokio::time::sleep(Duration::from_millis(1_200)).await;
        println!("[Controller] Freezing for one second");
        controller.set_scale(0.0).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.set_scale(1.0).await?;
        anyhow::Ok(())
    });

    control.await??;
    for task in tasks {
        task.await?;
    }

    timer.stop().await?;
    println!("Countdown stopped. All receivers completed.");
    Ok(())
}
