use log::info;
use redraw::{App, Config};
use std::time::{Duration, Instant};

const SCRIPT: [&str; 3] =
    ["Increment Child 1 Count", "Increment Child 2 Count", "Increment Child 3 Count"];

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut app = App::new(Config::from_env());
    let config = app.config().clone();
    info!("running for {:?} with {:?}", config.run_for, config);

    let start = Instant::now();
    let mut last_frame = start;
    let mut last_report = Duration::ZERO;
    let mut reports = 0;
    while start.elapsed() < config.run_for {
        std::thread::sleep(config.frame_interval);
        let now = Instant::now();
        app.advance(now - last_frame);
        last_frame = now;

        if start.elapsed() - last_report >= config.report_interval {
            last_report = start.elapsed();
            // one click per report, cycling through the controls
            app.click(SCRIPT[reports % SCRIPT.len()])?;
            reports += 1;
            info!("render counts after {:.1?}:\n{}", last_report, app.report());
        }
    }

    for (path, text) in app.evaluator().texts() {
        println!("{:<60} {}", path, text);
    }
    println!("{}", app.report());
    Ok(())
}
