use std::{fs::OpenOptions, sync::Arc, thread};

use config::Config;
use page::Page;
use token::{CookieJar, CookieToken};
use transport::HttpTransport;

mod config;
mod dom;
mod event;
mod handler;
mod lock;
mod message;
mod notify;
mod page;
mod patch;
mod template;
mod token;
mod transport;
mod ui;

fn main() {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("config load failed, using defaults: {}", e);
        Config::default()
    });
    // log file
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .expect("log file open failed");
    log_panics::init();
    let log_level = simplelog::LevelFilter::Info;
    let log_config = simplelog::ConfigBuilder::new().set_time_format_str("%+").build();
    simplelog::WriteLogger::init(log_level, log_config, log_file).expect("log set failed");

    let jar = CookieJar::parse(&config.cookies);
    let transport = HttpTransport::new(&config.endpoint, jar.clone(), config.timeout()).expect("http client build failed");
    let tokens = Arc::new(CookieToken::new(jar, config.csrf_cookie.as_str()));
    let page = Page::new(template::document(&config.page), tokens);
    log::info!("page ready against {}.", config.endpoint);

    let (s_main, r_back) = crossbeam_channel::unbounded();
    let (s_back, r_main) = crossbeam_channel::unbounded();
    let s_event = s_back.clone();
    let event_th = thread::spawn(move || {
        if let Err(e) = event::handle(s_event) {
            log::error!("backend event failed: {}", e);
        }
    });
    let message_th = thread::spawn(move || {
        if let Err(e) = message::handle(s_back, r_back, transport) {
            log::error!("backend message failed: {}", e);
        }
    });
    if let Err(e) = ui::run(page, s_main, r_main) {
        log::error!("tui failed: {}", e);
    }
    event_th.join().ok();
    message_th.join().ok();
}
