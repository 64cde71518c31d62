use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TrySendError};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use std::{io, process, thread};

use log::warn;
use rppal::gpio::{Gpio, InputPin, OutputPin};
use syslog::Facility;

use door_window_monitor::alert::{AlertScheduler, DEFAULT_ALERT_INTERVAL};
use door_window_monitor::mode::AwayMode;
use door_window_monitor::notify::{Telegram, BOT_TOKEN_VAR, CHAT_IDS_VAR};
use door_window_monitor::sensor::Debouncer;
use door_window_monitor::{http, led, term_on_err, DoorState, State};

const SENSOR_PIN: u8 = 20; // header pin 38
const LED_PIN: u8 = 21; // header pin 40
const POLL_PERIOD: Duration = Duration::from_millis(10);
// At the 10ms cadence, 30ms of agreement before a state change is accepted
const DEBOUNCE_SAMPLES: u8 = 3;
const DEFAULT_AWAY: bool = true;
const NOTIFY_QUEUE_DEPTH: usize = 8;
const ONE_SECOND: Duration = Duration::from_secs(1);
const SERVER_ADDR: (&str, u16) = ("0.0.0.0", 8888);

fn main() -> Result<(), io::Error> {
    init_logging();

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&term))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))?;

    let (tx, rx) = mpsc::sync_channel(NOTIFY_QUEUE_DEPTH);
    let away = AwayMode::new(DEFAULT_AWAY);
    let state = Arc::new(RwLock::new(State::initial()));
    let pins = setup_gpio();
    let mut threads = Vec::new();

    // Polling thread
    // Only spawned if we were able to acquire the pins. If a physical
    // inspection of the device shows the LED never lighting then this state
    // should be obvious.
    match pins {
        Ok((door, mut led)) => {
            let term = Arc::clone(&term);
            let state = Arc::clone(&state);
            let away = away.clone();
            let thread = thread::spawn(move || {
                led::flash(&mut led, 2);
                let boot = Instant::now();
                let mut debouncer = Debouncer::new(DoorState::Closed, DEBOUNCE_SAMPLES);
                let mut scheduler = AlertScheduler::new(DEFAULT_ALERT_INTERVAL);

                while !term.load(Ordering::Relaxed) {
                    let door_state = debouncer.sample(door.read().into());
                    led::set(&mut led, door_state.is_open());

                    let request = scheduler.tick(door_state, boot.elapsed(), away.get());

                    let current_state = { *term_on_err!(state.read(), &term) };
                    if door_state != current_state.door_state {
                        warn!("door/window is {}", door_state);
                    }
                    let mut new_state = match (door_state, current_state.open_since) {
                        // Closed to open transition
                        (DoorState::Open, None) => State {
                            door_state,
                            open_since: Some(Instant::now()),
                            notified_at: None,
                        },
                        // Open to closed transition
                        (DoorState::Closed, Some(_)) => State {
                            door_state,
                            open_since: None,
                            notified_at: None,
                        },
                        _ => State {
                            door_state,
                            ..current_state
                        },
                    };

                    if let Some(request) = request {
                        if request.is_open {
                            new_state.notified_at = Some(Instant::now());
                        }
                        match tx.try_send(request) {
                            Ok(()) => {}
                            // The next reminder boundary retries naturally
                            Err(TrySendError::Full(_)) => {
                                warn!("notification queue full, dropping request")
                            }
                            Err(err @ TrySendError::Disconnected(_)) => {
                                eprintln!("setting term due to error: {}", err);
                                term.store(true, Ordering::SeqCst);
                                break;
                            }
                        }
                    }

                    if new_state != current_state {
                        *term_on_err!(state.write(), &term) = new_state;
                    }
                    thread::sleep(POLL_PERIOD);
                }
                eprintln!("polling thread exiting");
            });
            threads.push(thread);
        }
        Err(err) => {
            eprintln!("Unable to set up GPIO: {}", err)
        }
    }

    // Notification dispatch thread
    // Deliveries run here so a slow or hung request never stalls polling.
    {
        let term = Arc::clone(&term);
        let notifier = Telegram::from_env();
        if notifier.is_none() {
            warn!(
                "{} / {} not set, notifications disabled",
                BOT_TOKEN_VAR, CHAT_IDS_VAR
            );
        }
        let thread = thread::spawn(move || {
            while !term.load(Ordering::Relaxed) {
                match rx.recv_timeout(ONE_SECOND) {
                    Ok(request) => {
                        if let Some(notifier) = &notifier {
                            // Failures are logged by the notifier; an open
                            // reminder is regenerated at the next interval.
                            let _ = notifier.notify(request.is_open);
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            eprintln!("dispatch thread exiting");
        });
        threads.push(thread);
    }

    // Start HTTP server
    let server = match http::Server::new(SERVER_ADDR) {
        Ok(server) => Arc::new(server),
        Err(err) => {
            eprintln!(
                "Unable to start http server on {}:{}: {}",
                SERVER_ADDR.0, SERVER_ADDR.1, err
            );
            process::exit(1);
        }
    };
    eprintln!("http server running on {}:{}", SERVER_ADDR.0, SERVER_ADDR.1);

    // Handle HTTP requests
    {
        let state = Arc::clone(&state);
        let away = away.clone();
        let server = Arc::clone(&server);
        let thread = thread::spawn(move || {
            server.handle_requests(state, away);
            eprintln!("server thread exiting");
        });
        threads.push(thread);
    }

    // Wait for signals to exit
    while !term.load(Ordering::Relaxed) {
        thread::sleep(5 * ONE_SECOND);
    }
    server.shutdown();

    for thread in threads {
        let _ = thread.join();
    }

    Ok(())
}

fn init_logging() {
    if let Err(err) = syslog::init(
        Facility::LOG_USER,
        log::LevelFilter::Info,
        Some("door-window-monitor"),
    ) {
        eprintln!("unable to initialise syslog logging: {}", err);
    }
}

fn setup_gpio() -> rppal::gpio::Result<(InputPin, OutputPin)> {
    let gpio = Gpio::new()?;
    let sensor_pin = gpio.get(SENSOR_PIN)?.into_input_pullup();
    let led_pin = gpio.get(LED_PIN)?.into_output();
    Ok((sensor_pin, led_pin))
}
